//! # Route Index
//!
//! Build-once index over the fixed set of reference routes.
//!
//! Each route is indexed with its convex hull, axis-aligned bounds and
//! minimum-area oriented bounding box. The index has no mutators: once built
//! it can be shared by reference or behind an `Arc` across any number of
//! threads matching tracks concurrently.
//!
//! Route ids are 1-based positions in the corpus. Id 0 means "no route".

use std::time::Instant;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, RouteMatchError};
use crate::geometry::{
    convex_hull, distance_to_polyline, distinct_points, minimum_area_bounding_box, OrientedBox,
};
use crate::{Bounds, GpsPoint};

/// A reference route as supplied by the corpus loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRoute {
    /// Display name (used for the `route` property in exported features)
    pub name: String,
    /// One or more disjoint pieces, each an ordered polyline
    pub polylines: Vec<Vec<GpsPoint>>,
}

impl ReferenceRoute {
    pub fn new(name: impl Into<String>, polylines: Vec<Vec<GpsPoint>>) -> Self {
        Self {
            name: name.into(),
            polylines,
        }
    }

    /// A route drawn as a single polyline.
    pub fn single(name: impl Into<String>, points: Vec<GpsPoint>) -> Self {
        Self::new(name, vec![points])
    }
}

/// A reference route with its precomputed bounding geometry.
#[derive(Debug, Clone)]
pub struct IndexedRoute {
    id: u32,
    name: String,
    polylines: Vec<Vec<GpsPoint>>,
    hull: Vec<GpsPoint>,
    bounds: Bounds,
    oriented_box: OrientedBox,
}

impl IndexedRoute {
    fn build(id: u32, route: ReferenceRoute) -> Result<Self> {
        let ReferenceRoute { name, polylines } = route;

        if polylines.is_empty() {
            return Err(invalid(id, &name, "route has no polylines".to_string()));
        }
        for (i, line) in polylines.iter().enumerate() {
            if line.len() < 2 {
                return Err(invalid(
                    id,
                    &name,
                    format!("polyline {} has {} points, minimum 2 required", i, line.len()),
                ));
            }
            if let Some(bad) = line.iter().find(|p| !p.is_valid()) {
                return Err(invalid(
                    id,
                    &name,
                    format!(
                        "polyline {} has invalid coordinate ({}, {})",
                        i, bad.longitude, bad.latitude
                    ),
                ));
            }
        }

        let vertices: Vec<GpsPoint> = polylines.iter().flatten().copied().collect();
        let distinct = distinct_points(&vertices).len();
        if distinct < 3 {
            return Err(RouteMatchError::DegenerateRoute {
                route_id: id,
                name,
                distinct_vertices: distinct,
            });
        }

        let hull = convex_hull(&vertices);
        if hull.len() < 3 {
            warn!(
                "[RouteIndex] Route {} '{}' is collinear, using its axis-aligned box",
                id, name
            );
        }

        let bounds = Bounds::from_points(&vertices).ok_or_degenerate(id, &name, distinct)?;
        let oriented_box = minimum_area_bounding_box(&hull).ok_or_degenerate(id, &name, distinct)?;

        debug!(
            "[RouteIndex] Route {} '{}': {} polylines, {} vertices, hull {} points",
            id,
            name,
            polylines.len(),
            vertices.len(),
            hull.len()
        );

        Ok(Self {
            id,
            name,
            polylines,
            hull,
            bounds,
            oriented_box,
        })
    }

    /// 1-based route id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polylines(&self) -> &[Vec<GpsPoint>] {
        &self.polylines
    }

    /// Convex hull of all vertices, counter-clockwise.
    pub fn hull(&self) -> &[GpsPoint] {
        &self.hull
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn oriented_box(&self) -> &OrientedBox {
        &self.oriented_box
    }

    /// Coarse test: is `point` inside the oriented box, with boundary slack.
    #[inline]
    pub fn may_contain(&self, point: &GpsPoint, overscale: f64) -> bool {
        self.oriented_box.contains(point, overscale)
    }

    /// Minimum distance in meters from `point` to any of the route's polylines.
    pub fn distance_to(&self, point: &GpsPoint) -> f64 {
        self.polylines
            .iter()
            .map(|line| distance_to_polyline(point, line))
            .fold(f64::INFINITY, f64::min)
    }
}

fn invalid(route_id: u32, name: &str, message: String) -> RouteMatchError {
    RouteMatchError::InvalidRoute {
        route_id,
        name: name.to_string(),
        message,
    }
}

/// Immutable index over all reference routes.
#[derive(Debug, Clone)]
pub struct RouteIndex {
    routes: Vec<IndexedRoute>,
}

impl RouteIndex {
    /// Index every route in corpus order. Route `i` in the input gets id `i + 1`.
    ///
    /// Any malformed route fails the whole build: the corpus is fixed
    /// infrastructure data and a partial index would silently under-count.
    ///
    /// # Example
    /// ```
    /// use route_coverage::{GpsPoint, ReferenceRoute, RouteIndex};
    ///
    /// let route = ReferenceRoute::single(
    ///     "river loop",
    ///     vec![
    ///         GpsPoint::new(44.970, -93.260),
    ///         GpsPoint::new(44.980, -93.250),
    ///         GpsPoint::new(44.975, -93.240),
    ///     ],
    /// );
    /// let index = RouteIndex::build(vec![route]).unwrap();
    /// assert_eq!(index.len(), 1);
    /// assert_eq!(index.route_name(1), Some("river loop"));
    /// ```
    pub fn build(routes: Vec<ReferenceRoute>) -> Result<Self> {
        let start = Instant::now();

        if routes.is_empty() {
            let err = RouteMatchError::ConfigError {
                message: "reference route corpus is empty".to_string(),
            };
            error!("[RouteIndex] {}", err);
            return Err(err);
        }

        let mut indexed = Vec::with_capacity(routes.len());
        for (i, route) in routes.into_iter().enumerate() {
            match IndexedRoute::build(i as u32 + 1, route) {
                Ok(r) => indexed.push(r),
                Err(err) => {
                    error!("[RouteIndex] {}", err);
                    return Err(err);
                }
            }
        }

        info!(
            "[RouteIndex] Built {} routes in {}ms",
            indexed.len(),
            start.elapsed().as_millis()
        );

        Ok(Self { routes: indexed })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All routes, ordered by id.
    pub fn routes(&self) -> &[IndexedRoute] {
        &self.routes
    }

    /// Look up a route by its 1-based id. Id 0 ("no route") returns `None`.
    pub fn get(&self, id: u32) -> Option<&IndexedRoute> {
        let idx = (id as usize).checked_sub(1)?;
        self.routes.get(idx)
    }

    pub fn route_name(&self, id: u32) -> Option<&str> {
        self.get(id).map(|r| r.name())
    }
}
