//! Unified error handling for the route-coverage library.
//!
//! Errors only surface while building the route index or decoding input.
//! Matching a track never fails: malformed tracks resolve to "no match".

use std::fmt;

/// Unified error type for route-coverage operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatchError {
    /// Reference route has too few distinct vertices to form a hull
    DegenerateRoute {
        route_id: u32,
        name: String,
        distinct_vertices: usize,
    },
    /// Reference route geometry is malformed (empty, short polylines, bad coordinates)
    InvalidRoute {
        route_id: u32,
        name: String,
        message: String,
    },
    /// Encoded polyline could not be decoded or encoded
    PolylineDecode { message: String },
    /// GeoJSON or config (de)serialization failed
    Serialization { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for RouteMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMatchError::DegenerateRoute {
                route_id,
                name,
                distinct_vertices,
            } => {
                write!(
                    f,
                    "Route {} '{}' has {} distinct vertices, minimum 3 required",
                    route_id, name, distinct_vertices
                )
            }
            RouteMatchError::InvalidRoute {
                route_id,
                name,
                message,
            } => {
                write!(f, "Route {} '{}' is invalid: {}", route_id, name, message)
            }
            RouteMatchError::PolylineDecode { message } => {
                write!(f, "Polyline error: {}", message)
            }
            RouteMatchError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
            RouteMatchError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            RouteMatchError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RouteMatchError {}

impl From<serde_json::Error> for RouteMatchError {
    fn from(err: serde_json::Error) -> Self {
        RouteMatchError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for route-coverage operations.
pub type Result<T> = std::result::Result<T, RouteMatchError>;

/// Extension trait for converting Option to RouteMatchError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a degenerate route error.
    fn ok_or_degenerate(self, route_id: u32, name: &str, distinct_vertices: usize) -> Result<T>;

    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_degenerate(self, route_id: u32, name: &str, distinct_vertices: usize) -> Result<T> {
        self.ok_or_else(|| RouteMatchError::DegenerateRoute {
            route_id,
            name: name.to_string(),
            distinct_vertices,
        })
    }

    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| RouteMatchError::Internal {
            message: message.to_string(),
        })
    }
}
