//! Error handling for RoiKit
//!
//! Provides error types for all layers of the regions subsystem:
//! - Geometry errors (construction and dispatch of shape geometries)
//! - Conversion errors (wire JSON marshalling in both directions)
//! - Persistence errors (storing and reloading regions)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a shape geometry cannot be built from the given parameters
/// or when a geometry of the wrong kind is handed to a type-specific routine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A mandatory parameter is not a finite number
    #[error("{kind} parameter '{param}' is not a finite number")]
    NonFiniteParameter {
        /// The geometry kind being constructed.
        kind: String,
        /// The offending parameter name.
        param: String,
    },

    /// Not enough points to build the geometry
    #[error("{kind} needs at least {required} points, got {actual}")]
    TooFewPoints {
        /// The geometry kind being constructed.
        kind: String,
        /// Minimum number of points.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// A geometry of another kind was supplied
    #[error("expected a {expected} geometry, got {actual}")]
    WrongGeometry {
        /// The geometry kind the routine works on.
        expected: String,
        /// The geometry kind that was supplied.
        actual: String,
    },
}

/// Conversion error type
///
/// Represents failures while turning wire JSON into features or back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The shape type is not one of the supported kinds
    #[error("Unknown shape type: {type_name}")]
    UnknownShapeType {
        /// The type name found in the JSON.
        type_name: String,
    },

    /// A required field is missing
    #[error("{shape_type} is missing field '{field}'")]
    MissingField {
        /// The shape type being converted.
        shape_type: String,
        /// The missing field name.
        field: String,
    },

    /// A field has an unusable value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField {
        /// The field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The shape carries no permissions block
    #[error("Missing permissions for shape {shape_id}")]
    MissingPermissions {
        /// Combined roi:shape id.
        shape_id: String,
    },

    /// A combined id could not be parsed
    #[error("Invalid shape id '{value}'")]
    InvalidShapeId {
        /// The raw id text.
        value: String,
    },

    /// A points string could not be parsed
    #[error("Invalid points string '{value}'")]
    InvalidPointString {
        /// The raw points text.
        value: String,
    },

    /// A color could not be parsed or is out of range
    #[error("Invalid color '{value}'")]
    InvalidColor {
        /// The raw color text.
        value: String,
    },

    /// Geometry construction failed during conversion
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Persistence error type
///
/// Represents failures talking to the region store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The request could not be issued
    #[error("Request not sent: {reason}")]
    RequestNotSent {
        /// The reason the request was not sent.
        reason: String,
    },

    /// The backend rejected or failed the request
    #[error("Backend error: {message}")]
    Backend {
        /// The error message reported by the backend.
        message: String,
    },

    /// The response did not have the expected shape
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// Another reload is still pending
    #[error("A regions reload is already in flight")]
    ReloadInFlight,
}

/// Main error type for RoiKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Conversion error
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            Error::Geometry(_) | Error::Conversion(ConversionError::Geometry(_))
        )
    }

    /// Check if this is a conversion error
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }

    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
