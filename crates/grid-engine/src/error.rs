//! Error types for the grid engine.
//!
//! Only structural problems surface as errors. Coordinates outside a grid,
//! per-point transform failures and empty interpolation inputs all degrade
//! into the missing-value sentinel instead.

use geo_common::GeoError;
use thiserror::Error;

/// Errors that can occur while building or processing fields and point sets.
#[derive(Error, Debug)]
pub enum GridError {
    /// An axis has fewer than the 2 samples interpolation needs.
    #[error("insufficient extent: {axis} axis has {len} sample(s), need at least 2")]
    InsufficientExtent { axis: &'static str, len: usize },

    /// Value matrix or operand shapes disagree.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: String, found: String },

    /// Point set columns have different lengths.
    #[error("point set length mismatch: {labels} labels, {coords} coordinates, {values} values")]
    LengthMismatch {
        labels: usize,
        coords: usize,
        values: usize,
    },

    /// An axis is empty, non-finite or not strictly monotonic.
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    /// Cell index outside the field.
    #[error("index ({col}, {row}) outside field of {cols}x{rows}")]
    IndexOutOfBounds {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },

    /// Interpolation parameter out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The whole target extent could not be derived through the transform.
    #[error("projection error: {0}")]
    Projection(String),

    /// Grid definition or bbox problem from the shared types.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yaml::Error> for GridError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for grid engine operations.
pub type Result<T> = std::result::Result<T, GridError>;
