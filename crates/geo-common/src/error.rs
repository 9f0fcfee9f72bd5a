//! Error types for the shared geometry types.

use thiserror::Error;

use crate::{BboxParseError, CrsParseError};

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors raised while building or parsing shared geometry values.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid grid specification: {0}")]
    InvalidGridSpec(String),

    #[error(transparent)]
    Bbox(#[from] BboxParseError),

    #[error(transparent)]
    Crs(#[from] CrsParseError),
}
