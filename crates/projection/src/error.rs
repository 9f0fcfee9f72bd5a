//! Error types for coordinate transforms.

use thiserror::Error;

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Failure to transform a single coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Input coordinate is NaN or infinite.
    #[error("non-finite coordinate ({0}, {1})")]
    NonFinite(f64, f64),

    /// Input lies outside the projection's domain (e.g. latitude beyond ±90°).
    #[error("coordinate ({x}, {y}) outside the domain of {projection}")]
    OutOfDomain {
        projection: &'static str,
        x: f64,
        y: f64,
    },

    /// Input hits a point the projection maps to infinity.
    #[error("{projection} is singular at ({x}, {y})")]
    Singular {
        projection: &'static str,
        x: f64,
        y: f64,
    },
}

/// Reject NaN/infinite input before any trigonometry runs.
pub(crate) fn ensure_finite(x: f64, y: f64) -> ProjectionResult<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFinite(x, y))
    }
}

/// Reject latitudes outside ±90°.
pub(crate) fn ensure_latitude(projection: &'static str, lon: f64, lat: f64) -> ProjectionResult<()> {
    ensure_finite(lon, lat)?;
    if lat.abs() > 90.0 {
        return Err(ProjectionError::OutOfDomain {
            projection,
            x: lon,
            y: lat,
        });
    }
    Ok(())
}
