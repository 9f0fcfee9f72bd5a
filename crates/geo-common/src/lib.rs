//! Common types shared across the meteo-grid workspace.
//!
//! Everything here is a plain value type: bounding boxes, coordinate
//! reference system identifiers and the regular grid definition consumed
//! by the interpolation engine to materialize target axes.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::{Crs, CrsCode, CrsParseError, LambertParams};
pub use error::{GeoError, GeoResult};
pub use grid::GridSpec;
