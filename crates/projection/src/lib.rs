//! Coordinate reference system transformations.
//!
//! The grid engine treats reprojection as an opaque service behind the
//! [`Reproject`] trait. Transforms work point by point and report failure
//! per point, so a singularity at one coordinate never poisons a batch.
//!
//! [`Projector`] is the built-in implementation. It pivots every
//! conversion through geographic lon/lat and supports:
//!
//! - geographic (EPSG:4326, EPSG:4269)
//! - Web Mercator (EPSG:3857)
//! - polar stereographic north/south (EPSG:3413, EPSG:3031)
//! - Lambert Conformal Conic with arbitrary parameters
//!
//! All projections are spherical approximations.

pub mod error;
pub mod lambert;
pub mod mercator;
pub mod polar;
pub mod transform;

pub use error::{ProjectionError, ProjectionResult};
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use polar::PolarStereographic;
pub use transform::{Projector, Reproject};
