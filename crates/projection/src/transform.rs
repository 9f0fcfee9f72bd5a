//! The coordinate transform seam used by the grid engine.

use geo_common::{Crs, CrsCode};

use crate::error::{ensure_finite, ProjectionResult};
use crate::lambert::LambertConformal;
use crate::mercator::WebMercator;
use crate::polar::PolarStereographic;

/// Point-wise coordinate transform between two CRSs.
///
/// Implementations report failure per point. Callers that transform many
/// points must isolate failures instead of aborting the batch.
pub trait Reproject {
    /// Transform a single coordinate from `from` to `to`.
    fn transform_point(&self, from: &Crs, to: &Crs, x: f64, y: f64)
        -> ProjectionResult<(f64, f64)>;

    /// Transform a batch, one result per input point.
    fn transform_points(
        &self,
        from: &Crs,
        to: &Crs,
        points: &[(f64, f64)],
    ) -> Vec<ProjectionResult<(f64, f64)>> {
        points
            .iter()
            .map(|&(x, y)| self.transform_point(from, to, x, y))
            .collect()
    }
}

impl<T: Reproject + ?Sized> Reproject for &T {
    fn transform_point(
        &self,
        from: &Crs,
        to: &Crs,
        x: f64,
        y: f64,
    ) -> ProjectionResult<(f64, f64)> {
        (**self).transform_point(from, to, x, y)
    }
}

/// Built-in transform that pivots through geographic lon/lat.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector;

impl Projector {
    pub fn new() -> Self {
        Self
    }

    /// Convert native coordinates of `crs` to lon/lat degrees.
    pub fn to_geographic(&self, crs: &Crs, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        match crs {
            Crs::Code(CrsCode::Epsg4326) | Crs::Code(CrsCode::Epsg4269) => {
                ensure_finite(x, y)?;
                Ok((x, y))
            }
            Crs::Code(CrsCode::Epsg3857) => WebMercator.inverse(x, y),
            Crs::Code(CrsCode::Epsg3413) => PolarStereographic::north_3413().inverse(x, y),
            Crs::Code(CrsCode::Epsg3031) => PolarStereographic::south_3031().inverse(x, y),
            Crs::Lambert(params) => LambertConformal::new(params).inverse(x, y),
        }
    }

    /// Convert lon/lat degrees to native coordinates of `crs`.
    pub fn from_geographic(&self, crs: &Crs, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        match crs {
            Crs::Code(CrsCode::Epsg4326) | Crs::Code(CrsCode::Epsg4269) => {
                crate::error::ensure_latitude("geographic", lon, lat)?;
                Ok((lon, lat))
            }
            Crs::Code(CrsCode::Epsg3857) => WebMercator.forward(lon, lat),
            Crs::Code(CrsCode::Epsg3413) => PolarStereographic::north_3413().forward(lon, lat),
            Crs::Code(CrsCode::Epsg3031) => PolarStereographic::south_3031().forward(lon, lat),
            Crs::Lambert(params) => LambertConformal::new(params).forward(lon, lat),
        }
    }
}

impl Reproject for Projector {
    fn transform_point(
        &self,
        from: &Crs,
        to: &Crs,
        x: f64,
        y: f64,
    ) -> ProjectionResult<(f64, f64)> {
        if from == to {
            ensure_finite(x, y)?;
            return Ok((x, y));
        }
        let (lon, lat) = self.to_geographic(from, x, y)?;
        self.from_geographic(to, lon, lat)
    }
}
