//! Resampling across coordinate reference systems.
//!
//! Every output cell (or point) is mapped through the injected transform
//! on its own, so a transform failure only costs that cell. Fields lose
//! failed cells to the missing sentinel; points are dropped or kept as
//! missing depending on [`PointFailurePolicy`].

use std::borrow::Cow;

use geo_common::{BoundingBox, Crs, GridSpec};
use projection::{ProjectionResult, Reproject};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GridError, Result};
use crate::field::{axis_bounds, ScalarField};
use crate::sampler::{GridSampler, Sampler};
use crate::scatter;
use crate::station::PointSet;
use crate::types::ScatterMethod;

/// What happens to a point whose coordinates cannot be transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointFailurePolicy {
    /// Leave the point out of the result.
    #[default]
    Drop,
    /// Keep the point at its original coordinates with a missing value.
    KeepMissing,
}

/// Shift `lon` by whole turns into `[lo, lo + 360)`.
fn wrap_into(lon: f64, lo: f64) -> f64 {
    lo + (lon - lo).rem_euclid(360.0)
}

/// Source field ready for sampling, with the seam closed for global
/// geographic grids. The `f64` is the western edge of a geographic source;
/// sampled longitudes are wrapped into `[west, west + 360)` so grids stored
/// on 0..360 line up with transforms that return -180..180.
fn prepare_source<'a>(field: &'a ScalarField, crs: &Crs) -> (Cow<'a, ScalarField>, Option<f64>) {
    if !crs.is_geographic() {
        return (Cow::Borrowed(field), None);
    }
    let west = axis_bounds(field.x_axis()).0;
    match field.with_cyclic_column() {
        Some(closed) => (Cow::Owned(closed), Some(west)),
        None => (Cow::Borrowed(field), Some(west)),
    }
}

/// Resamples fields and point sets between CRSs using a [`Reproject`]
/// implementation.
#[derive(Debug, Clone, Default)]
pub struct ReprojectionResampler<R> {
    transform: R,
}

impl<R: Reproject> ReprojectionResampler<R> {
    pub fn new(transform: R) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &R {
        &self.transform
    }

    /// Transform one coordinate, skipping the transform for identical CRSs.
    fn map_point(&self, from: &Crs, to: &Crs, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if from == to {
            return Ok((x, y));
        }
        self.transform.transform_point(from, to, x, y)
    }

    /// Extent of `field` once expressed in `to`.
    ///
    /// A global geographic field maps onto the whole valid extent of the
    /// target CRS. Otherwise the corners and edge midpoints are
    /// transformed and enclosed; ones that fail are skipped.
    pub fn target_extent(&self, field: &ScalarField, from: &Crs, to: &Crs) -> Result<BoundingBox> {
        if from.is_geographic() && field.is_global() {
            if let Some(bounds) = to.valid_bounds() {
                debug!(to = %to, "Global source, using target CRS bounds");
                return Ok(bounds);
            }
        }

        let extent = field.extent();
        let xs = [extent.min_x, (extent.min_x + extent.max_x) / 2.0, extent.max_x];
        let ys = [extent.min_y, (extent.min_y + extent.max_y) / 2.0, extent.max_y];

        let mapped = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .filter_map(|(x, y)| self.map_point(from, to, x, y).ok())
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        BoundingBox::from_points(mapped).ok_or_else(|| {
            GridError::Projection(format!(
                "no corner of the source extent could be transformed from {} to {}",
                from, to
            ))
        })
    }

    /// Grid in `to` covering `field` with the same cell counts.
    pub fn target_grid(&self, field: &ScalarField, from: &Crs, to: &Crs) -> Result<GridSpec> {
        let extent = self.target_extent(field, from, to)?;
        Ok(GridSpec::from_bbox(&extent, field.nx(), field.ny())?)
    }

    /// Reproject `field` from `from` to `to` onto a grid derived from its
    /// transformed extent, keeping the source cell counts.
    pub fn reproject_field<S>(&self, field: &ScalarField, from: &Crs, to: &Crs, method: &S) -> Result<ScalarField>
    where
        S: Sampler + ?Sized,
    {
        let spec = self.target_grid(field, from, to)?;
        self.reproject_field_to(field, from, to, &spec.x_axis(), &spec.y_axis(), method)
    }

    /// Reproject `field` from `from` onto explicit axes in `to`.
    ///
    /// Each target cell is transformed back into `from` and sampled there.
    /// Cells whose transform fails are missing.
    pub fn reproject_field_to<S>(
        &self,
        field: &ScalarField,
        from: &Crs,
        to: &Crs,
        x_axis: &[f64],
        y_axis: &[f64],
        method: &S,
    ) -> Result<ScalarField>
    where
        S: Sampler + ?Sized,
    {
        let (source, wrap_west) = prepare_source(field, from);
        let grid = GridSampler::new(&source)?;
        let missing = field.missing_value();

        let mut values = Vec::with_capacity(x_axis.len() * y_axis.len());
        let mut failures = 0usize;
        for &y in y_axis {
            for &x in x_axis {
                let value = match self.map_point(to, from, x, y) {
                    Ok((sx, sy)) => {
                        let sx = wrap_west.map_or(sx, |west| wrap_into(sx, west));
                        grid.sample(method, sx, sy)
                    }
                    Err(err) => {
                        if failures == 0 {
                            debug!(x, y, error = %err, "First cell transform failure");
                        }
                        failures += 1;
                        missing
                    }
                };
                values.push(value);
            }
        }

        let cells = values.len();
        if failures > 0 {
            warn!(
                failures,
                cells,
                from = %from,
                to = %to,
                "Reprojection lost cells to transform failures"
            );
        }

        let out = ScalarField::new(x_axis.to_vec(), y_axis.to_vec(), values, missing)?
            .with_stagger(field.x_stagger(), field.y_stagger())
            .with_crs(*to);
        debug!(
            cells,
            filled_cells = out.valid_count(),
            from = %from,
            to = %to,
            "Field reprojected"
        );
        Ok(out)
    }

    /// Transform every point, dropping those that fail.
    pub fn reproject_points(&self, points: &PointSet, from: &Crs, to: &Crs) -> PointSet {
        self.reproject_points_with(points, from, to, PointFailurePolicy::Drop)
    }

    /// Transform every point, handling failures according to `policy`.
    pub fn reproject_points_with(
        &self,
        points: &PointSet,
        from: &Crs,
        to: &Crs,
        policy: PointFailurePolicy,
    ) -> PointSet {
        let missing = points.missing_value();
        let mut out = PointSet::with_capacity(points.len(), missing);
        let mut failures = 0usize;

        for station in points.iter() {
            match self.map_point(from, to, station.x, station.y) {
                Ok((x, y)) => out.append(station.label, x, y, station.value),
                Err(err) => {
                    failures += 1;
                    debug!(label = station.label, error = %err, "Point transform failed");
                    if policy == PointFailurePolicy::KeepMissing {
                        out.append(station.label, station.x, station.y, missing);
                    }
                }
            }
        }

        if failures > 0 {
            warn!(failures, points = points.len(), ?policy, "Point reprojection had failures");
        }
        out.with_crs(*to)
    }

    /// Sample `field` (in `field_crs`) at points given in `points_crs`.
    ///
    /// The output keeps the input labels and coordinates. Points whose
    /// transform fails, or that fall off the grid, are missing.
    pub fn sample_points<S>(
        &self,
        field: &ScalarField,
        field_crs: &Crs,
        points: &PointSet,
        points_crs: &Crs,
        method: &S,
    ) -> Result<PointSet>
    where
        S: Sampler + ?Sized,
    {
        let (source, wrap_west) = prepare_source(field, field_crs);
        let grid = GridSampler::new(&source)?;
        let missing = field.missing_value();

        let mut out = PointSet::with_capacity(points.len(), missing);
        let mut failures = 0usize;
        for station in points.iter() {
            let value = match self.map_point(points_crs, field_crs, station.x, station.y) {
                Ok((fx, fy)) => {
                    let fx = wrap_west.map_or(fx, |west| wrap_into(fx, west));
                    grid.sample(method, fx, fy)
                }
                Err(_) => {
                    failures += 1;
                    missing
                }
            };
            out.append(station.label, station.x, station.y, value);
        }

        if failures > 0 {
            warn!(failures, points = points.len(), "Grid-to-point sampling had transform failures");
        }
        Ok(out.with_crs(*points_crs))
    }

    /// Reproject points into `to`, then interpolate them onto `spec`.
    pub fn interpolate_points(
        &self,
        points: &PointSet,
        from: &Crs,
        to: &Crs,
        spec: &GridSpec,
        method: &ScatterMethod,
        missing: f64,
    ) -> Result<ScalarField> {
        let reprojected = self.reproject_points(points, from, to);
        scatter::interpolate(&reprojected, spec, method, missing)
    }
}
