//! Regular grid definitions.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GeoError, GeoResult};

/// Definition of a regular grid by its extent and point counts.
///
/// The first and last axis values sit exactly on `min`/`max`, so the step
/// along each axis is `(max - min) / (count - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// Number of points in the X direction
    pub x_count: usize,
    /// Number of points in the Y direction
    pub y_count: usize,
}

impl GridSpec {
    /// Create a new grid specification.
    ///
    /// Fails when either count is below 2, an extent is empty or inverted,
    /// or any bound is not finite.
    pub fn new(
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        x_count: usize,
        y_count: usize,
    ) -> GeoResult<Self> {
        let spec = Self {
            min_x,
            max_x,
            min_y,
            max_y,
            x_count,
            y_count,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Grid covering `bbox` with `nx` by `ny` points.
    pub fn from_bbox(bbox: &BoundingBox, nx: usize, ny: usize) -> GeoResult<Self> {
        Self::new(bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y, nx, ny)
    }

    /// Grid spanning the first and last values of existing axes.
    ///
    /// Only the endpoints and lengths are used; intermediate spacing is
    /// assumed uniform.
    pub fn from_axes(x_axis: &[f64], y_axis: &[f64]) -> GeoResult<Self> {
        let (Some(&x0), Some(&x1)) = (x_axis.first(), x_axis.last()) else {
            return Err(GeoError::InvalidGridSpec("empty x axis".to_string()));
        };
        let (Some(&y0), Some(&y1)) = (y_axis.first(), y_axis.last()) else {
            return Err(GeoError::InvalidGridSpec("empty y axis".to_string()));
        };
        Self::new(
            x0.min(x1),
            x0.max(x1),
            y0.min(y1),
            y0.max(y1),
            x_axis.len(),
            y_axis.len(),
        )
    }

    /// Check the structural invariants of the definition.
    pub fn validate(&self) -> GeoResult<()> {
        if self.x_count < 2 || self.y_count < 2 {
            return Err(GeoError::InvalidGridSpec(format!(
                "grid needs at least 2 points per axis, got {}x{}",
                self.x_count, self.y_count
            )));
        }
        let bounds = [self.min_x, self.max_x, self.min_y, self.max_y];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::InvalidGridSpec(
                "grid bounds must be finite".to_string(),
            ));
        }
        if self.max_x <= self.min_x || self.max_y <= self.min_y {
            return Err(GeoError::InvalidGridSpec(format!(
                "empty extent x=[{}, {}] y=[{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    pub fn x_delta(&self) -> f64 {
        (self.max_x - self.min_x) / (self.x_count - 1) as f64
    }

    pub fn y_delta(&self) -> f64 {
        (self.max_y - self.min_y) / (self.y_count - 1) as f64
    }

    /// Materialize the X axis coordinates.
    pub fn x_axis(&self) -> Vec<f64> {
        build_axis(self.min_x, self.x_delta(), self.x_count)
    }

    /// Materialize the Y axis coordinates.
    pub fn y_axis(&self) -> Vec<f64> {
        build_axis(self.min_y, self.y_delta(), self.y_count)
    }

    /// Extent of the grid points.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Coordinates of grid point `(i, j)`, where `i` is the column.
    pub fn index_to_coord(&self, i: usize, j: usize) -> Option<(f64, f64)> {
        if i >= self.x_count || j >= self.y_count {
            return None;
        }
        Some((
            self.min_x + i as f64 * self.x_delta(),
            self.min_y + j as f64 * self.y_delta(),
        ))
    }

    /// Convert coordinates to the nearest grid index.
    pub fn coord_to_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let i = ((x - self.min_x) / self.x_delta()).round();
        let j = ((y - self.min_y) / self.y_delta()).round();

        if i < 0.0 || j < 0.0 || i >= self.x_count as f64 || j >= self.y_count as f64 {
            return None;
        }

        Some((i as usize, j as usize))
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.x_count * self.y_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Axis of `count` values starting at `start`. The last value is computed
/// from the index, not by accumulation, so it lands on the configured max.
fn build_axis(start: f64, delta: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * delta).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_from_spec() {
        let spec = GridSpec::new(0.0, 10.0, -5.0, 5.0, 11, 3).unwrap();
        assert_eq!(spec.x_delta(), 1.0);
        assert_eq!(spec.y_delta(), 5.0);
        assert_eq!(spec.x_axis().len(), 11);
        assert_eq!(spec.y_axis(), vec![-5.0, 0.0, 5.0]);
        assert_eq!(spec.len(), 33);
    }

    #[test]
    fn test_rejects_degenerate_counts() {
        assert!(GridSpec::new(0.0, 1.0, 0.0, 1.0, 1, 5).is_err());
        assert!(GridSpec::new(0.0, 0.0, 0.0, 1.0, 5, 5).is_err());
        assert!(GridSpec::new(0.0, f64::NAN, 0.0, 1.0, 5, 5).is_err());
    }

    #[test]
    fn test_coord_to_index() {
        let spec = GridSpec::new(0.0, 4.0, 0.0, 4.0, 5, 5).unwrap();
        assert_eq!(spec.coord_to_index(1.4, 2.6), Some((1, 3)));
        assert_eq!(spec.coord_to_index(-1.0, 0.0), None);
        assert_eq!(spec.index_to_coord(4, 4), Some((4.0, 4.0)));
        assert_eq!(spec.index_to_coord(5, 0), None);
    }

    #[test]
    fn test_from_axes_descending() {
        let spec = GridSpec::from_axes(&[0.0, 1.0, 2.0], &[10.0, 5.0, 0.0]).unwrap();
        assert_eq!(spec.min_y, 0.0);
        assert_eq!(spec.max_y, 10.0);
        assert_eq!(spec.y_count, 3);
    }
}
