//! Point lookup and resampling on regular grids.
//!
//! Index resolution assumes uniform spacing: the cell containing `x` is
//! `floor((x - axis[0]) / delta)` with `delta = axis[1] - axis[0]`, clamped
//! so the last edge belongs to the last cell. Descending axes work the same
//! way since `delta` is then negative.

use tracing::debug;

use crate::error::Result;
use crate::field::{axis_bounds, axis_delta, require_extent, ScalarField};
use crate::station::PointSet;
use crate::types::InterpolationMethod;

/// Strategy for evaluating a field at an arbitrary coordinate.
pub trait Sampler {
    /// Value at `(x, y)`, or the field's missing sentinel.
    fn evaluate(&self, grid: &GridSampler<'_>, x: f64, y: f64) -> f64;
}

impl Sampler for InterpolationMethod {
    fn evaluate(&self, grid: &GridSampler<'_>, x: f64, y: f64) -> f64 {
        match self {
            InterpolationMethod::Bilinear => grid.value_at(x, y),
            InterpolationMethod::Nearest => grid.nearest_at(x, y),
        }
    }
}

impl<S: Sampler + ?Sized> Sampler for &S {
    fn evaluate(&self, grid: &GridSampler<'_>, x: f64, y: f64) -> f64 {
        (**self).evaluate(grid, x, y)
    }
}

/// Resolved position of a coordinate along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisPosition {
    /// Lower index of the bracketing pair, at most `len - 2`.
    index: usize,
    /// Offset from `index` in units of the step, in `[0, 1]`.
    fraction: f64,
}

/// Geometry of one axis, resolved once per sampler.
#[derive(Debug, Clone, Copy)]
struct AxisGeometry {
    origin: f64,
    delta: f64,
    min: f64,
    max: f64,
    len: usize,
}

impl AxisGeometry {
    fn new(axis: &[f64]) -> Self {
        let (min, max) = axis_bounds(axis);
        Self {
            origin: axis[0],
            delta: axis_delta(axis),
            min,
            max,
            len: axis.len(),
        }
    }

    fn contains(&self, coord: f64) -> bool {
        coord >= self.min && coord <= self.max
    }

    fn locate(&self, coord: f64) -> Option<AxisPosition> {
        if !self.contains(coord) {
            return None;
        }
        let position = (coord - self.origin) / self.delta;
        let index = (position.floor().max(0.0) as usize).min(self.len - 2);
        Some(AxisPosition {
            index,
            fraction: position - index as f64,
        })
    }

    fn nearest(&self, coord: f64) -> Option<usize> {
        let pos = self.locate(coord)?;
        let index = if pos.fraction >= 0.5 {
            pos.index + 1
        } else {
            pos.index
        };
        Some(index.min(self.len - 1))
    }
}

/// Evaluates a [`ScalarField`] at arbitrary coordinates.
///
/// Construction checks that both axes have at least 2 samples; after that
/// every lookup is infallible. Coordinates outside the axes' range give the
/// field's missing sentinel.
#[derive(Debug, Clone, Copy)]
pub struct GridSampler<'a> {
    field: &'a ScalarField,
    x: AxisGeometry,
    y: AxisGeometry,
}

impl<'a> GridSampler<'a> {
    pub fn new(field: &'a ScalarField) -> Result<Self> {
        require_extent("x", field.x_axis())?;
        require_extent("y", field.y_axis())?;
        Ok(Self {
            field,
            x: AxisGeometry::new(field.x_axis()),
            y: AxisGeometry::new(field.y_axis()),
        })
    }

    pub fn field(&self) -> &'a ScalarField {
        self.field
    }

    pub fn missing_value(&self) -> f64 {
        self.field.missing_value()
    }

    /// Whether `x` lies within the x axis range (inclusive).
    pub fn contains_x(&self, x: f64) -> bool {
        self.x.contains(x)
    }

    /// Whether `y` lies within the y axis range (inclusive).
    pub fn contains_y(&self, y: f64) -> bool {
        self.y.contains(y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    /// Lower-left `(col, row)` of the cell bracketing `(x, y)`.
    pub fn cell_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let px = self.x.locate(x)?;
        let py = self.y.locate(y)?;
        Some((px.index, py.index))
    }

    /// `(col, row)` of the grid node nearest to `(x, y)`.
    pub fn nearest_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((self.x.nearest(x)?, self.y.nearest(y)?))
    }

    fn raw(&self, col: usize, row: usize) -> f64 {
        self.field.values()[row * self.x.len + col]
    }

    /// Bilinear value at `(x, y)`.
    ///
    /// With missing corners the result degrades: one present corner gives
    /// its value, two or three give their mean, none gives missing. A
    /// coordinate that falls exactly on a present node returns that node.
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        let missing = self.missing_value();
        let (Some(px), Some(py)) = (self.x.locate(x), self.y.locate(y)) else {
            return missing;
        };

        let (i, j) = (px.index, py.index);
        let (fx, fy) = (px.fraction, py.fraction);

        let a = self.raw(i, j);
        let b = self.raw(i + 1, j);
        let c = self.raw(i, j + 1);
        let d = self.raw(i + 1, j + 1);

        let on_x_node = fx == 0.0 || fx == 1.0;
        let on_y_node = fy == 0.0 || fy == 1.0;
        if on_x_node && on_y_node {
            let node = match (fx == 1.0, fy == 1.0) {
                (false, false) => a,
                (true, false) => b,
                (false, true) => c,
                (true, true) => d,
            };
            if !self.field.is_missing(node) {
                return node;
            }
        }

        let (sum, count) = [a, b, c, d]
            .into_iter()
            .filter(|&v| !self.field.is_missing(v))
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        match count {
            0 => missing,
            1..=3 => sum / count as f64,
            _ => {
                let x1 = a + (c - a) * fy;
                let x2 = b + (d - b) * fy;
                x1 + (x2 - x1) * fx
            }
        }
    }

    /// Raw value of the node nearest to `(x, y)`; missing passes through.
    pub fn nearest_at(&self, x: f64, y: f64) -> f64 {
        match self.nearest_index(x, y) {
            Some((col, row)) => self.raw(col, row),
            None => self.missing_value(),
        }
    }

    /// Evaluate with the given method.
    pub fn sample<S: Sampler + ?Sized>(&self, method: &S, x: f64, y: f64) -> f64 {
        method.evaluate(self, x, y)
    }
}

/// Bilinear value of `field` at `(x, y)`.
pub fn value_at(field: &ScalarField, x: f64, y: f64) -> Result<f64> {
    Ok(GridSampler::new(field)?.value_at(x, y))
}

/// Nearest-node value of `field` at `(x, y)`.
pub fn nearest_at(field: &ScalarField, x: f64, y: f64) -> Result<f64> {
    Ok(GridSampler::new(field)?.nearest_at(x, y))
}

/// Evaluate `field` on every `(new_x[i], new_y[j])`.
///
/// Points outside the source range on either axis are missing without
/// being evaluated. The result keeps the source sentinel, stagger flags
/// and CRS.
pub fn resample<S>(field: &ScalarField, new_x: &[f64], new_y: &[f64], method: &S) -> Result<ScalarField>
where
    S: Sampler + ?Sized,
{
    let grid = GridSampler::new(field)?;
    let missing = field.missing_value();

    let x_inside: Vec<bool> = new_x.iter().map(|&x| grid.contains_x(x)).collect();
    let mut values = Vec::with_capacity(new_x.len() * new_y.len());

    for &y in new_y {
        let row_inside = grid.contains_y(y);
        for (&x, &inside) in new_x.iter().zip(&x_inside) {
            if row_inside && inside {
                values.push(method.evaluate(&grid, x, y));
            } else {
                values.push(missing);
            }
        }
    }

    let resampled = ScalarField::new(new_x.to_vec(), new_y.to_vec(), values, missing)?.with_metadata_of(field);
    debug!(
        from = ?field.dims(),
        to = ?resampled.dims(),
        filled_cells = resampled.valid_count(),
        "Field resampled"
    );
    Ok(resampled)
}

/// Evaluate `field` at each station, preserving labels and coordinates.
///
/// The output uses the field's sentinel; stations off the grid are missing.
pub fn to_points<S>(field: &ScalarField, points: &PointSet, method: &S) -> Result<PointSet>
where
    S: Sampler + ?Sized,
{
    let grid = GridSampler::new(field)?;
    let mut out = PointSet::with_capacity(points.len(), field.missing_value());
    for station in points.iter() {
        let value = grid.sample(method, station.x, station.y);
        out.append(station.label, station.x, station.y, value);
    }
    out.set_crs(points.crs().copied());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use test_utils::{assert_approx_eq, reference, MISSING};

    fn reference_field() -> ScalarField {
        ScalarField::new(
            reference::X_AXIS.to_vec(),
            reference::Y_AXIS.to_vec(),
            reference::VALUES.to_vec(),
            MISSING,
        )
        .unwrap()
    }

    #[test]
    fn test_value_at_cell_centre() {
        let field = reference_field();
        let grid = GridSampler::new(&field).unwrap();
        assert_approx_eq!(grid.value_at(0.5, 0.5), 3.0, 1e-12);
        assert_approx_eq!(grid.value_at(1.5, 1.5), 7.0, 1e-12);
    }

    #[test]
    fn test_value_at_outside_is_missing() {
        let field = reference_field();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.value_at(5.0, 5.0), MISSING);
        assert_eq!(grid.value_at(-0.001, 1.0), MISSING);
        assert_eq!(grid.nearest_at(1.0, 2.5), MISSING);
    }

    #[test]
    fn test_value_at_last_edge_inclusive() {
        let field = reference_field();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.value_at(2.0, 2.0), 9.0);
        assert_eq!(grid.value_at(2.0, 0.0), 3.0);
        assert_eq!(grid.cell_index(2.0, 2.0), Some((1, 1)));
    }

    #[test]
    fn test_missing_corner_policy() {
        let mut field = reference_field();
        // Cell (0,0)-(1,1) has corners 1, 2, 4, 5
        field.set(0, 0, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_approx_eq!(grid.value_at(0.25, 0.25), (2.0 + 4.0 + 5.0) / 3.0, 1e-12);

        field.set(1, 0, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_approx_eq!(grid.value_at(0.25, 0.25), 4.5, 1e-12);

        field.set(0, 1, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.value_at(0.25, 0.25), 5.0);

        field.set(1, 1, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.value_at(0.25, 0.25), MISSING);
    }

    #[test]
    fn test_nan_corners_are_left_out_of_the_mean() {
        let mut field = reference_field();
        field.set(0, 0, f64::NAN).unwrap();
        field.set(1, 1, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        // Corners 2 and 4 remain
        assert_approx_eq!(grid.value_at(0.75, 0.25), 3.0, 1e-12);
        assert_approx_eq!(grid.value_at(0.1, 0.9), 3.0, 1e-12);
    }

    #[test]
    fn test_exact_node_with_missing_neighbour() {
        let mut field = reference_field();
        field.set(1, 0, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.value_at(1.0, 1.0), 5.0);
        assert_eq!(grid.value_at(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_nearest_rounding() {
        let field = reference_field();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.nearest_at(0.49, 0.0), 1.0);
        assert_eq!(grid.nearest_at(0.5, 0.0), 2.0);
        assert_eq!(grid.nearest_at(1.6, 1.4), 6.0);
        assert_eq!(grid.nearest_index(2.0, 2.0), Some((2, 2)));
    }

    #[test]
    fn test_nearest_passes_missing_through() {
        let mut field = reference_field();
        field.set(1, 1, MISSING).unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_eq!(grid.nearest_at(1.1, 0.9), MISSING);
    }

    #[test]
    fn test_descending_y_axis() {
        // Same data as the reference grid, rows stored north to south
        let field = ScalarField::new(
            vec![0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0],
            vec![7.0, 8.0, 9.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0],
            MISSING,
        )
        .unwrap();
        let grid = GridSampler::new(&field).unwrap();
        assert_approx_eq!(grid.value_at(0.5, 0.5), 3.0, 1e-12);
        assert_eq!(grid.value_at(0.0, 0.0), 1.0);
        assert_eq!(grid.nearest_at(2.0, 1.9), 9.0);
        assert_eq!(grid.value_at(0.0, 2.5), MISSING);
    }

    #[test]
    fn test_insufficient_extent() {
        let field = ScalarField::new(vec![0.0], vec![0.0, 1.0], vec![1.0, 2.0], MISSING).unwrap();
        assert!(matches!(
            GridSampler::new(&field),
            Err(GridError::InsufficientExtent { axis: "x", len: 1 })
        ));
        assert!(value_at(&field, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_sampler_dispatch() {
        let field = reference_field();
        let grid = GridSampler::new(&field).unwrap();
        assert_approx_eq!(grid.sample(&InterpolationMethod::Bilinear, 0.5, 0.0), 1.5, 1e-12);
        assert_eq!(grid.sample(&InterpolationMethod::Nearest, 0.5, 0.0), 2.0);
    }

    #[test]
    fn test_resample_marks_outside_missing() {
        let field = reference_field().with_stagger(true, true);
        let out = resample(&field, &[-1.0, 1.0], &[1.0, 3.0], &InterpolationMethod::Bilinear).unwrap();
        assert_eq!(out.values(), &[MISSING, 5.0, MISSING, MISSING]);
        assert!(out.x_stagger() && out.y_stagger());
    }

    #[test]
    fn test_to_points_keeps_labels() {
        let field = reference_field();
        let points = PointSet::from_records([("in", 0.5, 0.5, 0.0), ("out", 9.0, 9.0, 0.0)], -1.0);
        let sampled = to_points(&field, &points, &InterpolationMethod::Bilinear).unwrap();
        assert_eq!(sampled.labels(), points.labels());
        assert_eq!(sampled.coords(), points.coords());
        assert_approx_eq!(sampled.values()[0], 3.0, 1e-12);
        assert_eq!(sampled.values()[1], MISSING);
        assert_eq!(sampled.missing_value(), MISSING);
    }
}
