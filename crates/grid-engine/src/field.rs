//! Regular 2D grid container.

use std::ops::Range;

use geo_common::{BoundingBox, Crs, GridSpec};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MISSING_VALUE;
use crate::error::{GridError, Result};
use crate::station::PointSet;

/// Tolerance for the 360° span check on longitude axes.
const GLOBAL_SPAN_EPSILON: f64 = 1e-6;

/// A scalar field on a regular grid.
///
/// Values are stored row-major: row `j` holds the values along `y_axis[j]`,
/// column `i` those along `x_axis[i]`. Axes are non-empty and strictly
/// monotonic (ascending or descending). Most operators assume uniform
/// spacing and take the step from the first two samples; non-uniform axes
/// give approximate results.
///
/// Cells equal to the missing sentinel (and NaN cells) carry no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldRecord")]
pub struct ScalarField {
    x_axis: Vec<f64>,
    y_axis: Vec<f64>,
    values: Vec<f64>,
    missing: f64,
    x_stagger: bool,
    y_stagger: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    crs: Option<Crs>,
}

/// Wire form of [`ScalarField`], validated on conversion.
#[derive(Deserialize)]
struct FieldRecord {
    x_axis: Vec<f64>,
    y_axis: Vec<f64>,
    values: Vec<f64>,
    #[serde(default = "default_missing")]
    missing: f64,
    #[serde(default)]
    x_stagger: bool,
    #[serde(default)]
    y_stagger: bool,
    #[serde(default)]
    crs: Option<Crs>,
}

fn default_missing() -> f64 {
    DEFAULT_MISSING_VALUE
}

impl TryFrom<FieldRecord> for ScalarField {
    type Error = GridError;

    fn try_from(record: FieldRecord) -> Result<Self> {
        let mut field = Self::new(record.x_axis, record.y_axis, record.values, record.missing)?
            .with_stagger(record.x_stagger, record.y_stagger);
        field.crs = record.crs;
        Ok(field)
    }
}

/// Reject empty, non-finite or non-monotonic axes.
pub(crate) fn validate_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(GridError::InvalidAxis(format!("{} axis is empty", name)));
    }
    if let Some(bad) = axis.iter().find(|v| !v.is_finite()) {
        return Err(GridError::InvalidAxis(format!(
            "{} axis contains non-finite value {}",
            name, bad
        )));
    }
    if axis.len() >= 2 {
        let ascending = axis[1] > axis[0];
        let monotonic = axis
            .windows(2)
            .all(|w| if ascending { w[1] > w[0] } else { w[1] < w[0] });
        if !monotonic {
            return Err(GridError::InvalidAxis(format!(
                "{} axis is not strictly monotonic",
                name
            )));
        }
    }
    Ok(())
}

/// Fail with `InsufficientExtent` unless the axis has at least 2 samples.
pub(crate) fn require_extent(axis: &'static str, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(GridError::InsufficientExtent {
            axis,
            len: values.len(),
        });
    }
    Ok(())
}

/// Step between the first two samples, 0.0 for a single-sample axis.
pub(crate) fn axis_delta(axis: &[f64]) -> f64 {
    if axis.len() < 2 {
        0.0
    } else {
        axis[1] - axis[0]
    }
}

/// `(min, max)` of the axis endpoints.
pub(crate) fn axis_bounds(axis: &[f64]) -> (f64, f64) {
    let first = axis[0];
    let last = axis[axis.len() - 1];
    (first.min(last), first.max(last))
}

/// Index of the axis sample nearest to `coord`, assuming uniform spacing.
fn nearest_axis_index(axis: &[f64], coord: f64) -> Option<usize> {
    let delta = axis_delta(axis);
    if delta == 0.0 {
        return None;
    }
    let idx = ((coord - axis[0]) / delta).round();
    if !idx.is_finite() || idx < 0.0 || idx > (axis.len() - 1) as f64 {
        return None;
    }
    Some(idx as usize)
}

/// Contiguous index range of axis samples inside `[lo, hi]`.
fn axis_range_within(axis: &[f64], lo: f64, hi: f64) -> Range<usize> {
    let inside = |v: &f64| *v >= lo && *v <= hi;
    match axis.iter().position(inside) {
        Some(start) => {
            let end = axis.iter().rposition(inside).unwrap_or(start) + 1;
            start..end
        }
        None => 0..0,
    }
}

impl ScalarField {
    /// Create a field from axes and row-major values.
    pub fn new(x_axis: Vec<f64>, y_axis: Vec<f64>, values: Vec<f64>, missing: f64) -> Result<Self> {
        validate_axis("x", &x_axis)?;
        validate_axis("y", &y_axis)?;

        let expected = x_axis.len() * y_axis.len();
        if values.len() != expected {
            return Err(GridError::dimension_mismatch(
                format!("{}x{} = {} values", y_axis.len(), x_axis.len(), expected),
                format!("{} values", values.len()),
            ));
        }

        Ok(Self {
            x_axis,
            y_axis,
            values,
            missing,
            x_stagger: false,
            y_stagger: false,
            crs: None,
        })
    }

    /// Create a field from one vector per row (`rows[j]` lies along `y_axis[j]`).
    pub fn from_rows(
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        rows: Vec<Vec<f64>>,
        missing: f64,
    ) -> Result<Self> {
        if rows.len() != y_axis.len() {
            return Err(GridError::dimension_mismatch(
                format!("{} rows", y_axis.len()),
                format!("{} rows", rows.len()),
            ));
        }
        if let Some((j, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != x_axis.len())
        {
            return Err(GridError::dimension_mismatch(
                format!("{} columns", x_axis.len()),
                format!("{} columns in row {}", row.len(), j),
            ));
        }
        Self::new(x_axis, y_axis, rows.concat(), missing)
    }

    /// Create a field covering `spec` with every cell set to `value`.
    pub fn from_spec(spec: &GridSpec, value: f64, missing: f64) -> Result<Self> {
        spec.validate()?;
        Self::new(spec.x_axis(), spec.y_axis(), vec![value; spec.len()], missing)
    }

    /// Bin irregular samples onto the grid defined by `x_axis` / `y_axis`.
    ///
    /// Each sample goes to the cell whose coordinates are nearest. Samples
    /// falling into the same cell are averaged; cells without samples are
    /// missing. Samples off the grid or at non-finite coordinates are
    /// ignored, as are missing or non-finite values.
    pub fn from_irregular(
        xs: &[f64],
        ys: &[f64],
        values: &[f64],
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        missing: f64,
    ) -> Result<Self> {
        if xs.len() != values.len() || ys.len() != values.len() {
            return Err(GridError::dimension_mismatch(
                format!("{} x and y coordinates", values.len()),
                format!("{} x, {} y", xs.len(), ys.len()),
            ));
        }
        require_extent("x", &x_axis)?;
        require_extent("y", &y_axis)?;

        let nx = x_axis.len();
        let cells = nx * y_axis.len();
        let mut sums = vec![0.0; cells];
        let mut counts = vec![0usize; cells];

        for ((&x, &y), &v) in xs.iter().zip(ys).zip(values) {
            if v == missing || !v.is_finite() || !x.is_finite() || !y.is_finite() {
                continue;
            }
            if let (Some(i), Some(j)) = (nearest_axis_index(&x_axis, x), nearest_axis_index(&y_axis, y)) {
                let idx = j * nx + i;
                sums[idx] += v;
                counts[idx] += 1;
            }
        }

        let binned = sums
            .iter()
            .zip(&counts)
            .map(|(&s, &n)| if n == 0 { missing } else { s / n as f64 })
            .collect();

        Self::new(x_axis, y_axis, binned, missing)
    }

    /// Attach a coordinate reference system.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Set the cell-edge flags for each axis.
    pub fn with_stagger(mut self, x_stagger: bool, y_stagger: bool) -> Self {
        self.x_stagger = x_stagger;
        self.y_stagger = y_stagger;
        self
    }

    /// Copy stagger flags and CRS from another field.
    pub(crate) fn with_metadata_of(mut self, other: &ScalarField) -> Self {
        self.x_stagger = other.x_stagger;
        self.y_stagger = other.y_stagger;
        self.crs = other.crs;
        self
    }

    pub fn x_axis(&self) -> &[f64] {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &[f64] {
        &self.y_axis
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the field, returning its row-major values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn missing_value(&self) -> f64 {
        self.missing
    }

    /// Change the sentinel without touching stored values.
    ///
    /// Use [`ScalarField::replace_missing`] to rewrite missing cells as well.
    pub fn set_missing_value(&mut self, missing: f64) {
        self.missing = missing;
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    pub fn x_stagger(&self) -> bool {
        self.x_stagger
    }

    pub fn y_stagger(&self) -> bool {
        self.y_stagger
    }

    /// Number of columns (x samples).
    pub fn nx(&self) -> usize {
        self.x_axis.len()
    }

    /// Number of rows (y samples).
    pub fn ny(&self) -> usize {
        self.y_axis.len()
    }

    /// Shape as `(rows, columns)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `value` stands for missing data in this field.
    pub fn is_missing(&self, value: f64) -> bool {
        value == self.missing || value.is_nan()
    }

    /// Value at column `col`, row `row`.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.nx() || row >= self.ny() {
            return None;
        }
        Some(self.values[row * self.nx() + col])
    }

    /// Overwrite the value at column `col`, row `row`.
    pub fn set(&mut self, col: usize, row: usize, value: f64) -> Result<()> {
        if col >= self.nx() || row >= self.ny() {
            return Err(GridError::IndexOutOfBounds {
                col,
                row,
                cols: self.nx(),
                rows: self.ny(),
            });
        }
        let nx = self.nx();
        self.values[row * nx + col] = value;
        Ok(())
    }

    /// Uniform x step taken from the first two samples (signed).
    pub fn x_delta(&self) -> f64 {
        axis_delta(&self.x_axis)
    }

    /// Uniform y step taken from the first two samples (signed).
    pub fn y_delta(&self) -> f64 {
        axis_delta(&self.y_axis)
    }

    /// Bounding box of the axis coordinates.
    pub fn extent(&self) -> BoundingBox {
        let (min_x, max_x) = axis_bounds(&self.x_axis);
        let (min_y, max_y) = axis_bounds(&self.y_axis);
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Whether the x axis wraps the full 360° of longitude.
    ///
    /// True when the span equals 360°, either with the seam column repeated
    /// or with one step left before it. Fields in a projected CRS never
    /// count as global.
    pub fn is_global(&self) -> bool {
        if self.nx() < 2 || self.crs.is_some_and(|c| !c.is_geographic()) {
            return false;
        }
        let span = (self.x_axis[self.nx() - 1] - self.x_axis[0]).abs();
        let step = self.x_delta().abs();
        (span - 360.0).abs() < GLOBAL_SPAN_EPSILON || (span + step - 360.0).abs() < GLOBAL_SPAN_EPSILON
    }

    /// Copy of a global field with the first column repeated one step past
    /// the last, so sampling across the seam has both neighbours.
    ///
    /// Returns `None` for regional fields and for fields whose seam column
    /// is already present.
    pub fn with_cyclic_column(&self) -> Option<ScalarField> {
        if !self.is_global() {
            return None;
        }
        let span = (self.x_axis[self.nx() - 1] - self.x_axis[0]).abs();
        if (span - 360.0).abs() < GLOBAL_SPAN_EPSILON {
            return None;
        }

        let nx = self.nx();
        let mut x_axis = self.x_axis.clone();
        x_axis.push(self.x_axis[nx - 1] + self.x_delta());

        let mut values = Vec::with_capacity((nx + 1) * self.ny());
        for row in self.values.chunks(nx) {
            values.extend_from_slice(row);
            values.push(row[0]);
        }

        Some(ScalarField {
            x_axis,
            y_axis: self.y_axis.clone(),
            values,
            missing: self.missing,
            x_stagger: self.x_stagger,
            y_stagger: self.y_stagger,
            crs: self.crs,
        })
    }

    /// Sub-field by column and row index ranges.
    pub fn extract(&self, cols: Range<usize>, rows: Range<usize>) -> Result<ScalarField> {
        if cols.end > self.nx() || rows.end > self.ny() {
            return Err(GridError::IndexOutOfBounds {
                col: cols.end.saturating_sub(1),
                row: rows.end.saturating_sub(1),
                cols: self.nx(),
                rows: self.ny(),
            });
        }
        if cols.is_empty() {
            return Err(GridError::InsufficientExtent { axis: "x", len: 0 });
        }
        if rows.is_empty() {
            return Err(GridError::InsufficientExtent { axis: "y", len: 0 });
        }

        let nx = self.nx();
        let mut values = Vec::with_capacity(cols.len() * rows.len());
        for row in rows.clone() {
            let start = row * nx;
            values.extend_from_slice(&self.values[start + cols.start..start + cols.end]);
        }

        let field = ScalarField::new(
            self.x_axis[cols].to_vec(),
            self.y_axis[rows].to_vec(),
            values,
            self.missing,
        )?;
        Ok(field.with_metadata_of(self))
    }

    /// Sub-field of the cells whose coordinates fall inside `bbox`.
    pub fn extract_extent(&self, bbox: &BoundingBox) -> Result<ScalarField> {
        let cols = axis_range_within(&self.x_axis, bbox.min_x, bbox.max_x);
        let rows = axis_range_within(&self.y_axis, bbox.min_y, bbox.max_y);
        self.extract(cols, rows)
    }

    /// Copy with a new sentinel; stored missing cells are rewritten to it.
    pub fn replace_missing(&self, new_missing: f64) -> ScalarField {
        let mut out = self.map_values(|v| if self.is_missing(v) { new_missing } else { v });
        out.missing = new_missing;
        out
    }

    /// Every cell as `(x, y, value)`, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let nx = self.nx();
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, &v)| (self.x_axis[idx % nx], self.y_axis[idx / nx], v))
    }

    /// Every non-missing cell as a labelled point (`"<col>_<row>"`).
    pub fn to_point_set(&self) -> PointSet {
        let nx = self.nx();
        let mut points = PointSet::with_capacity(self.valid_count(), self.missing);
        for (idx, &v) in self.values.iter().enumerate() {
            if self.is_missing(v) {
                continue;
            }
            let (col, row) = (idx % nx, idx / nx);
            points.append(format!("{}_{}", col, row), self.x_axis[col], self.y_axis[row], v);
        }
        match self.crs {
            Some(crs) => points.with_crs(crs),
            None => points,
        }
    }

    /// New field with `f` applied to every stored value.
    pub(crate) fn map_values<F>(&self, f: F) -> ScalarField
    where
        F: Fn(f64) -> f64,
    {
        ScalarField {
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
            missing: self.missing,
            x_stagger: self.x_stagger,
            y_stagger: self.y_stagger,
            crs: self.crs,
        }
    }

    /// New field with `f` applied to every `(x, y, value)` cell.
    pub(crate) fn map_cells<F>(&self, f: F) -> ScalarField
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let mut out = self.clone();
        for (slot, (x, y, v)) in out.values.iter_mut().zip(self.cells()) {
            *slot = f(x, y, v);
        }
        out
    }
}
