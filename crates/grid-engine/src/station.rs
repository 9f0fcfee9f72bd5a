//! Sparse labelled observations.

use geo_common::{BoundingBox, Crs};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MISSING_VALUE;
use crate::error::{GridError, Result};
use crate::types::ValueStats;

/// A borrowed view of one observation in a [`PointSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station<'a> {
    pub label: &'a str,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// A collection of labelled `(x, y, value)` observations.
///
/// The three columns always have the same length. The extent covers every
/// finite coordinate and is kept current on each mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointSetRecord")]
pub struct PointSet {
    labels: Vec<String>,
    coords: Vec<(f64, f64)>,
    values: Vec<f64>,
    missing: f64,
    #[serde(skip)]
    extent: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crs: Option<Crs>,
}

#[derive(Deserialize)]
struct PointSetRecord {
    labels: Vec<String>,
    coords: Vec<(f64, f64)>,
    values: Vec<f64>,
    #[serde(default = "default_missing")]
    missing: f64,
    #[serde(default)]
    crs: Option<Crs>,
}

fn default_missing() -> f64 {
    DEFAULT_MISSING_VALUE
}

impl TryFrom<PointSetRecord> for PointSet {
    type Error = GridError;

    fn try_from(record: PointSetRecord) -> Result<Self> {
        let mut points = Self::from_parts(record.labels, record.coords, record.values, record.missing)?;
        points.crs = record.crs;
        Ok(points)
    }
}

fn compute_extent(coords: &[(f64, f64)]) -> Option<BoundingBox> {
    BoundingBox::from_points(
        coords
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite()),
    )
}

impl PointSet {
    /// Empty set using `missing` as its sentinel.
    pub fn new(missing: f64) -> Self {
        Self::with_capacity(0, missing)
    }

    pub fn with_capacity(capacity: usize, missing: f64) -> Self {
        Self {
            labels: Vec::with_capacity(capacity),
            coords: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            missing,
            extent: None,
            crs: None,
        }
    }

    /// Bulk construction from parallel columns.
    pub fn from_parts(
        labels: Vec<String>,
        coords: Vec<(f64, f64)>,
        values: Vec<f64>,
        missing: f64,
    ) -> Result<Self> {
        if labels.len() != coords.len() || coords.len() != values.len() {
            return Err(GridError::LengthMismatch {
                labels: labels.len(),
                coords: coords.len(),
                values: values.len(),
            });
        }
        let extent = compute_extent(&coords);
        Ok(Self {
            labels,
            coords,
            values,
            missing,
            extent,
            crs: None,
        })
    }

    /// Build from `(label, x, y, value)` records.
    pub fn from_records<I, S>(records: I, missing: f64) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64, f64)>,
        S: Into<String>,
    {
        let mut points = Self::new(missing);
        for (label, x, y, value) in records {
            points.append(label, x, y, value);
        }
        points
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    /// Add one observation, growing the extent to cover it.
    pub fn append(&mut self, label: impl Into<String>, x: f64, y: f64, value: f64) {
        self.labels.push(label.into());
        self.coords.push((x, y));
        self.values.push(value);
        if x.is_finite() && y.is_finite() {
            match self.extent.as_mut() {
                Some(extent) => extent.include_point(x, y),
                None => self.extent = Some(BoundingBox::from_point(x, y)),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn coords(&self) -> &[(f64, f64)] {
        &self.coords
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn missing_value(&self) -> f64 {
        self.missing
    }

    /// Bounding box of all finite coordinates, `None` when there are none.
    pub fn extent(&self) -> Option<BoundingBox> {
        self.extent
    }

    pub fn is_missing(&self, value: f64) -> bool {
        value == self.missing || value.is_nan()
    }

    pub fn get(&self, idx: usize) -> Option<Station<'_>> {
        let (x, y) = *self.coords.get(idx)?;
        Some(Station {
            label: &self.labels[idx],
            x,
            y,
            value: self.values[idx],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Station<'_>> + '_ {
        self.labels
            .iter()
            .zip(&self.coords)
            .zip(&self.values)
            .map(|((label, &(x, y)), &value)| Station {
                label: label.as_str(),
                x,
                y,
                value,
            })
    }

    /// Replace every coordinate, keeping labels and values.
    pub fn set_coords(&mut self, coords: Vec<(f64, f64)>) -> Result<()> {
        if coords.len() != self.len() {
            return Err(GridError::LengthMismatch {
                labels: self.labels.len(),
                coords: coords.len(),
                values: self.values.len(),
            });
        }
        self.extent = compute_extent(&coords);
        self.coords = coords;
        Ok(())
    }

    /// Keep only the stations for which `keep` holds.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Station<'_>) -> bool,
    {
        let flags: Vec<bool> = self.iter().map(|s| keep(&s)).collect();
        let mut idx = 0;
        self.labels.retain(|_| {
            idx += 1;
            flags[idx - 1]
        });
        idx = 0;
        self.coords.retain(|_| {
            idx += 1;
            flags[idx - 1]
        });
        idx = 0;
        self.values.retain(|_| {
            idx += 1;
            flags[idx - 1]
        });
        self.extent = compute_extent(&self.coords);
    }

    /// New set holding the stations for which `keep` holds.
    pub fn filtered<F>(&self, keep: F) -> PointSet
    where
        F: FnMut(&Station<'_>) -> bool,
    {
        let mut out = self.clone();
        out.retain(keep);
        out
    }

    /// Copy without missing-valued stations.
    pub fn valid(&self) -> PointSet {
        self.filtered(|s| !self.is_missing(s.value))
    }

    /// Copy holding the stations inside `bbox` (edges inclusive).
    pub fn filter_extent(&self, bbox: &BoundingBox) -> PointSet {
        self.filtered(|s| bbox.contains(s.x, s.y))
    }

    /// Same stations with new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<PointSet> {
        if values.len() != self.len() {
            return Err(GridError::LengthMismatch {
                labels: self.labels.len(),
                coords: self.coords.len(),
                values: values.len(),
            });
        }
        let mut out = self.clone();
        out.values = values;
        Ok(out)
    }

    /// New set with `f` applied to every `(x, y, value)`.
    pub(crate) fn map_values<F>(&self, f: F) -> PointSet
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let mut out = self.clone();
        for (slot, &(x, y)) in out.values.iter_mut().zip(&self.coords) {
            *slot = f(x, y, *slot);
        }
        out
    }

    pub fn stats(&self) -> Option<ValueStats> {
        ValueStats::collect(self.values.iter().copied(), |v| self.is_missing(v))
    }

    pub fn min(&self) -> Option<f64> {
        self.stats().map(|s| s.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.stats().map(|s| s.max)
    }

    pub fn mean(&self) -> Option<f64> {
        self.stats().map(|s| s.mean)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|&&v| !self.is_missing(v)).count()
    }
}
