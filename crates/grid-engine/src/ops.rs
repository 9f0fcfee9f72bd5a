//! Cell-wise arithmetic and statistics on fields.
//!
//! Binary operations read each operand's own sentinel. The result carries
//! the left operand's sentinel, and a cell is missing whenever either
//! input is missing or the operation has no finite result (division by
//! zero).

use crate::error::{GridError, Result};
use crate::field::ScalarField;
use crate::types::ValueStats;

/// Cell-wise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Apply to two present values, `None` when undefined.
    fn apply(self, a: f64, b: f64) -> Option<f64> {
        let v = match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return None;
                }
                a / b
            }
        };
        v.is_finite().then_some(v)
    }
}

impl ScalarField {
    /// Combine two fields of identical shape cell by cell.
    pub fn combine(&self, other: &ScalarField, op: BinaryOp) -> Result<ScalarField> {
        if self.dims() != other.dims() {
            let (ny, nx) = self.dims();
            let (oy, ox) = other.dims();
            return Err(GridError::dimension_mismatch(
                format!("{}x{}", ny, nx),
                format!("{}x{}", oy, ox),
            ));
        }

        let missing = self.missing_value();
        let values: Vec<f64> = self
            .values()
            .iter()
            .zip(other.values())
            .map(|(&a, &b)| {
                if self.is_missing(a) || other.is_missing(b) {
                    return missing;
                }
                op.apply(a, b).unwrap_or(missing)
            })
            .collect();

        let field = ScalarField::new(self.x_axis().to_vec(), self.y_axis().to_vec(), values, missing)?;
        Ok(field.with_metadata_of(self))
    }

    /// Combine every cell with a scalar.
    pub fn combine_scalar(&self, scalar: f64, op: BinaryOp) -> ScalarField {
        let missing = self.missing_value();
        self.map_values(|v| {
            if self.is_missing(v) {
                missing
            } else {
                op.apply(v, scalar).unwrap_or(missing)
            }
        })
    }

    pub fn add(&self, other: &ScalarField) -> Result<ScalarField> {
        self.combine(other, BinaryOp::Add)
    }

    pub fn sub(&self, other: &ScalarField) -> Result<ScalarField> {
        self.combine(other, BinaryOp::Sub)
    }

    pub fn mul(&self, other: &ScalarField) -> Result<ScalarField> {
        self.combine(other, BinaryOp::Mul)
    }

    pub fn div(&self, other: &ScalarField) -> Result<ScalarField> {
        self.combine(other, BinaryOp::Div)
    }

    pub fn add_scalar(&self, value: f64) -> ScalarField {
        self.combine_scalar(value, BinaryOp::Add)
    }

    pub fn sub_scalar(&self, value: f64) -> ScalarField {
        self.combine_scalar(value, BinaryOp::Sub)
    }

    pub fn mul_scalar(&self, value: f64) -> ScalarField {
        self.combine_scalar(value, BinaryOp::Mul)
    }

    pub fn div_scalar(&self, value: f64) -> ScalarField {
        self.combine_scalar(value, BinaryOp::Div)
    }

    /// Statistics over non-missing cells, `None` if every cell is missing.
    pub fn stats(&self) -> Option<ValueStats> {
        ValueStats::collect(self.values().iter().copied(), |v| self.is_missing(v))
    }

    pub fn min(&self) -> Option<f64> {
        self.stats().map(|s| s.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.stats().map(|s| s.max)
    }

    pub fn sum(&self) -> Option<f64> {
        self.stats().map(|s| s.sum)
    }

    pub fn mean(&self) -> Option<f64> {
        self.stats().map(|s| s.mean)
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        self.values().iter().filter(|&&v| !self.is_missing(v)).count()
    }
}
