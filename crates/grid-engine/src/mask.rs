//! Region masking.
//!
//! Containment tests themselves (polygon geometry, shapefiles) live
//! outside the engine; anything answering "is `(x, y)` inside?" can be used
//! as a mask.

use geo_common::BoundingBox;

use crate::field::ScalarField;
use crate::station::PointSet;

/// A region that can answer point-containment queries.
pub trait Containment {
    fn contains(&self, x: f64, y: f64) -> bool;
}

impl<F> Containment for F
where
    F: Fn(f64, f64) -> bool,
{
    fn contains(&self, x: f64, y: f64) -> bool {
        self(x, y)
    }
}

impl Containment for BoundingBox {
    fn contains(&self, x: f64, y: f64) -> bool {
        BoundingBox::contains(self, x, y)
    }
}

/// A point is inside a collection when any member contains it.
impl<C: Containment> Containment for [C] {
    fn contains(&self, x: f64, y: f64) -> bool {
        self.iter().any(|region| region.contains(x, y))
    }
}

impl<C: Containment> Containment for Vec<C> {
    fn contains(&self, x: f64, y: f64) -> bool {
        Containment::contains(self.as_slice(), x, y)
    }
}

impl ScalarField {
    /// Keep cells inside `region`; cells outside become missing.
    pub fn mask_out<M>(&self, region: &M) -> ScalarField
    where
        M: Containment + ?Sized,
    {
        let missing = self.missing_value();
        self.map_cells(|x, y, v| if region.contains(x, y) { v } else { missing })
    }

    /// Blank cells inside `region`; cells outside are kept.
    pub fn mask_in<M>(&self, region: &M) -> ScalarField
    where
        M: Containment + ?Sized,
    {
        let missing = self.missing_value();
        self.map_cells(|x, y, v| if region.contains(x, y) { missing } else { v })
    }
}

impl PointSet {
    /// Keep stations inside `region`.
    pub fn mask_out<M>(&self, region: &M) -> PointSet
    where
        M: Containment + ?Sized,
    {
        self.filtered(|s| region.contains(s.x, s.y))
    }

    /// Drop stations inside `region`.
    pub fn mask_in<M>(&self, region: &M) -> PointSet
    where
        M: Containment + ?Sized,
    {
        self.filtered(|s| !region.contains(s.x, s.y))
    }

    /// Same stations, with values outside `region` set to missing.
    pub fn blank_outside<M>(&self, region: &M) -> PointSet
    where
        M: Containment + ?Sized,
    {
        let missing = self.missing_value();
        self.map_values(|x, y, v| if region.contains(x, y) { v } else { missing })
    }
}
