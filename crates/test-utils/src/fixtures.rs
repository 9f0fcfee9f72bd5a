//! Common test fixtures for grid and station tests.
//!
//! This module provides pre-defined data for scenarios that show up across
//! the engine's test suites.

/// Conventional missing-value sentinel used throughout the fixtures.
pub const MISSING: f64 = -9999.0;

/// Common bounding box definitions as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// Unit square
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);
}

/// The 3x3 reference grid on axes `[0, 1, 2]`.
pub mod reference {
    pub const X_AXIS: [f64; 3] = [0.0, 1.0, 2.0];
    pub const Y_AXIS: [f64; 3] = [0.0, 1.0, 2.0];

    /// Row-major values: row 0 is `y = 0`.
    pub const VALUES: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
}

/// Axes of common global grids.
pub mod global {
    use crate::generators::axis;

    /// 1° global longitudes 0..359 (no repeated seam column).
    pub fn lon_1deg() -> Vec<f64> {
        axis(0.0, 1.0, 360)
    }

    /// 1° latitudes -90..90.
    pub fn lat_1deg() -> Vec<f64> {
        axis(-90.0, 1.0, 181)
    }

    /// 10° global longitudes -180..180, seam column repeated.
    pub fn lon_10deg_closed() -> Vec<f64> {
        axis(-180.0, 10.0, 37)
    }

    /// 10° latitudes -80..80, stopping short of the poles.
    pub fn lat_10deg() -> Vec<f64> {
        axis(-80.0, 10.0, 17)
    }
}

/// A handful of named stations with their coordinates, as
/// `(label, lon, lat, value)`.
pub mod stations {
    pub const CITIES: [(&str, f64, f64, f64); 5] = [
        ("DEN", -104.99, 39.74, 281.5),
        ("ORD", -87.90, 41.98, 276.0),
        ("DFW", -97.04, 32.90, 290.2),
        ("SEA", -122.31, 47.45, 279.8),
        ("ATL", -84.43, 33.64, 288.1),
    ];
}
