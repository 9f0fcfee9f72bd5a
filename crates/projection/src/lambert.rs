//! Lambert Conformal Conic projection.
//!
//! This projection is commonly used for weather data including HRRR.
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! The projection parameters include:
//! - Reference longitude (lon0): The central meridian (LoV in GRIB2)
//! - Reference latitude (lat0): Latitude of the projected origin
//! - Standard parallel(s): Latin1 and Latin2 (can be equal for tangent cone)
//!
//! Projected coordinates are meters east/north of the origin on a sphere.

use std::f64::consts::PI;

use geo_common::LambertParams;

use crate::error::{ensure_finite, ensure_latitude, ProjectionError, ProjectionResult};

/// Earth radius used by NCEP Lambert grids (meters).
pub const LAMBERT_EARTH_RADIUS: f64 = 6371229.0;

const NAME: &str = "Lambert Conformal";

/// Precomputed Lambert Conformal Conic constants.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Origin latitude in radians
    pub lat0: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Build the projection from parameters in degrees.
    pub fn new(params: &LambertParams) -> Self {
        Self::with_radius(params, LAMBERT_EARTH_RADIUS)
    }

    pub fn with_radius(params: &LambertParams, earth_radius: f64) -> Self {
        let lon0 = params.lon0.to_radians();
        let lat0 = params.lat0.to_radians();
        let latin1 = params.lat1.to_radians();
        let latin2 = params.lat2.to_radians();

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            lat0,
            earth_radius,
            n,
            f,
            rho0,
        }
    }

    /// Cone constant. Positive for cones opening toward the south pole.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Project lon/lat (degrees) to x/y meters.
    ///
    /// The pole opposite the cone apex maps to infinity and is rejected.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> ProjectionResult<(f64, f64)> {
        ensure_latitude(NAME, lon_deg, lat_deg)?;

        let opposite_pole = if self.n > 0.0 { -90.0 } else { 90.0 };
        if (lat_deg - opposite_pole).abs() < 1e-9 {
            return Err(ProjectionError::Singular {
                projection: NAME,
                x: lon_deg,
                y: lat_deg,
            });
        }

        let lat = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::Singular {
                projection: NAME,
                x: lon_deg,
                y: lat_deg,
            });
        }
        Ok((x, y))
    }

    /// Unproject x/y meters to lon/lat (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        ensure_finite(x, y)?;

        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let rho = sign * (x * x + dy * dy).sqrt();
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * PI / 2.0
        } else {
            2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0
        };
        let lon = self.lon0 + theta / self.n;

        let (lon_deg, lat_deg) = (normalize_angle(lon).to_degrees(), lat.to_degrees());
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return Err(ProjectionError::OutOfDomain {
                projection: NAME,
                x,
                y,
            });
        }
        Ok((lon_deg, lat_deg))
    }
}

/// Normalize an angle to [-π, π].
fn normalize_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}
