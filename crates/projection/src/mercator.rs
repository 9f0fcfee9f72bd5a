//! Spherical Web Mercator (EPSG:3857).

use std::f64::consts::PI;

use crate::error::{ensure_finite, ensure_latitude, ProjectionError, ProjectionResult};

/// WGS84 semi-major axis, used as the sphere radius by Web Mercator.
pub const MERCATOR_EARTH_RADIUS: f64 = 6378137.0;

const NAME: &str = "Web Mercator";

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Project lon/lat (degrees) to x/y meters.
    ///
    /// Longitudes are wrapped to [-180, 180] first. The poles project to
    /// infinity and are rejected.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> ProjectionResult<(f64, f64)> {
        ensure_latitude(NAME, lon_deg, lat_deg)?;
        if lat_deg.abs() >= 90.0 {
            return Err(ProjectionError::Singular {
                projection: NAME,
                x: lon_deg,
                y: lat_deg,
            });
        }

        let lon = wrap_longitude(lon_deg);
        let x = MERCATOR_EARTH_RADIUS * lon.to_radians();
        let y = MERCATOR_EARTH_RADIUS * (PI / 4.0 + lat_deg.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    /// Unproject x/y meters to lon/lat (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        ensure_finite(x, y)?;
        let lon = (x / MERCATOR_EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / MERCATOR_EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Ok((lon, lat))
    }
}

/// Wrap a longitude in degrees into [-180, 180].
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign of the input at the seam
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
