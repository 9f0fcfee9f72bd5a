//! Spherical polar stereographic projection (EPSG:3413 / EPSG:3031 style).

use std::f64::consts::PI;

use crate::error::{ensure_finite, ensure_latitude, ProjectionError, ProjectionResult};
use crate::mercator::{wrap_longitude, MERCATOR_EARTH_RADIUS};

const NAME: &str = "Polar Stereographic";

/// Polar stereographic projection centred on one pole.
#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    /// True for the north polar aspect.
    pub north: bool,
    /// Latitude of true scale in degrees (sign matches the hemisphere).
    pub true_scale_lat: f64,
    /// Longitude pointing straight down from the pole, in degrees.
    pub lon0: f64,
    pub earth_radius: f64,
}

impl PolarStereographic {
    /// NSIDC sea ice polar stereographic north (EPSG:3413).
    pub fn north_3413() -> Self {
        Self {
            north: true,
            true_scale_lat: 70.0,
            lon0: -45.0,
            earth_radius: MERCATOR_EARTH_RADIUS,
        }
    }

    /// Antarctic polar stereographic (EPSG:3031).
    pub fn south_3031() -> Self {
        Self {
            north: false,
            true_scale_lat: -71.0,
            lon0: 0.0,
            earth_radius: MERCATOR_EARTH_RADIUS,
        }
    }

    /// Hemisphere sign: +1 north, -1 south. The south aspect is computed as
    /// the north one with latitude, longitude and output axes mirrored.
    fn hemisphere(&self) -> f64 {
        if self.north {
            1.0
        } else {
            -1.0
        }
    }

    /// `R * cos(φc) / tan(π/4 - φc/2)` in the north-aspect frame.
    fn scale(&self) -> f64 {
        let phi_c = (self.hemisphere() * self.true_scale_lat).to_radians();
        self.earth_radius * phi_c.cos() / (PI / 4.0 - phi_c / 2.0).tan()
    }

    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> ProjectionResult<(f64, f64)> {
        ensure_latitude(NAME, lon_deg, lat_deg)?;
        let h = self.hemisphere();

        // The pole opposite the projection centre maps to infinity
        if (lat_deg + h * 90.0).abs() < 1e-9 {
            return Err(ProjectionError::Singular {
                projection: NAME,
                x: lon_deg,
                y: lat_deg,
            });
        }

        let phi = (h * lat_deg).to_radians();
        let dlon = (h * wrap_longitude(lon_deg - self.lon0)).to_radians();
        let rho = self.scale() * (PI / 4.0 - phi / 2.0).tan();

        let x = rho * dlon.sin();
        let y = -rho * dlon.cos();
        Ok((h * x, h * y))
    }

    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        ensure_finite(x, y)?;
        let h = self.hemisphere();
        let (x, y) = (h * x, h * y);

        let rho = (x * x + y * y).sqrt();
        let phi = PI / 2.0 - 2.0 * (rho / self.scale()).atan();
        let dlon = if rho == 0.0 { 0.0 } else { x.atan2(-y) };

        let lat = h * phi.to_degrees();
        let lon = wrap_longitude(self.lon0 + h * dlon.to_degrees());
        Ok((lon, lat))
    }
}
