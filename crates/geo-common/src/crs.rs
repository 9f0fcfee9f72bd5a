//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BoundingBox;

/// Half the circumference of the Web Mercator sphere, in meters.
pub const WEB_MERCATOR_EXTENT: f64 = 20037508.342789244;

/// Well-known CRS codes understood by the built-in projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// Polar Stereographic North
    Epsg3413,
    /// Polar Stereographic South
    Epsg3031,
}

impl CrsCode {
    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    /// Accepts `"EPSG:4326"`, `"epsg:4326"` and `"CRS:84"` style strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:3413" => Ok(CrsCode::Epsg3413),
            "EPSG:3031" => Ok(CrsCode::Epsg3031),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg3413 => "EPSG:3413",
            CrsCode::Epsg3031 => "EPSG:3031",
        };
        write!(f, "{}", code)
    }
}

/// Lambert Conformal Conic parameters, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertParams {
    /// Central meridian (LoV)
    pub lon0: f64,
    /// Latitude of the projection origin
    pub lat0: f64,
    /// First standard parallel
    pub lat1: f64,
    /// Second standard parallel (equal to `lat1` for a tangent cone)
    pub lat2: f64,
}

impl LambertParams {
    pub fn new(lon0: f64, lat0: f64, lat1: f64, lat2: f64) -> Self {
        Self {
            lon0,
            lat0,
            lat1,
            lat2,
        }
    }

    /// Parameters of the HRRR CONUS grid (tangent cone at 38.5°N, LoV 97.5°W).
    pub fn hrrr() -> Self {
        Self::new(-97.5, 38.5, 38.5, 38.5)
    }
}

/// A coordinate reference system: either a well-known code or a
/// parameterised Lambert Conformal Conic projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    Code(CrsCode),
    Lambert(LambertParams),
}

impl Crs {
    /// WGS84 longitude/latitude.
    pub fn wgs84() -> Self {
        Crs::Code(CrsCode::Epsg4326)
    }

    pub fn web_mercator() -> Self {
        Crs::Code(CrsCode::Epsg3857)
    }

    pub fn lambert(params: LambertParams) -> Self {
        Crs::Lambert(params)
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Code(code) => code.is_geographic(),
            Crs::Lambert(_) => false,
        }
    }

    /// The global extent of this CRS, when it has a meaningful one.
    ///
    /// Lambert Conformal has no finite global extent and returns `None`.
    pub fn valid_bounds(&self) -> Option<BoundingBox> {
        match self {
            Crs::Code(CrsCode::Epsg4326) | Crs::Code(CrsCode::Epsg4269) => {
                Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0))
            }
            Crs::Code(CrsCode::Epsg3857) => {
                // Web Mercator bounds (approx ±85.06° latitude)
                Some(BoundingBox::new(
                    -WEB_MERCATOR_EXTENT,
                    -WEB_MERCATOR_EXTENT,
                    WEB_MERCATOR_EXTENT,
                    WEB_MERCATOR_EXTENT,
                ))
            }
            Crs::Code(CrsCode::Epsg3413) | Crs::Code(CrsCode::Epsg3031) => {
                // Polar stereographic - approximate hemisphere bounds
                Some(BoundingBox::new(-4000000.0, -4000000.0, 4000000.0, 4000000.0))
            }
            Crs::Lambert(_) => None,
        }
    }
}

impl From<CrsCode> for Crs {
    fn from(code: CrsCode) -> Self {
        Crs::Code(code)
    }
}

impl FromStr for Crs {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<CrsCode>().map(Crs::Code)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Code(code) => write!(f, "{}", code),
            Crs::Lambert(p) => write!(
                f,
                "+proj=lcc +lon_0={} +lat_0={} +lat_1={} +lat_2={}",
                p.lon0, p.lat0, p.lat1, p.lat2
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
