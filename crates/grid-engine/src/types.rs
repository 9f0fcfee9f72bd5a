//! Method selectors and summary types shared across the engine.

use serde::{Deserialize, Serialize};

/// Interpolation method used when evaluating a field at arbitrary coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, tolerates missing corners).
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive). Unknown names fall back to bilinear.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "neighbor" | "neighbour" => Self::Nearest,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Scatter-to-grid algorithm together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ScatterMethod {
    /// Inverse distance weighting over every point within `radius`.
    IdwRadius { min_points: usize, radius: f64 },
    /// Inverse distance weighting over the `k` nearest points.
    IdwNeighbors { k: usize },
    /// Multi-pass Cressman analysis, one pass per radius in order.
    Cressman { radii: Vec<f64> },
    /// Each point written to its containing cell, last write wins.
    NearestAssign,
}

impl ScatterMethod {
    /// Which algorithm this is, without parameters.
    pub fn kind(&self) -> ScatterKind {
        match self {
            Self::IdwRadius { .. } => ScatterKind::IdwRadius,
            Self::IdwNeighbors { .. } => ScatterKind::IdwNeighbors,
            Self::Cressman { .. } => ScatterKind::Cressman,
            Self::NearestAssign => ScatterKind::NearestAssign,
        }
    }
}

impl std::fmt::Display for ScatterMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdwRadius { min_points, radius } => {
                write!(f, "idw-radius(radius={}, min_points={})", radius, min_points)
            }
            Self::IdwNeighbors { k } => write!(f, "idw-neighbors(k={})", k),
            Self::Cressman { radii } => write!(f, "cressman(radii={:?})", radii),
            Self::NearestAssign => write!(f, "nearest"),
        }
    }
}

/// Scatter algorithm name, used to pick parameters from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterKind {
    IdwRadius,
    IdwNeighbors,
    Cressman,
    NearestAssign,
}

impl std::str::FromStr for ScatterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "idw-radius" | "idw" => Ok(Self::IdwRadius),
            "idw-neighbors" | "idw-neighbours" => Ok(Self::IdwNeighbors),
            "cressman" => Ok(Self::Cressman),
            "nearest" | "nearest-assign" | "assign" => Ok(Self::NearestAssign),
            other => Err(format!("unknown scatter method: {}", other)),
        }
    }
}

impl std::fmt::Display for ScatterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::IdwRadius => "idw-radius",
            Self::IdwNeighbors => "idw-neighbors",
            Self::Cressman => "cressman",
            Self::NearestAssign => "nearest",
        };
        f.write_str(name)
    }
}

/// Summary statistics over the non-missing values of a field or point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub valid_count: usize,
    pub missing_count: usize,
}

impl ValueStats {
    /// Accumulate statistics, skipping values for which `is_missing` holds.
    ///
    /// Returns `None` when no value is valid.
    pub(crate) fn collect<I, F>(values: I, is_missing: F) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
        F: Fn(f64) -> bool,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut valid_count = 0;
        let mut missing_count = 0;

        for v in values {
            if is_missing(v) {
                missing_count += 1;
                continue;
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
            valid_count += 1;
        }

        if valid_count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            sum,
            mean: sum / valid_count as f64,
            valid_count,
            missing_count,
        })
    }
}
