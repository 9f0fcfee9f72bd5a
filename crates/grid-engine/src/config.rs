//! Configuration for the grid engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::types::{InterpolationMethod, ScatterKind, ScatterMethod};

/// Sentinel used when nothing else is configured.
pub const DEFAULT_MISSING_VALUE: f64 = -9999.0;

/// Defaults and method parameters for engine operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sentinel written into cells and points without data.
    pub missing_value: f64,

    /// Interpolation method for grid sampling and resampling.
    pub interpolation: InterpolationMethod,

    /// Minimum observations within the radius for an IDW cell to be filled.
    pub idw_min_points: usize,

    /// Search radius for radius-bounded IDW, in grid coordinate units.
    pub idw_radius: f64,

    /// Neighbour count for nearest-neighbour IDW.
    pub idw_neighbors: usize,

    /// Cressman pass radii, applied in order.
    pub cressman_radii: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            missing_value: DEFAULT_MISSING_VALUE,
            interpolation: InterpolationMethod::Bilinear,
            idw_min_points: 1,
            idw_radius: 1.0,
            idw_neighbors: 8,
            cressman_radii: vec![10.0, 7.0, 4.0, 2.0, 1.0],
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("GRID_MISSING_VALUE") {
            if let Ok(missing) = val.trim().parse() {
                config.missing_value = missing;
            }
        }

        if let Some(val) = lookup("GRID_INTERPOLATION") {
            config.interpolation = InterpolationMethod::from_str(&val);
        }

        if let Some(val) = lookup("GRID_IDW_MIN_POINTS") {
            if let Ok(n) = val.trim().parse() {
                config.idw_min_points = n;
            }
        }

        if let Some(val) = lookup("GRID_IDW_RADIUS") {
            if let Ok(radius) = val.trim().parse() {
                config.idw_radius = radius;
            }
        }

        if let Some(val) = lookup("GRID_IDW_NEIGHBORS") {
            if let Ok(k) = val.trim().parse() {
                config.idw_neighbors = k;
            }
        }

        if let Some(val) = lookup("GRID_CRESSMAN_RADII") {
            let radii: std::result::Result<Vec<f64>, _> =
                val.split(',').map(|r| r.trim().parse::<f64>()).collect();
            if let Ok(radii) = radii {
                config.cressman_radii = radii;
            }
        }

        config
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate().map_err(GridError::Config)?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GridError::config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.idw_radius.is_finite() && self.idw_radius > 0.0) {
            return Err("idw_radius must be > 0".to_string());
        }

        if self.idw_neighbors == 0 {
            return Err("idw_neighbors must be > 0".to_string());
        }

        if self.cressman_radii.is_empty() {
            return Err("cressman_radii must not be empty".to_string());
        }

        if self
            .cressman_radii
            .iter()
            .any(|r| !(r.is_finite() && *r > 0.0))
        {
            return Err("cressman_radii must all be > 0".to_string());
        }

        Ok(())
    }

    /// Scatter method of the given kind with parameters from this config.
    pub fn scatter_method(&self, kind: ScatterKind) -> ScatterMethod {
        match kind {
            ScatterKind::IdwRadius => ScatterMethod::IdwRadius {
                min_points: self.idw_min_points,
                radius: self.idw_radius,
            },
            ScatterKind::IdwNeighbors => ScatterMethod::IdwNeighbors {
                k: self.idw_neighbors,
            },
            ScatterKind::Cressman => ScatterMethod::Cressman {
                radii: self.cressman_radii.clone(),
            },
            ScatterKind::NearestAssign => ScatterMethod::NearestAssign,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.missing_value, -9999.0);
        assert_eq!(config.interpolation, InterpolationMethod::Bilinear);
        assert_eq!(config.cressman_radii, vec![10.0, 7.0, 4.0, 2.0, 1.0]);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("GRID_MISSING_VALUE", "-999"),
            ("GRID_INTERPOLATION", "Nearest"),
            ("GRID_IDW_NEIGHBORS", "4"),
            ("GRID_CRESSMAN_RADII", "5, 2.5,1"),
        ]));
        assert_eq!(config.missing_value, -999.0);
        assert_eq!(config.interpolation, InterpolationMethod::Nearest);
        assert_eq!(config.idw_neighbors, 4);
        assert_eq!(config.cressman_radii, vec![5.0, 2.5, 1.0]);
        assert_eq!(config.idw_radius, 1.0);
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("GRID_IDW_RADIUS", "far"),
            ("GRID_CRESSMAN_RADII", "5,x"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EngineConfig {
            idw_neighbors: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            cressman_radii: vec![3.0, 0.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            idw_radius: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_document() {
        let config = EngineConfig::from_yaml_str("idw_radius: 2.5\ninterpolation: nearest\n").unwrap();
        assert_eq!(config.idw_radius, 2.5);
        assert_eq!(config.interpolation, InterpolationMethod::Nearest);
        assert_eq!(config.idw_neighbors, 8);
    }

    #[test]
    fn test_yaml_invalid_config_rejected() {
        assert!(matches!(
            EngineConfig::from_yaml_str("idw_neighbors: 0\n"),
            Err(GridError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_yaml_str("idw_radius: [1, 2]\n"),
            Err(GridError::Config(_))
        ));
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cressman_radii: [4.0, 2.0]").unwrap();
        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.cressman_radii, vec![4.0, 2.0]);

        assert!(EngineConfig::from_yaml_file("/nonexistent/engine.yaml").is_err());
    }

    #[test]
    fn test_scatter_method_from_config() {
        let config = EngineConfig::default();
        assert_eq!(
            config.scatter_method(ScatterKind::IdwRadius),
            ScatterMethod::IdwRadius {
                min_points: 1,
                radius: 1.0
            }
        );
        assert_eq!(
            config.scatter_method(ScatterKind::IdwNeighbors),
            ScatterMethod::IdwNeighbors { k: 8 }
        );
        assert_eq!(
            config.scatter_method(ScatterKind::NearestAssign),
            ScatterMethod::NearestAssign
        );
    }
}
