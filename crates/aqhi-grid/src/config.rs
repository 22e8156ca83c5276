//! Configuration for the interpolator and grid builder.

use aqhi_common::AqhiError;
use serde::{Deserialize, Serialize};

/// Parameters of the inverse-distance-weighted interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Distance exponent; 2 gives inverse-square weighting.
    pub power: f64,

    /// Hard influence radius in kilometres. `None` disables the cutoff.
    pub max_dist_km: Option<f64>,

    /// Minimum number of contributors for an estimate to be defined.
    pub min_points: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            power: 2.0,
            max_dist_km: Some(100.0),
            min_points: 1,
        }
    }
}

impl InterpolationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of an existing configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("IDW_POWER") {
            if let Ok(power) = val.parse() {
                self.power = power;
            }
        }

        if let Ok(val) = std::env::var("IDW_MAX_DIST_KM") {
            if val.eq_ignore_ascii_case("none") {
                self.max_dist_km = None;
            } else if let Ok(dist) = val.parse() {
                self.max_dist_km = Some(dist);
            }
        }

        if let Ok(val) = std::env::var("IDW_MIN_POINTS") {
            if let Ok(n) = val.parse() {
                self.min_points = n;
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), AqhiError> {
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(AqhiError::invalid_parameter(
                "power",
                format!("must be a positive number, got {}", self.power),
            ));
        }

        if let Some(dist) = self.max_dist_km {
            if !dist.is_finite() || dist <= 0.0 {
                return Err(AqhiError::invalid_parameter(
                    "max_dist_km",
                    format!("must be a positive number, got {}", dist),
                ));
            }
        }

        if self.min_points == 0 {
            return Err(AqhiError::invalid_parameter("min_points", "must be >= 1"));
        }

        Ok(())
    }
}

/// Limits and margins for building region grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Largest candidate lattice (before polygon filtering) a region may request.
    pub max_cells: u64,

    /// Margin in degrees around a region's bounding box for sensor subsetting.
    pub sensor_margin_deg: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_cells: 2_000_000,
            sensor_margin_deg: 0.2,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of an existing configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GRID_MAX_CELLS") {
            if let Ok(n) = val.parse() {
                self.max_cells = n;
            }
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), AqhiError> {
        if self.max_cells == 0 {
            return Err(AqhiError::invalid_parameter("max_cells", "must be > 0"));
        }

        if !self.sensor_margin_deg.is_finite() || self.sensor_margin_deg < 0.0 {
            return Err(AqhiError::invalid_parameter(
                "sensor_margin_deg",
                format!("must be >= 0, got {}", self.sensor_margin_deg),
            ));
        }

        Ok(())
    }
}

/// A region-name rule selecting a cell size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSizeRule {
    /// Case-insensitive substring matched against the region name.
    pub contains: String,

    /// Cell size in degrees for matching regions.
    pub cellsize: f64,
}

/// Per-region cell size selection. First matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellSizeTable {
    /// Cell size for regions no rule matches.
    pub default: f64,

    pub rules: Vec<CellSizeRule>,
}

impl Default for CellSizeTable {
    fn default() -> Self {
        Self {
            default: 0.005,
            rules: Vec::new(),
        }
    }
}

impl CellSizeTable {
    /// Cell size for a region name.
    pub fn cellsize_for(&self, region_name: &str) -> f64 {
        let name = region_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| name.contains(&rule.contains.to_lowercase()))
            .map(|rule| rule.cellsize)
            .unwrap_or(self.default)
    }

    /// Validate the table.
    pub fn validate(&self) -> Result<(), AqhiError> {
        let sizes = std::iter::once(("default", self.default))
            .chain(self.rules.iter().map(|r| (r.contains.as_str(), r.cellsize)));

        for (name, size) in sizes {
            if !size.is_finite() || size <= 0.0 {
                return Err(AqhiError::invalid_parameter(
                    "cellsize",
                    format!("{}: must be a positive number, got {}", name, size),
                ));
            }
        }

        if self.rules.iter().any(|r| r.contains.is_empty()) {
            return Err(AqhiError::invalid_parameter(
                "cellsize",
                "rule substring cannot be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InterpolationConfig::default();
        assert_eq!(config.power, 2.0);
        assert_eq!(config.max_dist_km, Some(100.0));
        assert_eq!(config.min_points, 1);
        assert!(config.validate().is_ok());

        let grid = GridConfig::default();
        assert_eq!(grid.sensor_margin_deg, 0.2);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = InterpolationConfig::default();
        config.power = 0.0;
        assert!(config.validate().is_err());

        config = InterpolationConfig::default();
        config.max_dist_km = Some(-1.0);
        assert!(config.validate().is_err());

        config.max_dist_km = None;
        assert!(config.validate().is_ok());

        config.min_points = 0;
        assert!(config.validate().is_err());

        let mut grid = GridConfig::default();
        grid.max_cells = 0;
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_cellsize_rules_first_match_wins() {
        let table = CellSizeTable {
            default: 0.005,
            rules: vec![
                CellSizeRule {
                    contains: "airshed".to_string(),
                    cellsize: 0.05,
                },
                CellSizeRule {
                    contains: "air".to_string(),
                    cellsize: 0.1,
                },
            ],
        };

        assert_eq!(table.cellsize_for("Calgary Region Airshed Zone"), 0.05);
        assert_eq!(table.cellsize_for("AIRDRIE"), 0.1);
        assert_eq!(table.cellsize_for("Edmonton"), 0.005);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_cellsize_validation() {
        let table = CellSizeTable {
            default: 0.0,
            rules: vec![],
        };
        assert!(table.validate().is_err());

        let table = CellSizeTable {
            default: 0.005,
            rules: vec![CellSizeRule {
                contains: String::new(),
                cellsize: 0.1,
            }],
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: InterpolationConfig = serde_json::from_str(r#"{"power": 3.0}"#).unwrap();
        assert_eq!(config.power, 3.0);
        assert_eq!(config.max_dist_km, Some(100.0));

        let table: CellSizeTable = serde_json::from_str(r#"{"rules": []}"#).unwrap();
        assert_eq!(table.default, 0.005);
    }
}
