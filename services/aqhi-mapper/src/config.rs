//! Configuration loader for the AQHI mapper.
//!
//! A single YAML file names the monitor sources, the regions to map and the
//! interpolation settings. `${VAR}` and `${VAR:-default}` are substituted
//! from the environment before parsing, and the `IDW_*` / `GRID_*`
//! environment overrides are applied after.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use aqhi_grid::{CellSizeTable, GridConfig, GridServiceConfig, InterpolationConfig};
use anyhow::{Context, Result};
use ingestion::FetchConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    pub sources: SourcesConfig,
    pub regions: Vec<RegionSource>,
    #[serde(default)]
    pub cellsize: CellSizeTable,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default)]
    pub grid: GridConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Station reading CSV, URL or path.
    pub stations: String,
    /// Sensor snapshot JSON, URL or path.
    pub sensors: String,
    #[serde(flatten)]
    pub http: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSource {
    pub name: String,
    /// GeoJSON boundary, URL or path.
    pub boundary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl MapperConfig {
    /// Settings for the grid service.
    pub fn service_config(&self) -> GridServiceConfig {
        GridServiceConfig {
            interpolation: self.interpolation.clone(),
            grid: self.grid.clone(),
            cellsize: self.cellsize.clone(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load, expand, override and validate a mapper configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MapperConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read mapper config from {:?}", path.as_ref()))?;

    let mut config = parse_config(&content)?;
    config.interpolation = config.interpolation.with_env_overrides();
    config.grid = config.grid.with_env_overrides();

    validate_config(&config)?;
    Ok(config)
}

/// Parse configuration text after environment substitution.
pub fn parse_config(content: &str) -> Result<MapperConfig> {
    let expanded = expand_env_vars(content)?;
    serde_yaml::from_str(&expanded).context("Failed to parse mapper config YAML")
}

/// Expand environment variables in the format ${VAR} or ${VAR:-default}
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        result.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    match expr.split_once(":-") {
        Some((name, default)) => Ok(std::env::var(name.trim())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())),
        None => std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr)),
    }
}

// ============================================================================
// Validation
// ============================================================================

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn validate_config(config: &MapperConfig) -> Result<()> {
    anyhow::ensure!(
        !config.sources.stations.trim().is_empty(),
        "sources.stations cannot be empty"
    );
    anyhow::ensure!(
        !config.sources.sensors.trim().is_empty(),
        "sources.sensors cannot be empty"
    );
    anyhow::ensure!(
        config.sources.http.timeout_secs > 0,
        "sources.timeout_secs must be greater than 0"
    );

    anyhow::ensure!(!config.regions.is_empty(), "At least one region is required");
    let mut seen = HashSet::new();
    for region in &config.regions {
        anyhow::ensure!(!region.name.trim().is_empty(), "Region name cannot be empty");
        anyhow::ensure!(
            !region.boundary.trim().is_empty(),
            "Region {} has no boundary",
            region.name
        );
        anyhow::ensure!(
            seen.insert(region.name.to_lowercase()),
            "Duplicate region name: {}",
            region.name
        );
    }

    anyhow::ensure!(
        !config.output.dir.as_os_str().is_empty(),
        "output.dir cannot be empty"
    );

    anyhow::ensure!(
        LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        LOG_LEVELS
    );

    config
        .service_config()
        .validate()
        .context("Invalid interpolation settings")?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
