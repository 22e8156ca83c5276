//! Region pipeline: grid, blend, interpolate, report.
//!
//! Every region produces two grids from the same lattice: one from stations
//! only and one from stations blended with nearby low-cost sensors. Each
//! region/variant pair yields its own [`RegionOutcome`], so a failure in one
//! never prevents the others from being attempted.

use aqhi_common::format_timestamp;
use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::{CellSizeTable, GridConfig, InterpolationConfig};
use crate::error::{GridError, Result};
use crate::grid::build_grid;
use crate::interpolation::Interpolator;
use crate::monitors::{blend, select_station_points, sensor_points, subset_to_bbox};
use crate::types::{
    Confidence, GridVariant, InterpolatedCell, MonitorPoint, MonitorReading, RegionGrid,
    SensorRecord,
};

/// A named region and its boundary geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub boundary: MultiPolygon<f64>,
}

impl Region {
    pub fn new(name: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            boundary,
        }
    }
}

/// Monitor points shared by every region of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorInputs {
    pub stations: Vec<MonitorPoint>,
    pub sensors: Vec<MonitorPoint>,
    /// Latest station reading timestamp; stamped onto every output grid.
    pub timestamp: Option<DateTime<Utc>>,
}

impl MonitorInputs {
    /// Build the run's monitor sets from raw readings and a sensor snapshot.
    pub fn from_sources(readings: &[MonitorReading], sensors: &[SensorRecord]) -> Self {
        let selection = select_station_points(readings);
        Self {
            stations: selection.points,
            sensors: sensor_points(sensors),
            timestamp: selection.latest_timestamp,
        }
    }
}

/// Configuration for [`AqhiGridService`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridServiceConfig {
    pub interpolation: InterpolationConfig,
    pub grid: GridConfig,
    pub cellsize: CellSizeTable,
}

impl GridServiceConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        self.interpolation.validate()?;
        self.grid.validate()?;
        self.cellsize.validate()?;
        Ok(())
    }
}

/// Cell counts per confidence tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceCounts {
    pub none: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl ConfidenceCounts {
    pub fn from_cells(cells: &[InterpolatedCell]) -> Self {
        cells.iter().fold(Self::default(), |mut counts, cell| {
            match cell.confidence {
                Confidence::None => counts.none += 1,
                Confidence::Low => counts.low += 1,
                Confidence::Medium => counts.medium += 1,
                Confidence::High => counts.high += 1,
            }
            counts
        })
    }
}

/// One interpolated grid for one region and variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGridOutput {
    pub region: String,
    pub variant: GridVariant,
    pub cellsize: f64,
    /// RFC 3339 timestamp of the newest contributing station reading.
    pub timestamp: Option<String>,
    /// Monitors handed to the interpolator.
    pub monitor_count: usize,
    pub cells: Vec<InterpolatedCell>,
}

impl RegionGridOutput {
    pub fn confidence_counts(&self) -> ConfidenceCounts {
        ConfidenceCounts::from_cells(&self.cells)
    }
}

/// Result of one region/variant attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOutcome {
    pub region: String,
    pub variant: GridVariant,
    pub result: Result<RegionGridOutput>,
}

/// All outcomes of a run, in region order with station-only before blended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<RegionOutcome>,
}

impl RunReport {
    /// Successfully produced grids.
    pub fn succeeded(&self) -> impl Iterator<Item = &RegionGridOutput> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed region/variant pairs and their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&RegionOutcome, &GridError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    /// True when there was work to do and none of it succeeded.
    pub fn is_total_failure(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded().next().is_none()
    }
}

/// Builds station-only and blended AQHI grids for regions.
#[derive(Debug, Clone)]
pub struct AqhiGridService {
    interpolator: Interpolator,
    grid: GridConfig,
    cellsizes: CellSizeTable,
}

impl AqhiGridService {
    /// Create a service after validating its configuration.
    pub fn new(config: GridServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            interpolator: Interpolator::new(config.interpolation)?,
            grid: config.grid,
            cellsizes: config.cellsize,
        })
    }

    /// Cell size selected for a region name.
    pub fn cellsize_for(&self, region_name: &str) -> f64 {
        self.cellsizes.cellsize_for(region_name)
    }

    /// Build the region grid.
    pub fn region_grid(&self, region: &Region) -> Result<RegionGrid> {
        build_grid(
            &region.name,
            &region.boundary,
            self.cellsize_for(&region.name),
            self.grid.max_cells,
        )
    }

    /// Interpolate one variant over an already built grid.
    pub fn interpolate_variant(
        &self,
        region: &Region,
        grid: &RegionGrid,
        variant: GridVariant,
        inputs: &MonitorInputs,
    ) -> RegionGridOutput {
        let monitors = match variant {
            GridVariant::StationOnly => inputs.stations.clone(),
            GridVariant::Blended => {
                let nearby = subset_to_bbox(&inputs.sensors, &grid.bbox, self.grid.sensor_margin_deg);
                blend(&inputs.stations, &nearby)
            }
        };

        RegionGridOutput {
            region: region.name.clone(),
            variant,
            cellsize: grid.cellsize,
            timestamp: inputs.timestamp.map(format_timestamp),
            monitor_count: monitors.len(),
            cells: self.interpolator.interpolate_cells(grid, &monitors),
        }
    }

    /// Produce both variants for one region.
    pub fn process_region(&self, region: &Region, inputs: &MonitorInputs) -> Vec<RegionOutcome> {
        let variants = [GridVariant::StationOnly, GridVariant::Blended];

        let grid = match self.region_grid(region) {
            Ok(grid) => grid,
            Err(e) => {
                error!(region = %region.name, error = %e, "Failed to build region grid");
                return variants
                    .into_iter()
                    .map(|variant| RegionOutcome {
                        region: region.name.clone(),
                        variant,
                        result: Err(e.clone()),
                    })
                    .collect();
            }
        };

        variants
            .into_iter()
            .map(|variant| {
                let output = self.interpolate_variant(region, &grid, variant, inputs);
                let counts = output.confidence_counts();
                info!(
                    region = %region.name,
                    variant = %variant,
                    cells = output.cells.len(),
                    monitors = output.monitor_count,
                    high = counts.high,
                    medium = counts.medium,
                    low = counts.low,
                    none = counts.none,
                    "Interpolated region grid"
                );
                RegionOutcome {
                    region: region.name.clone(),
                    variant,
                    result: Ok(output),
                }
            })
            .collect()
    }

    /// Process every region independently, in parallel.
    pub fn process_all(&self, regions: &[Region], inputs: &MonitorInputs) -> RunReport {
        let outcomes = regions
            .par_iter()
            .map(|region| self.process_region(region, inputs))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        RunReport { outcomes }
    }
}
