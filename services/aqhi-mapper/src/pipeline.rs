//! One mapping run: fetch sources, build monitor sets, grid every region,
//! write the results.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use aqhi_grid::{AqhiGridService, MonitorInputs, Region, RunReport};
use ingestion::{
    load_region, parse_sensor_snapshot, parse_station_csv, write_region_grid, SourceFetcher,
};
use tracing::{error, info, instrument, warn};

use crate::config::{MapperConfig, RegionSource};

/// Per-run options from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    /// Region names to process; empty means all configured regions.
    pub regions: Vec<String>,
    /// Compute grids without writing them.
    pub dry_run: bool,
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub report: RunReport,
    /// Regions whose boundary could not be loaded.
    pub boundary_failures: Vec<String>,
    pub written: Vec<PathBuf>,
    pub write_failures: usize,
}

impl RunSummary {
    /// True when no region/variant produced a usable grid.
    pub fn is_total_failure(&self) -> bool {
        self.report.succeeded().next().is_none()
            || (self.written.is_empty() && self.write_failures > 0)
    }
}

/// Configured regions matching the name filter, in configuration order.
pub fn selected_regions<'a>(config: &'a MapperConfig, filter: &[String]) -> Vec<&'a RegionSource> {
    for name in filter {
        if !config.regions.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
            warn!(region = %name, "Requested region is not configured");
        }
    }

    config
        .regions
        .iter()
        .filter(|r| filter.is_empty() || filter.iter().any(|f| f.eq_ignore_ascii_case(&r.name)))
        .collect()
}

/// Fetch and parse boundaries. A region whose boundary fails to load is
/// logged and reported, the rest continue.
async fn load_regions(
    fetcher: &SourceFetcher,
    sources: &[&RegionSource],
) -> (Vec<Region>, Vec<String>) {
    let mut regions = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();

    for source in sources {
        let loaded = match fetcher.fetch(&source.boundary).await {
            Ok(bytes) => load_region(source.name.clone(), &bytes),
            Err(e) => Err(e),
        };
        match loaded {
            Ok(region) => regions.push(region),
            Err(e) => {
                error!(region = %source.name, error = %e, "Failed to load region boundary");
                failures.push(source.name.clone());
            }
        }
    }

    (regions, failures)
}

/// Execute one mapping run.
#[instrument(skip_all, fields(dry_run = options.dry_run))]
pub async fn run(config: &MapperConfig, options: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();
    let service = AqhiGridService::new(config.service_config())
        .context("Failed to create grid service")?;
    let fetcher = SourceFetcher::new(&config.sources.http)?;

    let (station_bytes, sensor_bytes) = tokio::try_join!(
        fetcher.fetch(&config.sources.stations),
        fetcher.fetch(&config.sources.sensors),
    )?;

    let readings = parse_station_csv(station_bytes.as_slice()).context("Failed to parse station data")?;
    let sensors = parse_sensor_snapshot(&sensor_bytes).context("Failed to parse sensor data")?;
    let inputs = MonitorInputs::from_sources(&readings, &sensors);

    info!(
        readings = readings.len(),
        stations = inputs.stations.len(),
        sensors = inputs.sensors.len(),
        timestamp = ?inputs.timestamp,
        "Built monitor inputs"
    );
    if inputs.stations.is_empty() {
        warn!("No station readings for the current hour; station-only grids will be empty");
    }

    let sources = selected_regions(config, &options.regions);
    let (regions, boundary_failures) = load_regions(&fetcher, &sources).await;

    let report = tokio::task::spawn_blocking(move || service.process_all(&regions, &inputs))
        .await
        .context("Grid computation panicked")?;

    let mut summary = RunSummary {
        report,
        boundary_failures,
        ..RunSummary::default()
    };

    if options.dry_run {
        info!("Dry run, skipping output");
    } else {
        for output in summary.report.succeeded() {
            match write_region_grid(&options.output_dir, output) {
                Ok(path) => summary.written.push(path),
                Err(e) => {
                    error!(
                        region = %output.region,
                        variant = %output.variant,
                        error = %e,
                        "Failed to write region grid"
                    );
                    summary.write_failures += 1;
                }
            }
        }
    }

    info!(
        succeeded = summary.report.succeeded().count(),
        failed = summary.report.failed().count(),
        boundary_failures = summary.boundary_failures.len(),
        written = summary.written.len(),
        write_failures = summary.write_failures,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Mapping run completed"
    );

    Ok(summary)
}
