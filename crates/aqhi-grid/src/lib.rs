//! AQHI surface engine
//!
//! Turns point observations of the Air Quality Health Index into gridded
//! surfaces over named regions. Each region gets two surfaces:
//!
//! - **station_only**: regulatory stations at full weight
//! - **blended**: stations plus nearby low-cost PM2.5 sensors at half weight
//!
//! Every cell carries an estimate, the number and distance of the monitors
//! behind it, and a confidence tier.
//!
//! # Architecture
//!
//! ```text
//! station readings        sensor snapshot
//!      │                        │
//!      ▼                        ▼
//! select_station_points    sensor_points (eAQHI from PM2.5)
//!      │                        │
//!      └──────► MonitorInputs ◄─┘
//!                    │
//!                    ▼
//! AqhiGridService::process_all(regions)      (rayon, one task per region)
//!      │
//!      ├─► build_grid(boundary, cellsize)   lattice filtered by polygon
//!      │
//!      ├─► station_only: stations
//!      ├─► blended: stations + subset_to_bbox(sensors)
//!      │
//!      └─► Interpolator::interpolate_cells   IDW + confidence + display
//!               │
//!               ▼
//!          RunReport (one outcome per region/variant)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use aqhi_grid::{AqhiGridService, GridServiceConfig, MonitorInputs, Region};
//!
//! let service = AqhiGridService::new(GridServiceConfig::default())?;
//! let inputs = MonitorInputs::from_sources(&readings, &sensors);
//! let report = service.process_all(&[Region::new("Edmonton", boundary)], &inputs);
//!
//! for grid in report.succeeded() {
//!     println!("{} {}: {} cells", grid.region, grid.variant, grid.cells.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod monitors;
pub mod service;
pub mod types;

pub use config::{CellSizeRule, CellSizeTable, GridConfig, InterpolationConfig};
pub use error::{GridError, Result};
pub use grid::{build_grid, region_bbox};
pub use interpolation::{classify_sample, classify_samples, distance_km, Interpolator};
pub use monitors::{
    blend, eaqhi_from_pm, select_station_points, sensor_points, subset_to_bbox,
    StationSelection, AQHI_PARAMETER,
};
pub use service::{
    AqhiGridService, ConfidenceCounts, GridServiceConfig, MonitorInputs, Region,
    RegionGridOutput, RegionOutcome, RunReport,
};
pub use types::{
    Confidence, GridCell, GridVariant, IdwSample, InterpolatedCell, MonitorPoint,
    MonitorReading, MonitorSource, Position, RegionGrid, SensorRecord,
};
