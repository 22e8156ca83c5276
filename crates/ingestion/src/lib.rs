//! AQHI source loading and grid output.
//!
//! Everything between the outside world and the `aqhi-grid` core:
//!
//! - Station reading history (CSV) into `MonitorReading`s
//! - Low-cost sensor snapshots (JSON) into `SensorRecord`s
//! - Region boundaries (GeoJSON) into `Region`s
//! - Fetching any of the above over HTTP or from disk
//! - Writing interpolated grids back out as GeoJSON

pub mod boundary;
pub mod error;
pub mod fetch;
pub mod geojson;
pub mod sensors;
pub mod stations;

// Re-exports
pub use boundary::{load_region, parse_boundary};
pub use error::{IngestionError, Result};
pub use fetch::{is_remote, FetchConfig, SourceFetcher};
pub use geojson::{
    output_file_name, region_slug, write_region_grid, GridFeature, GridFeatureCollection,
};
pub use sensors::{parse_sensor_snapshot, sensor_records};
pub use stations::parse_station_csv;
