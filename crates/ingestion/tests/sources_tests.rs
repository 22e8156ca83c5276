//! Tests for loading sources from disk and writing grid outputs.

use std::fs;

use aqhi_grid::{AqhiGridService, CellSizeTable, GridServiceConfig, GridVariant, MonitorInputs};
use ingestion::{
    load_region, parse_sensor_snapshot, parse_station_csv, write_region_grid, FetchConfig,
    GridFeatureCollection, IngestionError, SourceFetcher,
};
use tempfile::TempDir;

const STATIONS_CSV: &str = "\
StationName,ParameterName,ReadingDate,Value,Latitude,Longitude
Edmonton East,AQHI,2024-07-15T13:00:00Z,2,53.548,-113.368
Edmonton East,AQHI,2024-07-15T14:00:00Z,3,53.548,-113.368
Edmonton McCauley,AQHI,2024-07-15T14:00:00Z,4,53.572,-113.508
Edmonton McCauley,Ozone,2024-07-15T14:00:00Z,31,53.572,-113.508
Edmonton South,AQHI,2024-07-15T14:00:00Z,,53.500,-113.526
";

const SENSORS_JSON: &str = r#"{
  "data": [
    {"sensor_index": 1, "name": "Downtown", "lat": "53.54", "lon": "-113.49", "pm_corr": 35.2},
    {"sensor_index": 2, "lat": 53.60, "lon": -113.40, "pm_corr": "4.0"},
    {"sensor_index": 3, "lat": 49.0, "lon": -110.0, "pm_corr": 80.0},
    {"sensor_index": 4, "lat": null, "lon": -113.40, "pm_corr": 12.0}
  ]
}"#;

const BOUNDARY_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Edmonton"},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-113.7, 53.4], [-113.2, 53.4], [-113.2, 53.7], [-113.7, 53.7], [-113.7, 53.4]]]
      }
    }
  ]
}"#;

fn write_sources(dir: &TempDir) -> (String, String, String) {
    let stations = dir.path().join("stations.csv");
    let sensors = dir.path().join("sensors.json");
    let boundary = dir.path().join("edmonton.geojson");
    fs::write(&stations, STATIONS_CSV).unwrap();
    fs::write(&sensors, SENSORS_JSON).unwrap();
    fs::write(&boundary, BOUNDARY_GEOJSON).unwrap();
    (
        stations.display().to_string(),
        sensors.display().to_string(),
        boundary.display().to_string(),
    )
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
async fn test_fetch_local_file() {
    let dir = TempDir::new().unwrap();
    let (stations, _, _) = write_sources(&dir);

    let fetcher = SourceFetcher::new(&FetchConfig::default()).unwrap();
    let bytes = fetcher.fetch(&stations).await.unwrap();
    assert_eq!(bytes, STATIONS_CSV.as_bytes());
}

#[tokio::test]
async fn test_fetch_missing_file_is_fetch_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv").display().to_string();

    let fetcher = SourceFetcher::new(&FetchConfig::default()).unwrap();
    let err = fetcher.fetch(&missing).await.unwrap_err();
    assert!(matches!(err, IngestionError::Fetch { ref location, .. } if *location == missing));
}

#[test]
fn test_fetch_with_block_on() {
    let dir = TempDir::new().unwrap();
    let (_, sensors, _) = write_sources(&dir);

    let fetcher = SourceFetcher::new(&FetchConfig::default()).unwrap();
    let bytes = tokio_test::block_on(fetcher.fetch(&sensors)).unwrap();
    let records = parse_sensor_snapshot(&bytes).unwrap();
    assert_eq!(records.len(), 4);
}

// ============================================================================
// Parsing into monitor inputs
// ============================================================================

#[test]
fn test_sources_to_monitor_inputs() {
    let readings = parse_station_csv(STATIONS_CSV.as_bytes()).unwrap();
    // Blank value row is excluded at parse time.
    assert_eq!(readings.len(), 4);

    let sensors = parse_sensor_snapshot(SENSORS_JSON.as_bytes()).unwrap();
    let inputs = MonitorInputs::from_sources(&readings, &sensors);

    let values: Vec<f64> = inputs.stations.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![3.0, 4.0]);
    // 35.2 -> 4, 4.0 -> 1, 80.0 -> 9; null latitude dropped.
    let sensor_values: Vec<f64> = inputs.sensors.iter().map(|p| p.value).collect();
    assert_eq!(sensor_values, vec![4.0, 1.0, 9.0]);
    assert!(inputs.timestamp.is_some());
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_region_grids_written_as_geojson() {
    let dir = TempDir::new().unwrap();
    let readings = parse_station_csv(STATIONS_CSV.as_bytes()).unwrap();
    let sensors = parse_sensor_snapshot(SENSORS_JSON.as_bytes()).unwrap();
    let region = load_region("Edmonton Metro", BOUNDARY_GEOJSON.as_bytes()).unwrap();

    let service = AqhiGridService::new(GridServiceConfig {
        cellsize: CellSizeTable {
            default: 0.1,
            rules: vec![],
        },
        ..GridServiceConfig::default()
    })
    .unwrap();
    let inputs = MonitorInputs::from_sources(&readings, &sensors);
    let report = service.process_all(&[region], &inputs);
    assert_eq!(report.succeeded().count(), 2);

    let out_dir = dir.path().join("out");
    let mut written = Vec::new();
    for output in report.succeeded() {
        written.push(write_region_grid(&out_dir, output).unwrap());
    }

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "edmonton_metro_station_only.geojson",
            "edmonton_metro_blended.geojson"
        ]
    );

    let text = fs::read_to_string(&written[1]).unwrap();
    let collection: GridFeatureCollection = serde_json::from_str(&text).unwrap();
    assert_eq!(collection.type_, "FeatureCollection");
    assert_eq!(collection.variant, GridVariant::Blended);
    assert!(!collection.features.is_empty());

    let first = &collection.features[0];
    assert_eq!(first.properties.timestamp.as_deref(), Some("2024-07-15T14:00:00Z"));
    assert!(first.properties.n_contributors >= 2);
    assert!(first.properties.estimate.is_some());
}
