//! Low-cost sensor snapshots in JSON form.
//!
//! The snapshot is either a bare array of records or an object wrapping the
//! array in `data`. Coordinate field names vary between publishers, so the
//! latitude and longitude keys are resolved once per snapshot from a fixed
//! alias list, first alias present wins.

use aqhi_grid::{Position, SensorRecord};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Accepted latitude keys, in priority order.
pub const LAT_ALIASES: [&str; 5] = ["lat", "Lat", "latitude", "Latitude", "LAT"];

/// Accepted longitude keys, in priority order.
pub const LON_ALIASES: [&str; 7] = ["lon", "Lon", "lng", "Lng", "longitude", "Longitude", "LON"];

const PM_CORR: &str = "pm_corr";
const CONTEXT: &str = "sensor snapshot";

/// Number from a JSON number or a numeric string.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// First alias used as a key by any record.
fn resolve_key(records: &[&Map<String, Value>], aliases: &[&'static str]) -> Option<&'static str> {
    aliases
        .iter()
        .copied()
        .find(|alias| records.iter().any(|r| r.contains_key(*alias)))
}

fn record_array(root: &Value) -> Result<&Vec<Value>> {
    match root {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(IngestionError::unexpected_structure(
                CONTEXT,
                "object without a 'data' array",
            )),
        },
        _ => Err(IngestionError::unexpected_structure(
            CONTEXT,
            "expected an array or an object with 'data'",
        )),
    }
}

/// Parse a parsed JSON snapshot into sensor records.
///
/// Records whose coordinates or `pm_corr` do not parse keep `None` in those
/// fields and are dropped later when monitor points are built.
pub fn sensor_records(root: &Value) -> Result<Vec<SensorRecord>> {
    let objects: Vec<&Map<String, Value>> = record_array(root)?
        .iter()
        .filter_map(Value::as_object)
        .collect();

    if objects.is_empty() {
        return Ok(Vec::new());
    }

    let (lat_key, lon_key) = match (
        resolve_key(&objects, &LAT_ALIASES),
        resolve_key(&objects, &LON_ALIASES),
    ) {
        (Some(lat), Some(lon)) => (lat, lon),
        (None, _) => return Err(IngestionError::MissingColumn("latitude".to_string())),
        (_, None) => return Err(IngestionError::MissingColumn("longitude".to_string())),
    };

    if !objects.iter().any(|r| r.contains_key(PM_CORR)) {
        return Err(IngestionError::MissingColumn(PM_CORR.to_string()));
    }

    let records: Vec<SensorRecord> = objects
        .iter()
        .map(|obj| {
            let lat = obj.get(lat_key).and_then(as_number);
            let lon = obj.get(lon_key).and_then(as_number);
            SensorRecord {
                position: lat.zip(lon).map(|(lat, lon)| Position::new(lon, lat)),
                pm_corr: obj.get(PM_CORR).and_then(as_number),
                sensor_index: obj.get("sensor_index").and_then(Value::as_i64),
                name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            }
        })
        .collect();

    debug!(
        records = records.len(),
        lat_key,
        lon_key,
        "Parsed sensor snapshot"
    );

    Ok(records)
}

/// Parse raw snapshot bytes into sensor records.
pub fn parse_sensor_snapshot(bytes: &[u8]) -> Result<Vec<SensorRecord>> {
    let root: Value = serde_json::from_slice(bytes)?;
    sensor_records(&root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let root = json!([
            {"lat": 53.5, "lon": -113.5, "pm_corr": 12.5, "sensor_index": 7, "name": "Garage"}
        ]);
        let records = sensor_records(&root).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, Some(Position::new(-113.5, 53.5)));
        assert_eq!(records[0].pm_corr, Some(12.5));
        assert_eq!(records[0].sensor_index, Some(7));
        assert_eq!(records[0].name.as_deref(), Some("Garage"));
    }

    #[test]
    fn test_data_wrapper_and_aliases() {
        let root = json!({
            "data": [
                {"Latitude": "51.05", "lng": "-114.07", "pm_corr": "8.2"}
            ]
        });
        let records = sensor_records(&root).unwrap();
        assert_eq!(records[0].position, Some(Position::new(-114.07, 51.05)));
        assert_eq!(records[0].pm_corr, Some(8.2));
    }

    #[test]
    fn test_alias_priority() {
        let root = json!([{"lat": 1.0, "Latitude": 2.0, "lon": 3.0, "pm_corr": 0.0}]);
        let records = sensor_records(&root).unwrap();
        assert_eq!(records[0].position, Some(Position::new(3.0, 1.0)));
    }

    #[test]
    fn test_unparseable_fields_become_none() {
        let root = json!([
            {"lat": "x", "lon": -113.5, "pm_corr": 5.0},
            {"lat": 53.5, "lon": -113.5, "pm_corr": null}
        ]);
        let records = sensor_records(&root).unwrap();
        assert_eq!(records[0].position, None);
        assert_eq!(records[1].pm_corr, None);
    }

    #[test]
    fn test_unexpected_structure() {
        assert!(matches!(
            sensor_records(&json!("hello")),
            Err(IngestionError::UnexpectedStructure { .. })
        ));
        assert!(matches!(
            sensor_records(&json!({"sensors": []})),
            Err(IngestionError::UnexpectedStructure { .. })
        ));
    }

    #[test]
    fn test_missing_coordinate_or_pm_keys() {
        let root = json!([{"x": 1.0, "lon": 2.0, "pm_corr": 3.0}]);
        assert!(matches!(
            sensor_records(&root),
            Err(IngestionError::MissingColumn(ref c)) if c == "latitude"
        ));

        let root = json!([{"lat": 1.0, "lon": 2.0, "pm25": 3.0}]);
        assert!(matches!(
            sensor_records(&root),
            Err(IngestionError::MissingColumn(ref c)) if c == "pm_corr"
        ));
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(sensor_records(&json!([])).unwrap().is_empty());
        assert!(parse_sensor_snapshot(b"{\"data\": []}").unwrap().is_empty());
    }
}
