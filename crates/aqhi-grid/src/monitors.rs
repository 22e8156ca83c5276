//! Monitor set building.
//!
//! Reduces raw station readings and low-cost sensor snapshots to one
//! [`MonitorPoint`] per monitor:
//!
//! - stations: AQHI readings from the latest hour present, most recent
//!   reading per station, weight 1.0
//! - sensors: corrected PM2.5 quantized to an AQHI-equivalent, weight 0.5

use std::collections::BTreeMap;

use aqhi_common::{truncate_to_hour, BoundingBox};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::types::{MonitorPoint, MonitorReading, MonitorSource, SensorRecord};

/// Parameter name of the readings that feed the surface.
pub const AQHI_PARAMETER: &str = "AQHI";

/// Station points selected for the current hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSelection {
    /// One point per station, ordered by station id.
    pub points: Vec<MonitorPoint>,
    /// Latest hour present among AQHI readings.
    pub current_hour: Option<DateTime<Utc>>,
    /// Newest timestamp among the selected points.
    pub latest_timestamp: Option<DateTime<Utc>>,
}

/// Select one AQHI point per station for the latest hour in the history.
pub fn select_station_points(readings: &[MonitorReading]) -> StationSelection {
    let aqhi: Vec<&MonitorReading> = readings
        .iter()
        .filter(|r| r.parameter == AQHI_PARAMETER)
        .collect();

    let Some(current_hour) = aqhi.iter().map(|r| truncate_to_hour(r.timestamp)).max() else {
        return StationSelection::default();
    };

    let mut by_station: BTreeMap<&str, Vec<&MonitorReading>> = BTreeMap::new();
    for reading in aqhi
        .into_iter()
        .filter(|r| truncate_to_hour(r.timestamp) == current_hour)
    {
        by_station
            .entry(reading.station_id.as_str())
            .or_default()
            .push(reading);
    }

    let mut points = Vec::with_capacity(by_station.len());
    let mut latest_timestamp: Option<DateTime<Utc>> = None;
    let mut dropped = 0usize;

    for (_, mut group) in by_station {
        // Stable sort: equal timestamps keep input order, so the later record wins.
        group.sort_by_key(|r| r.timestamp);
        let Some(latest) = group.last() else {
            continue;
        };

        match (latest.value, latest.position) {
            (Some(value), Some(position)) if value.is_finite() && position.is_finite() => {
                points.push(MonitorPoint::from_source(position, value, MonitorSource::Station));
                latest_timestamp = latest_timestamp.max(Some(latest.timestamp));
            }
            _ => dropped += 1,
        }
    }

    debug!(
        stations = points.len(),
        dropped,
        current_hour = %current_hour,
        "Selected station monitor points"
    );

    StationSelection {
        points,
        current_hour: Some(current_hour),
        latest_timestamp,
    }
}

/// Estimated AQHI from corrected PM2.5: `clamp(floor(pm / 10) + 1, 0, 10)`.
pub fn eaqhi_from_pm(pm_corr: f64) -> f64 {
    ((pm_corr / 10.0).floor() + 1.0).clamp(0.0, 10.0)
}

/// Convert a sensor snapshot into weighted monitor points.
///
/// Records missing a position or concentration are skipped and logged by
/// sensor index and name.
pub fn sensor_points(records: &[SensorRecord]) -> Vec<MonitorPoint> {
    let mut points = Vec::with_capacity(records.len());

    for record in records {
        let position = record.position.filter(|p| p.is_finite());
        let pm = record.pm_corr.filter(|pm| pm.is_finite());
        match (position, pm) {
            (Some(position), Some(pm)) => points.push(MonitorPoint::from_source(
                position,
                eaqhi_from_pm(pm),
                MonitorSource::LowCostSensor,
            )),
            _ => debug!(
                sensor_index = ?record.sensor_index,
                name = record.name.as_deref().unwrap_or(""),
                has_position = position.is_some(),
                has_pm = pm.is_some(),
                "Dropped sensor record"
            ),
        }
    }

    debug!(
        sensors = points.len(),
        dropped = records.len() - points.len(),
        "Converted sensor snapshot"
    );

    points
}

/// Keep points inside `bbox` expanded by `margin` degrees. Values and weights
/// are passed through unchanged.
pub fn subset_to_bbox(points: &[MonitorPoint], bbox: &BoundingBox, margin: f64) -> Vec<MonitorPoint> {
    let window = bbox.expand(margin);
    points
        .iter()
        .filter(|p| window.contains_point(p.position.lon, p.position.lat))
        .copied()
        .collect()
}

/// Station points followed by sensor points.
pub fn blend(stations: &[MonitorPoint], sensors: &[MonitorPoint]) -> Vec<MonitorPoint> {
    let mut blended = Vec::with_capacity(stations.len() + sensors.len());
    blended.extend_from_slice(stations);
    blended.extend_from_slice(sensors);
    blended
}
