//! Core types for monitor sets, grids and interpolated cells.

use std::fmt;

use aqhi_common::BoundingBox;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lon/lat position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Where a monitor reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorSource {
    /// Regulatory monitoring station.
    Station,
    /// Lower-cost particulate sensor.
    LowCostSensor,
}

impl MonitorSource {
    /// Trust multiplier applied on top of distance weighting.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Station => 1.0,
            Self::LowCostSensor => 0.5,
        }
    }
}

/// One observation from one monitor at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReading {
    pub station_id: String,
    pub timestamp: DateTime<Utc>,
    pub parameter: String,
    pub value: Option<f64>,
    pub position: Option<Position>,
    pub source: MonitorSource,
}

/// One entry of a low-cost sensor snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorRecord {
    pub position: Option<Position>,
    /// Corrected PM2.5 concentration in µg/m³.
    pub pm_corr: Option<f64>,
    /// Identifies the sensor in logs.
    pub sensor_index: Option<i64>,
    pub name: Option<String>,
}

/// The unit the interpolator consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorPoint {
    pub position: Position,
    pub value: f64,
    pub weight: f64,
}

impl MonitorPoint {
    pub fn new(position: Position, value: f64, weight: f64) -> Self {
        Self {
            position,
            value,
            weight,
        }
    }

    /// Build a point carrying the fixed trust weight of its source.
    pub fn from_source(position: Position, value: f64, source: MonitorSource) -> Self {
        Self::new(position, value, source.weight())
    }
}

/// A grid cell identified by its lower-left corner.
///
/// The corner is both the interpolation sample point and the anchor of the
/// display polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub x0: f64,
    pub y0: f64,
    pub cellsize: f64,
}

impl GridCell {
    pub fn new(x0: f64, y0: f64, cellsize: f64) -> Self {
        Self { x0, y0, cellsize }
    }

    /// The point the interpolator samples at.
    pub fn representative_point(&self) -> Position {
        Position::new(self.x0, self.y0)
    }

    /// Closed ring of the display square anchored at the lower-left corner.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        let x1 = self.x0 + self.cellsize;
        let y1 = self.y0 + self.cellsize;
        [
            [self.x0, self.y0],
            [x1, self.y0],
            [x1, y1],
            [self.x0, y1],
            [self.x0, self.y0],
        ]
    }
}

/// Ordered grid cells that fall inside one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGrid {
    pub cellsize: f64,
    pub bbox: BoundingBox,
    pub cells: Vec<GridCell>,
}

impl RegionGrid {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Confidence tier attached to each interpolated cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw interpolation result at one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwSample {
    pub estimate: Option<f64>,
    pub nearest_km: Option<f64>,
    pub contributor_count: usize,
    pub total_weight: f64,
}

/// A grid cell with its estimate, confidence and display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCell {
    pub cell: GridCell,
    pub estimated_value: Option<f64>,
    pub nearest_contributor_km: Option<f64>,
    pub contributor_count: usize,
    pub total_weight: f64,
    pub confidence: Confidence,
    pub display_value: String,
    pub color: String,
    pub label: String,
}

/// Which monitor set a grid was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridVariant {
    /// Regulatory stations only.
    StationOnly,
    /// Stations plus region-subsetted low-cost sensors.
    Blended,
}

impl GridVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StationOnly => "station_only",
            Self::Blended => "blended",
        }
    }
}

impl fmt::Display for GridVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
