//! Station reading history in CSV form.
//!
//! ```csv
//! StationName,ParameterName,ReadingDate,Value,Latitude,Longitude
//! Edmonton East,AQHI,2024-07-15T14:00:00-06:00,3,53.548,-113.368
//! ```
//!
//! Header names are matched case-insensitively and column order is free.
//! Rows with an unparseable date, value or coordinate are skipped.

use std::io::Read;

use aqhi_common::parse_timestamp;
use aqhi_grid::{MonitorReading, MonitorSource, Position, AQHI_PARAMETER};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{IngestionError, Result};

const STATION_ID: &str = "StationId";
const STATION_NAME: &str = "StationName";
const PARAMETER_NAME: &str = "ParameterName";
const READING_DATE: &str = "ReadingDate";
const VALUE: &str = "Value";
const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";

/// Cell values read as missing, matched case-insensitively.
const NA_TOKENS: [&str; 14] = [
    "NA", "N/A", "NaN", "-NaN", "NULL", "None", "<NA>", "#N/A", "#N/A N/A", "#NA", "-1.#IND",
    "-1.#QNAN", "1.#IND", "1.#QNAN",
];

fn is_na_token(s: &str) -> bool {
    NA_TOKENS.iter().any(|token| s.eq_ignore_ascii_case(token))
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    station: usize,
    parameter: Option<usize>,
    date: usize,
    value: usize,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let require =
            |name: &str| find(name).ok_or_else(|| IngestionError::MissingColumn(name.to_string()));

        let station = find(STATION_ID)
            .or_else(|| find(STATION_NAME))
            .ok_or_else(|| IngestionError::MissingColumn(STATION_NAME.to_string()))?;

        Ok(Self {
            station,
            parameter: find(PARAMETER_NAME),
            date: require(READING_DATE)?,
            value: require(VALUE)?,
            lat: require(LATITUDE)?,
            lon: require(LONGITUDE)?,
        })
    }
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn number(record: &StringRecord, idx: usize) -> Option<f64> {
    field(record, idx)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(record: &StringRecord, cols: &Columns) -> Option<MonitorReading> {
    let station_id = field(record, cols.station)?.to_string();
    let timestamp = parse_timestamp(field(record, cols.date)?).ok()?;
    let value = number(record, cols.value)?;
    let lat = number(record, cols.lat)?;
    let lon = number(record, cols.lon)?;

    let parameter = cols
        .parameter
        .and_then(|idx| field(record, idx))
        .filter(|p| !is_na_token(p))
        .unwrap_or(AQHI_PARAMETER)
        .to_string();

    Some(MonitorReading {
        station_id,
        timestamp,
        parameter,
        value: Some(value),
        position: Some(Position::new(lon, lat)),
        source: MonitorSource::Station,
    })
}

/// Parse a station CSV into readings.
pub fn parse_station_csv<R: Read>(reader: R) -> Result<Vec<MonitorReading>> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let cols = Columns::resolve(csv_reader.headers()?)?;

    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        match result.ok().as_ref().and_then(|r| parse_row(r, &cols)) {
            Some(reading) => readings.push(reading),
            None => skipped += 1,
        }
    }

    debug!(rows = readings.len(), skipped, "Parsed station CSV");
    Ok(readings)
}
