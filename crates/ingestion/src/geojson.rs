//! GeoJSON output for interpolated region grids.
//!
//! One `FeatureCollection` per region and variant, one square `Polygon`
//! feature per cell. The collection carries `region`, `variant` and
//! `cellsize` as foreign members.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use aqhi_grid::{Confidence, GridVariant, InterpolatedCell, RegionGridOutput};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// A FeatureCollection of grid cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridFeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub region: String,
    pub variant: GridVariant,
    pub cellsize: f64,

    pub features: Vec<GridFeature>,
}

impl GridFeatureCollection {
    /// Build the collection for one region grid.
    pub fn from_output(output: &RegionGridOutput) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            region: output.region.clone(),
            variant: output.variant,
            cellsize: output.cellsize,
            features: output
                .cells
                .iter()
                .map(|cell| GridFeature::from_cell(cell, output.timestamp.as_deref()))
                .collect(),
        }
    }
}

/// One grid cell as a Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridFeature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub geometry: CellGeometry,

    pub properties: CellProperties,
}

impl GridFeature {
    pub fn from_cell(cell: &InterpolatedCell, timestamp: Option<&str>) -> Self {
        Self {
            type_: "Feature".to_string(),
            geometry: CellGeometry::Polygon {
                coordinates: vec![cell.cell.ring().to_vec()],
            },
            properties: CellProperties {
                value: cell.display_value.clone(),
                color: cell.color.clone(),
                label: cell.label.clone(),
                confidence: cell.confidence,
                estimate: cell.estimated_value,
                nearest_km: cell.nearest_contributor_km,
                n_contributors: cell.contributor_count,
                total_weight: cell.total_weight,
                timestamp: timestamp.map(str::to_string),
            },
        }
    }
}

/// Cell footprint geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CellGeometry {
    /// Exterior ring only, closed, counter-clockwise from the lower-left corner.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

/// Per-cell feature properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellProperties {
    /// Display value: "NA", "0" to "10", or "10+".
    pub value: String,
    pub color: String,
    pub label: String,
    pub confidence: Confidence,
    pub estimate: Option<f64>,
    pub nearest_km: Option<f64>,
    pub n_contributors: usize,
    pub total_weight: f64,
    pub timestamp: Option<String>,
}

/// File-name-safe form of a region name.
///
/// Lowercased; runs of anything other than ASCII letters and digits become a
/// single underscore.
pub fn region_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("region");
    }
    slug
}

/// `<region-slug>_<variant>.geojson`
pub fn output_file_name(region: &str, variant: GridVariant) -> String {
    format!("{}_{}.geojson", region_slug(region), variant)
}

/// Write one region grid under `dir`, creating it if needed.
pub fn write_region_grid(dir: &Path, output: &RegionGridOutput) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(&output.region, output.variant));

    let collection = GridFeatureCollection::from_output(output);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush()?;

    info!(
        path = %path.display(),
        features = collection.features.len(),
        "Wrote region grid"
    );
    Ok(path)
}
