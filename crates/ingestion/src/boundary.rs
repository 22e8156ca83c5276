//! Region boundaries in GeoJSON form.
//!
//! Accepts a `FeatureCollection`, a single `Feature` or a bare geometry.
//! Every `Polygon` and `MultiPolygon` found (including inside
//! `GeometryCollection`s) is gathered into one `MultiPolygon`. Other geometry
//! types are ignored.

use aqhi_grid::Region;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Positions may carry a third (altitude) ordinate, which is dropped.
type Ring = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonObject {
    FeatureCollection { features: Vec<Feature> },
    Feature { geometry: Option<Geometry> },
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    GeometryCollection { geometries: Vec<Geometry> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    GeometryCollection { geometries: Vec<Geometry> },
    #[serde(other)]
    Other,
}

fn to_ring(positions: &Ring) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(IngestionError::InvalidGeometry(format!(
                "bad position {:?}",
                p
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Ring]) -> Result<Polygon<f64>> {
    let Some((exterior, holes)) = rings.split_first() else {
        return Err(IngestionError::InvalidGeometry(
            "polygon without rings".to_string(),
        ));
    };
    if exterior.len() < 3 {
        return Err(IngestionError::InvalidGeometry(format!(
            "exterior ring has {} positions",
            exterior.len()
        )));
    }

    let interiors = holes.iter().map(to_ring).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(to_ring(exterior)?, interiors))
}

fn collect_geometry(geometry: &Geometry, out: &mut Vec<Polygon<f64>>) -> Result<()> {
    match geometry {
        Geometry::Polygon { coordinates } => out.push(to_polygon(coordinates)?),
        Geometry::MultiPolygon { coordinates } => {
            for rings in coordinates {
                out.push(to_polygon(rings)?);
            }
        }
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_geometry(g, out)?;
            }
        }
        Geometry::Other => {}
    }
    Ok(())
}

/// Parse a GeoJSON document into the union of its polygons.
pub fn parse_boundary(bytes: &[u8]) -> Result<MultiPolygon<f64>> {
    let object: GeoJsonObject = serde_json::from_slice(bytes)?;

    let mut polygons = Vec::new();
    match &object {
        GeoJsonObject::FeatureCollection { features } => {
            for geometry in features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_geometry(geometry, &mut polygons)?;
            }
        }
        GeoJsonObject::Feature { geometry } => {
            if let Some(geometry) = geometry {
                collect_geometry(geometry, &mut polygons)?;
            }
        }
        GeoJsonObject::Polygon { coordinates } => polygons.push(to_polygon(coordinates)?),
        GeoJsonObject::MultiPolygon { coordinates } => {
            for rings in coordinates {
                polygons.push(to_polygon(rings)?);
            }
        }
        GeoJsonObject::GeometryCollection { geometries } => {
            for g in geometries {
                collect_geometry(g, &mut polygons)?;
            }
        }
        GeoJsonObject::Other => {}
    }

    if polygons.is_empty() {
        return Err(IngestionError::InvalidGeometry(
            "no Polygon or MultiPolygon geometry found".to_string(),
        ));
    }

    debug!(polygons = polygons.len(), "Parsed region boundary");
    Ok(MultiPolygon::new(polygons))
}

/// Parse a boundary document into a named region.
pub fn load_region(name: impl Into<String>, bytes: &[u8]) -> Result<Region> {
    Ok(Region::new(name, parse_boundary(bytes)?))
}
