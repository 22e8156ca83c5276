//! Region grid construction.
//!
//! A lattice of lower-left corners is laid over the region's bounding box,
//! starting at the minimum on each axis and stepping by `cellsize` while the
//! coordinate stays strictly below the maximum. Corners outside the region
//! geometry are dropped. Surviving cells are ordered row by row, south to
//! north, west to east within a row.

use aqhi_common::BoundingBox;
use geo::{BoundingRect, Coord, Intersects, MultiPolygon, Polygon};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::types::{GridCell, RegionGrid};

/// Bounding box of a region geometry, if it has any coordinates.
pub fn region_bbox(boundary: &MultiPolygon<f64>) -> Option<BoundingBox> {
    boundary
        .bounding_rect()
        .map(|rect| BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
}

/// Number of lattice steps in `[min, max)`.
fn axis_steps(min: f64, max: f64, cellsize: f64) -> u64 {
    let span = max - min;
    if span <= 0.0 {
        return 0;
    }
    (span / cellsize).ceil() as u64
}

/// Build the grid of cells whose lower-left corner lies inside `boundary`.
///
/// `name` is only used in errors and log output.
pub fn build_grid(
    name: &str,
    boundary: &MultiPolygon<f64>,
    cellsize: f64,
    max_cells: u64,
) -> Result<RegionGrid> {
    if !cellsize.is_finite() || cellsize <= 0.0 {
        return Err(GridError::InvalidCellSize(cellsize));
    }

    let bbox = region_bbox(boundary).ok_or_else(|| GridError::empty_region(name))?;
    let bbox = BoundingBox::try_new(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)?;

    let nx = axis_steps(bbox.min_x, bbox.max_x, cellsize);
    let ny = axis_steps(bbox.min_y, bbox.max_y, cellsize);
    let requested = nx.saturating_mul(ny);
    if requested > max_cells {
        return Err(GridError::TooManyCells {
            requested,
            limit: max_cells,
        });
    }

    // Per-polygon extents let most lattice points skip the ring test.
    let polygons: Vec<(&Polygon<f64>, Option<BoundingBox>)> = boundary
        .0
        .iter()
        .map(|poly| {
            let rect = poly
                .bounding_rect()
                .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y));
            (poly, rect)
        })
        .collect();

    let mut cells = Vec::new();
    for j in 0..ny {
        let y = bbox.min_y + j as f64 * cellsize;
        for i in 0..nx {
            let x = bbox.min_x + i as f64 * cellsize;
            let point = Coord { x, y };
            let inside = polygons.iter().any(|(poly, rect)| {
                rect.is_some_and(|r| r.contains_point(x, y)) && poly.intersects(&point)
            });
            if inside {
                cells.push(GridCell::new(x, y, cellsize));
            }
        }
    }

    debug!(
        region = %name,
        cellsize,
        candidates = requested,
        cells = cells.len(),
        "Built region grid"
    );

    Ok(RegionGrid {
        cellsize,
        bbox,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]])
    }

    #[test]
    fn test_half_open_lattice() {
        let grid = build_grid("square", &unit_square(), 0.25, 1_000).unwrap();
        // 4 x 4 corners; the max edge at 1.0 is excluded.
        assert_eq!(grid.len(), 16);
        assert!(grid.cells.iter().all(|c| c.x0 < 1.0 && c.y0 < 1.0));
        assert_eq!(grid.cells[0], GridCell::new(0.0, 0.0, 0.25));
    }

    #[test]
    fn test_row_major_order() {
        let grid = build_grid("square", &unit_square(), 0.5, 1_000).unwrap();
        let corners: Vec<(f64, f64)> = grid.cells.iter().map(|c| (c.x0, c.y0)).collect();
        assert_eq!(corners, vec![(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)]);
    }

    #[test]
    fn test_polygon_filter_drops_corners_outside() {
        // Right triangle below the diagonal y = x.
        let triangle = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ]]);
        let grid = build_grid("triangle", &triangle, 0.5, 1_000).unwrap();
        assert!(grid.len() < 16);
        assert!(grid.cells.iter().all(|c| c.y0 <= c.x0));
    }

    #[test]
    fn test_multipolygon_union() {
        let parts = MultiPolygon::new(vec![
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)],
            polygon![(x: 3.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 0.0)],
        ]);
        let grid = build_grid("islands", &parts, 0.5, 1_000).unwrap();
        // Gap between x = 1 and x = 3 holds no cells.
        assert!(grid.cells.iter().all(|c| c.x0 <= 1.0 || c.x0 >= 3.0));
        assert!(grid.cells.iter().any(|c| c.x0 >= 3.0));
        assert!(grid.cells.iter().any(|c| c.x0 < 1.0));
    }

    #[test]
    fn test_invalid_cellsize() {
        assert_eq!(
            build_grid("square", &unit_square(), 0.0, 1_000),
            Err(GridError::InvalidCellSize(0.0))
        );
        assert!(build_grid("square", &unit_square(), -0.1, 1_000).is_err());
    }

    #[test]
    fn test_empty_region() {
        let empty = MultiPolygon::<f64>::new(vec![]);
        assert_eq!(
            build_grid("nowhere", &empty, 0.1, 1_000),
            Err(GridError::EmptyRegion("nowhere".to_string()))
        );
    }

    #[test]
    fn test_too_many_cells() {
        let result = build_grid("square", &unit_square(), 0.001, 1_000);
        assert!(matches!(
            result,
            Err(GridError::TooManyCells { requested: 1_000_000, limit: 1_000 })
        ));
    }
}
