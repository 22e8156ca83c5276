//! Inverse distance weighting with confidence classification.
//!
//! For a sample point and a set of monitors:
//!
//! ```text
//! d_i = hypot(dlon, dlat) * 111 km        (planar, exact zero replaced by 1e-6 km)
//! valid_i = max_dist_km unset || d_i <= max_dist_km
//! w_i = weight_i / d_i^power              (valid monitors only)
//! estimate = Σ w_i v_i / Σ w_i            (undefined if n < min_points, Σ w_i == 0,
//!                                          or the weights overflow)
//! ```
//!
//! The planar approximation is only meant for sub-national regions.

use aqhi_common::AqhiCategory;

use crate::config::InterpolationConfig;
use crate::error::Result;
use crate::types::{
    Confidence, GridCell, IdwSample, InterpolatedCell, MonitorPoint, Position, RegionGrid,
};

/// Kilometres per degree in the planar distance approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Distance used in place of an exact zero before it becomes a divisor.
pub const MIN_DISTANCE_KM: f64 = 1e-6;

/// Planar degree-space distance between two positions, in kilometres.
pub fn distance_km(a: Position, b: Position) -> f64 {
    (a.lon - b.lon).hypot(a.lat - b.lat) * KM_PER_DEGREE
}

// (min contributors, max nearest distance km, tier), highest tier first.
const CONFIDENCE_TIERS: [(usize, f64, Confidence); 3] = [
    (5, 15.0, Confidence::High),
    (3, 30.0, Confidence::Medium),
    (1, 50.0, Confidence::Low),
];

impl Confidence {
    /// Tier for a contributor count and nearest-contributor distance.
    ///
    /// Tiers are checked from High down; the first one satisfied wins.
    pub fn from_count_distance(contributors: usize, nearest_km: f64) -> Self {
        CONFIDENCE_TIERS
            .iter()
            .find(|(min_n, max_d, _)| contributors >= *min_n && nearest_km <= *max_d)
            .map(|(_, _, tier)| *tier)
            .unwrap_or(Confidence::None)
    }

    /// Tier for an interpolation sample. Undefined or non-finite estimates
    /// are always `None`.
    pub fn classify(sample: &IdwSample) -> Self {
        match (sample.estimate, sample.nearest_km) {
            (Some(e), Some(d)) if e.is_finite() => {
                Self::from_count_distance(sample.contributor_count, d)
            }
            _ => Confidence::None,
        }
    }
}

/// Stateless IDW interpolator holding only its parameters.
#[derive(Debug, Clone)]
pub struct Interpolator {
    config: InterpolationConfig,
}

impl Interpolator {
    /// Create an interpolator after validating its configuration.
    pub fn new(config: InterpolationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Interpolate at a single point.
    pub fn interpolate_point(&self, point: Position, monitors: &[MonitorPoint]) -> IdwSample {
        let mut total_weight = 0.0;
        let mut weighted_sum = 0.0;
        let mut contributor_count = 0usize;
        let mut nearest_km: Option<f64> = None;

        for monitor in monitors {
            let d = match distance_km(point, monitor.position) {
                d if d == 0.0 => MIN_DISTANCE_KM,
                d => d,
            };
            if self.config.max_dist_km.is_some_and(|max| d > max) {
                continue;
            }

            let w = monitor.weight / d.powf(self.config.power);
            total_weight += w;
            weighted_sum += w * monitor.value;
            contributor_count += 1;
            nearest_km = Some(nearest_km.map_or(d, |n| n.min(d)));
        }

        let estimate = if contributor_count < self.config.min_points
            || total_weight == 0.0
            || !total_weight.is_finite()
        {
            None
        } else {
            Some(weighted_sum / total_weight).filter(|e: &f64| e.is_finite())
        };

        IdwSample {
            estimate,
            nearest_km,
            contributor_count,
            total_weight,
        }
    }

    /// Interpolate at every cell's representative point, in grid order.
    pub fn interpolate(&self, grid: &RegionGrid, monitors: &[MonitorPoint]) -> Vec<IdwSample> {
        grid.cells
            .iter()
            .map(|cell| self.interpolate_point(cell.representative_point(), monitors))
            .collect()
    }

    /// Interpolate and classify every cell of a grid.
    pub fn interpolate_cells(
        &self,
        grid: &RegionGrid,
        monitors: &[MonitorPoint],
    ) -> Vec<InterpolatedCell> {
        let samples = self.interpolate(grid, monitors);
        classify_samples(grid, &samples)
    }
}

/// Attach confidence, display value, colour and label to one sample.
pub fn classify_sample(cell: GridCell, sample: &IdwSample) -> InterpolatedCell {
    let category = AqhiCategory::from_estimate(sample.estimate);
    InterpolatedCell {
        cell,
        estimated_value: sample.estimate,
        nearest_contributor_km: sample.nearest_km,
        contributor_count: sample.contributor_count,
        total_weight: sample.total_weight,
        confidence: Confidence::classify(sample),
        display_value: category.to_string(),
        color: category.color().to_string(),
        label: category.label(),
    }
}

/// Pair grid cells with their samples, preserving grid order.
pub fn classify_samples(grid: &RegionGrid, samples: &[IdwSample]) -> Vec<InterpolatedCell> {
    grid.cells
        .iter()
        .zip(samples)
        .map(|(cell, sample)| classify_sample(*cell, sample))
        .collect()
}
