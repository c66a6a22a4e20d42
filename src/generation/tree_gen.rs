//! Tree placement by capped rejection sampling.
//!
//! Candidates are drawn uniformly over the normalized terrain and kept only
//! where height and slope fall inside the acceptance band. Sampling stops at
//! the requested count or the attempt cap, whichever comes first, so a band
//! with little or no area can never stall generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::core::ConfigError;
use crate::terrain::seed::{sampleable_range, stage_rng, GenerationSeeds};
use crate::terrain::{Heightfield, SlopeGrid, WorldExtents};

/// Parameters controlling tree placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Requested number of trees
    pub count: u32,
    /// Upper bound on candidate draws
    pub max_attempts: u32,
    /// Accept only strictly above this normalized height
    pub min_height: f32,
    /// Accept only strictly below this normalized height
    pub max_height: f32,
    /// Accept only strictly below this slope (degrees)
    pub max_slope: f32,
    /// Number of tree prototypes to pick from
    pub prototype_count: u32,
    /// Width/height scale range
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            count: 100,
            max_attempts: 5_000,
            min_height: 0.1,
            max_height: 0.6,
            max_slope: 25.0,
            prototype_count: 1,
            min_scale: 0.8,
            max_scale: 1.2,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prototype_count == 0 {
            return Err(ConfigError::Vegetation("at least one tree prototype is required".into()));
        }
        if ![self.min_height, self.max_height, self.max_slope].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Vegetation("tree acceptance band must be finite".into()));
        }
        if !self.min_scale.is_finite() || !self.max_scale.is_finite() || self.min_scale <= 0.0 {
            return Err(ConfigError::Vegetation(format!(
                "tree scale range [{}, {}] must be positive", self.min_scale, self.max_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Vegetation(format!(
                "tree scale range [{}, {}] is inverted", self.min_scale, self.max_scale
            )));
        }
        if !sampleable_range(self.min_scale, self.max_scale) {
            return Err(ConfigError::Vegetation(format!(
                "tree scale range [{}, {}] is too wide", self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    /// True when no (height, slope) pair can pass the acceptance test.
    pub fn band_is_empty(&self) -> bool {
        self.min_height >= self.max_height
            || self.min_height >= 1.0
            || self.max_height <= 0.0
            || self.max_slope <= 0.0
    }
}

/// A placed tree, in normalized terrain coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetationInstance {
    pub u: f32,
    pub v: f32,
    /// Yaw in radians, [0, 2π)
    pub rotation: f32,
    pub width_scale: f32,
    pub height_scale: f32,
    pub prototype: u32,
}

impl VegetationInstance {
    /// World-space base position, resting on the heightfield.
    pub fn world_position(&self, extents: &WorldExtents, heights: &Heightfield) -> Vec3 {
        extents.to_world(self.u, self.v, heights.sample_bilinear(self.u, self.v))
    }
}

/// Outcome of a placement run
#[derive(Clone, Debug, PartialEq)]
pub struct TreePlacement {
    pub instances: Vec<VegetationInstance>,
    /// Candidates drawn
    pub attempts: u32,
    /// The acceptance band had no area and sampling was skipped
    pub band_empty: bool,
}

/// Rejection sampler for discrete vegetation.
pub struct TreePlacer<'a> {
    params: &'a TreeParams,
    seed: u64,
}

impl<'a> TreePlacer<'a> {
    pub fn new(params: &'a TreeParams, seeds: &GenerationSeeds) -> Self {
        Self { params, seed: seeds.trees }
    }

    /// Acceptance test for a candidate's terrain.
    #[inline]
    pub fn accepts(&self, height: f32, slope: f32) -> bool {
        height > self.params.min_height
            && height < self.params.max_height
            && slope < self.params.max_slope
    }

    pub fn place(&self, heights: &Heightfield, slopes: &SlopeGrid) -> TreePlacement {
        let requested = self.params.count as usize;

        if self.params.band_is_empty() {
            log::warn!(
                "Tree acceptance band is empty (height ({}, {}), slope < {}); skipping placement",
                self.params.min_height, self.params.max_height, self.params.max_slope
            );
            return TreePlacement { instances: Vec::new(), attempts: 0, band_empty: true };
        }

        let mut rng = stage_rng(self.seed);
        let mut instances = Vec::with_capacity(requested);
        let mut attempts = 0u32;

        while instances.len() < requested && attempts < self.params.max_attempts {
            attempts += 1;

            let u = rng.gen_range(0.0f32..=1.0);
            let v = rng.gen_range(0.0f32..=1.0);
            let height = heights.sample_bilinear(u, v);
            let slope = slopes.sample_bilinear(u, v);
            if !self.accepts(height, slope) {
                continue;
            }

            instances.push(VegetationInstance {
                u,
                v,
                prototype: rng.gen_range(0..self.params.prototype_count),
                width_scale: rng.gen_range(self.params.min_scale..=self.params.max_scale),
                height_scale: rng.gen_range(self.params.min_scale..=self.params.max_scale),
                rotation: rng.gen_range(0.0..std::f32::consts::TAU),
            });
        }

        log::debug!("Placed {} of {} trees in {} attempts", instances.len(), requested, attempts);

        TreePlacement { instances, attempts, band_empty: false }
    }
}
