//! Decorative floating islands.
//!
//! Islands are scattered independently of the heightfield using their own RNG
//! stream. Overlap between islands is allowed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::core::ConfigError;
use crate::math::Aabb;
use crate::terrain::seed::{sampleable_range, stage_rng, GenerationSeeds};
use crate::terrain::WorldExtents;

/// Parameters controlling island placement (world units)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    pub enabled: bool,
    pub count: u32,
    /// Island center altitude range
    pub min_height: f32,
    pub max_height: f32,
    /// Keep-out distance from the X/Z world edges
    pub margin: f32,
    /// Per-axis island size range
    pub min_size: Vec3,
    pub max_size: Vec3,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            enabled: false,
            count: 5,
            min_height: 100.0,
            max_height: 300.0,
            margin: 100.0,
            min_size: Vec3::new(30.0, 10.0, 30.0),
            max_size: Vec3::new(80.0, 20.0, 80.0),
        }
    }
}

impl FeatureParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_height.is_finite() || !self.max_height.is_finite() {
            return Err(ConfigError::Features("island height range must be finite".into()));
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::Features(format!(
                "island height range [{}, {}] is inverted", self.min_height, self.max_height
            )));
        }
        if !sampleable_range(self.min_height, self.max_height) {
            return Err(ConfigError::Features(format!(
                "island height range [{}, {}] is too wide", self.min_height, self.max_height
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError::Features(format!("margin must be non-negative, got {}", self.margin)));
        }
        if !self.min_size.is_finite() || !self.max_size.is_finite() || self.min_size.min_element() <= 0.0 {
            return Err(ConfigError::Features("island sizes must be positive and finite".into()));
        }
        if self.min_size.cmpgt(self.max_size).any() {
            return Err(ConfigError::Features(format!(
                "island size range {:?}..{:?} is inverted", self.min_size, self.max_size
            )));
        }
        let spans = [
            (self.min_size.x, self.max_size.x),
            (self.min_size.y, self.max_size.y),
            (self.min_size.z, self.max_size.z),
        ];
        if !spans.iter().all(|&(lo, hi)| sampleable_range(lo, hi)) {
            return Err(ConfigError::Features(format!(
                "island size range {:?}..{:?} is too wide", self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// A placed floating landmass
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatingIsland {
    pub center: Vec3,
    pub size: Vec3,
}

impl FloatingIsland {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }
}

/// Sampling range along one ground axis; collapses to the midpoint when the
/// margins leave no room.
fn axis_range(extent: f32, margin: f32) -> (f32, f32) {
    if margin * 2.0 >= extent {
        (extent * 0.5, extent * 0.5)
    } else {
        (margin, extent - margin)
    }
}

/// Scatters floating islands over the world.
pub struct FeatureInjector<'a> {
    params: &'a FeatureParams,
    extents: &'a WorldExtents,
    seed: u64,
}

impl<'a> FeatureInjector<'a> {
    pub fn new(params: &'a FeatureParams, extents: &'a WorldExtents, seeds: &GenerationSeeds) -> Self {
        Self { params, extents, seed: seeds.islands }
    }

    pub fn inject(&self) -> Vec<FloatingIsland> {
        let mut rng = stage_rng(self.seed);
        let (x_lo, x_hi) = axis_range(self.extents.width, self.params.margin);
        let (z_lo, z_hi) = axis_range(self.extents.length, self.params.margin);
        let (min_size, max_size) = (self.params.min_size, self.params.max_size);

        let islands: Vec<FloatingIsland> = (0..self.params.count)
            .map(|_| {
                let center = Vec3::new(
                    rng.gen_range(x_lo..=x_hi),
                    rng.gen_range(self.params.min_height..=self.params.max_height),
                    rng.gen_range(z_lo..=z_hi),
                );
                let size = Vec3::new(
                    rng.gen_range(min_size.x..=max_size.x),
                    rng.gen_range(min_size.y..=max_size.y),
                    rng.gen_range(min_size.z..=max_size.z),
                );
                FloatingIsland { center, size }
            })
            .collect();

        let overlapping = islands.iter().enumerate()
            .map(|(i, a)| islands[i + 1..].iter().filter(|b| a.bounds().intersects(&b.bounds())).count())
            .sum::<usize>();
        log::debug!("Injected {} floating islands ({} overlapping pairs)", islands.len(), overlapping);
        islands
    }
}
