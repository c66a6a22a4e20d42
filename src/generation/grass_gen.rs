//! Ground-cover density generator: builds one density grid per detail layer.
//!
//! Cells on low, gentle ground are gated in; a low-frequency noise then carves
//! natural clearings, and surviving cells get a random density level.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::ConfigError;
use crate::math::grid::normalized_coord;
use crate::math::Grid;
use crate::terrain::seed::{stage_rng, GenerationSeeds};
use crate::terrain::{Heightfield, SlopeGrid};

/// Density levels per cell, 0 = no ground cover
pub type GroundCoverDensityGrid = Grid<u8>;

/// Parameters controlling ground-cover placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundCoverParams {
    /// Side length of each density grid, independent of the heightfield
    pub resolution: u32,
    /// Number of detail layers (one grid each)
    pub layers: u32,
    /// Cover only grows below this normalized height
    pub max_height: f32,
    /// Cover only grows below this slope (degrees)
    pub max_slope: f32,
    /// Coverage noise frequency in cycles per cell
    pub noise_frequency: f32,
    /// Coverage noise in [0, 1] must exceed this
    pub noise_threshold: f32,
    /// Highest density level; levels are drawn from 1..=max_density
    pub max_density: u8,
}

impl Default for GroundCoverParams {
    fn default() -> Self {
        Self {
            resolution: 1024,
            layers: 1,
            max_height: 0.5,
            max_slope: 30.0,
            noise_frequency: 0.05,
            noise_threshold: 0.3,
            max_density: 3,
        }
    }
}

impl GroundCoverParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution <= 1 {
            return Err(ConfigError::Resolution { name: "ground cover", value: self.resolution });
        }
        if self.layers == 0 {
            return Err(ConfigError::Vegetation("at least one ground cover layer is required".into()));
        }
        if self.max_density == 0 {
            return Err(ConfigError::Vegetation("ground cover max density must be at least 1".into()));
        }
        if !self.noise_frequency.is_finite() || self.noise_frequency <= 0.0 {
            return Err(ConfigError::Vegetation(format!(
                "ground cover noise frequency must be positive, got {}", self.noise_frequency
            )));
        }
        if !self.noise_threshold.is_finite() || !self.max_height.is_finite() || !self.max_slope.is_finite() {
            return Err(ConfigError::Vegetation("ground cover thresholds must be finite".into()));
        }
        Ok(())
    }
}

/// Procedural ground-cover generator.
pub struct GroundCoverGenerator<'a> {
    params: &'a GroundCoverParams,
    noise: Perlin,
    seed: u64,
}

impl<'a> GroundCoverGenerator<'a> {
    pub fn new(params: &'a GroundCoverParams, seeds: &GenerationSeeds) -> Self {
        Self {
            params,
            noise: Perlin::new(seeds.ground_cover_noise),
            seed: seeds.ground_cover,
        }
    }

    /// Terrain gate: low and gentle enough for cover.
    #[inline]
    pub fn gate(&self, height: f32, slope: f32) -> bool {
        height < self.params.max_height && slope < self.params.max_slope
    }

    /// Smooth coverage noise in [0, 1] at detail cell (x, y).
    pub fn coverage(&self, x: usize, y: usize) -> f32 {
        let f = self.params.noise_frequency as f64;
        let n = self.noise.get([x as f64 * f, y as f64 * f]) as f32;
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Cells where cover may grow: terrain gate and coverage noise both pass.
    pub fn eligibility(&self, heights: &Heightfield, slopes: &SlopeGrid) -> Grid<bool> {
        let res = self.params.resolution as usize;
        Grid::from_fn(res, |x, y| {
            let u = normalized_coord(x, res);
            let v = normalized_coord(y, res);
            self.gate(heights.sample_bilinear(u, v), slopes.sample_bilinear(u, v))
                && self.coverage(x, y) > self.params.noise_threshold
        })
    }

    /// Build every ground-cover layer. Layers share eligibility and draw
    /// their own density levels in layer order.
    pub fn generate(&self, heights: &Heightfield, slopes: &SlopeGrid) -> Vec<GroundCoverDensityGrid> {
        let eligible = self.eligibility(heights, slopes);
        let mut rng = stage_rng(self.seed);
        let max_density = self.params.max_density;

        let grids: Vec<GroundCoverDensityGrid> = (0..self.params.layers)
            .map(|_| {
                Grid::from_fn(eligible.side(), |x, y| {
                    if eligible[(x, y)] {
                        rng.gen_range(1..=max_density)
                    } else {
                        0
                    }
                })
            })
            .collect();

        let covered = eligible.iter().filter(|&&e| e).count();
        log::debug!(
            "Ground cover: {} layers at {}x{}, {} of {} cells covered",
            grids.len(), eligible.side(), eligible.side(), covered, eligible.len()
        );

        grids
    }
}
