//! Multi-octave noise heightfield synthesis

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::seed::{stage_rng, GenerationSeeds};
use crate::core::ConfigError;
use crate::math::Grid;

/// Octave offsets are drawn from [-OFFSET_RANGE, OFFSET_RANGE).
const OFFSET_RANGE: i32 = 100_000;

/// Parameters controlling noise synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub scale: f32,       // Sample spacing per cell (smaller = smoother)
    pub octaves: u32,     // FBM octaves (detail levels)
    pub persistence: f32, // Amplitude decay per octave, (0, 1]
    pub lacunarity: f32,  // Frequency growth per octave, >= 1
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 0.01,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::NoOctaves);
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::NoiseScale(self.scale));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 || self.persistence > 1.0 {
            return Err(ConfigError::Persistence(self.persistence));
        }
        if !self.lacunarity.is_finite() || self.lacunarity < 1.0 {
            return Err(ConfigError::Lacunarity(self.lacunarity));
        }
        Ok(())
    }
}

/// Unnormalized synthesis output with its value range.
#[derive(Clone, Debug)]
pub struct RawHeightfield {
    pub values: Grid<f32>,
    pub min: f32,
    pub max: f32,
}

impl RawHeightfield {
    /// True when every cell holds the same value.
    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }
}

/// Fractal noise generator: a seeded Perlin basis summed over octaves, each
/// octave shifted by its own deterministic offset.
pub struct NoiseFieldGenerator {
    params: NoiseParams,
    noise: Perlin,
    offsets: Vec<(f64, f64)>,
}

impl NoiseFieldGenerator {
    /// Create a generator, rejecting invalid parameters before any sampling.
    pub fn new(params: NoiseParams, seeds: &GenerationSeeds) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut rng = stage_rng(seeds.octave_offsets);
        let offsets = (0..params.octaves)
            .map(|_| {
                let ox = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE);
                let oy = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE);
                (ox as f64, oy as f64)
            })
            .collect();

        Ok(Self {
            noise: Perlin::new(seeds.master),
            params,
            offsets,
        })
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Per-octave sampling offsets, in octave order.
    pub fn offsets(&self) -> &[(f64, f64)] {
        &self.offsets
    }

    /// Raw fractal value at grid cell (x, y).
    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        let scale = self.params.scale as f64;
        let persistence = self.params.persistence as f64;
        let lacunarity = self.params.lacunarity as f64;

        let mut amplitude = 1.0f64;
        let mut frequency = 1.0f64;
        let mut value = 0.0f64;
        for &(ox, oy) in &self.offsets {
            let sx = (x as f64 + ox) * scale * frequency;
            let sy = (y as f64 + oy) * scale * frequency;
            value += self.noise.get([sx, sy]) * amplitude;

            amplitude *= persistence;
            frequency *= lacunarity;
        }
        value as f32
    }

    /// Synthesize a `resolution × resolution` field, tracking min and max.
    pub fn generate(&self, resolution: usize) -> RawHeightfield {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let values = Grid::from_fn(resolution, |x, y| {
            let h = self.height_at(x, y);
            min = min.min(h);
            max = max.max(h);
            h
        });

        log::debug!(
            "Synthesized {}x{} field over {} octaves, raw range [{:.4}, {:.4}]",
            resolution, resolution, self.params.octaves, min, max
        );

        RawHeightfield { values, min, max }
    }
}
