//! Terrain generation pipeline: one validated config in, plain data grids out.
//!
//! The pipeline runs a single forward pass:
//! 1. Noise synthesis (raw heightfield + min/max)
//! 2. Normalization (rescale, remap curve, plateau smoothing)
//! 3. Slope classification
//! 4. Splat weight compositing
//! 5. Ground cover and tree placement, then floating islands
//!
//! Runs hold no state between invocations; independent configs can be
//! generated in parallel with [`generate_batch`].

pub mod config;
pub mod splat_gen;
pub mod grass_gen;
pub mod tree_gen;
pub mod island_gen;

pub use config::GenerationConfig;
pub use splat_gen::{BlendFallback, BlendWeightCompositor, LayerDefinition, LayerRule, LayerWeightGrid};
pub use grass_gen::{GroundCoverDensityGrid, GroundCoverGenerator, GroundCoverParams};
pub use tree_gen::{TreeParams, TreePlacer, VegetationInstance};
pub use island_gen::{FeatureInjector, FeatureParams, FloatingIsland};

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::ConfigError;
use crate::terrain::{
    GenerationSeeds, Heightfield, HeightNormalizer, NoiseFieldGenerator, SlopeClassifier,
};

/// Forward-only pipeline states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Unconfigured,
    Validated,
    Synthesized,
    Normalized,
    Classified,
    Composited,
    Placed,
    Done,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Unconfigured => "unconfigured",
            PipelineStage::Validated => "validated",
            PipelineStage::Synthesized => "synthesized",
            PipelineStage::Normalized => "normalized",
            PipelineStage::Classified => "classified",
            PipelineStage::Composited => "composited",
            PipelineStage::Placed => "placed",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Degenerate inputs that were recovered from rather than rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// Raw noise had min == max; heights were set to a constant.
    FlatHeightfield,
    /// Splat cells where every layer rule was zero and the fallback applied.
    ZeroWeightCells { cells: usize },
    /// Tree acceptance band has no area; no sampling happened.
    EmptyTreeBand,
    /// Attempt cap hit before the requested tree count was reached.
    TreeQuotaUnmet { placed: usize, requested: usize, attempts: u32 },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::FlatHeightfield => write!(f, "flat heightfield"),
            GenerationWarning::ZeroWeightCells { cells } => {
                write!(f, "{} splat cells had no active layer", cells)
            }
            GenerationWarning::EmptyTreeBand => write!(f, "tree acceptance band is empty"),
            GenerationWarning::TreeQuotaUnmet { placed, requested, attempts } => write!(
                f, "placed {} of {} trees after {} attempts", placed, requested, attempts
            ),
        }
    }
}

/// Everything a run produces. Owned by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedTerrain {
    pub heightfield: Heightfield,
    pub layer_weights: LayerWeightGrid,
    /// One density grid per ground-cover layer
    pub ground_cover: Vec<GroundCoverDensityGrid>,
    pub trees: Vec<VegetationInstance>,
    pub islands: Vec<FloatingIsland>,
    pub warnings: Vec<GenerationWarning>,
}

/// Validated pipeline for one configuration.
pub struct GenerationPipeline {
    config: GenerationConfig,
    seeds: GenerationSeeds,
    noise: NoiseFieldGenerator,
}

impl GenerationPipeline {
    /// Validate the configuration. Fails before any grid is allocated.
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = config.seeds();
        let noise = NoiseFieldGenerator::new(config.noise.clone(), &seeds)?;
        Ok(Self { config, seeds, noise })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn seeds(&self) -> &GenerationSeeds {
        &self.seeds
    }

    pub fn run(&self) -> GeneratedTerrain {
        self.run_with(|_| {})
    }

    /// Run every stage, calling `observer` as each stage is entered.
    pub fn run_with(&self, mut observer: impl FnMut(PipelineStage)) -> GeneratedTerrain {
        let config = &self.config;
        let resolution = config.resolution as usize;
        let start = Instant::now();
        let mut warnings = Vec::new();

        let mut enter = |stage: PipelineStage| {
            log::debug!("Pipeline stage: {}", stage);
            observer(stage);
        };
        enter(PipelineStage::Validated);

        // 1. Synthesis
        let raw = self.noise.generate(resolution);
        enter(PipelineStage::Synthesized);

        // 2. Normalization
        if raw.is_flat() {
            warnings.push(GenerationWarning::FlatHeightfield);
        }
        let heightfield = HeightNormalizer::new(config.height_curve.clone()).normalize(&raw);
        drop(raw);
        enter(PipelineStage::Normalized);

        // 3. Slope
        let slopes = SlopeClassifier::new(&config.world, resolution).classify(&heightfield);
        enter(PipelineStage::Classified);

        // 4. Splat weights
        let composite = BlendWeightCompositor::new(&config.layers, config.blend_fallback)
            .composite(&heightfield, &slopes, config.splat_resolution() as usize);
        if composite.zero_weight_cells > 0 {
            log::warn!(
                "{} splat cells had no active layer; applied {:?}",
                composite.zero_weight_cells, config.blend_fallback
            );
            warnings.push(GenerationWarning::ZeroWeightCells { cells: composite.zero_weight_cells });
        }
        enter(PipelineStage::Composited);

        // 5. Placement
        let ground_cover = GroundCoverGenerator::new(&config.ground_cover, &self.seeds)
            .generate(&heightfield, &slopes);

        let placement = TreePlacer::new(&config.trees, &self.seeds).place(&heightfield, &slopes);
        let requested = config.trees.count as usize;
        if placement.band_empty {
            warnings.push(GenerationWarning::EmptyTreeBand);
        } else if placement.instances.len() < requested {
            log::warn!(
                "Tree quota unmet: placed {} of {} after {} attempts",
                placement.instances.len(), requested, placement.attempts
            );
            warnings.push(GenerationWarning::TreeQuotaUnmet {
                placed: placement.instances.len(),
                requested,
                attempts: placement.attempts,
            });
        }

        let islands = if config.features.enabled {
            FeatureInjector::new(&config.features, &config.world, &self.seeds).inject()
        } else {
            Vec::new()
        };
        enter(PipelineStage::Placed);

        let elapsed = start.elapsed();
        log::info!(
            "Generated {}x{} terrain (seed {}) in {:.2}s: {} trees, {} islands, {} warnings",
            resolution, resolution, config.seed, elapsed.as_secs_f64(),
            placement.instances.len(), islands.len(), warnings.len()
        );
        enter(PipelineStage::Done);

        GeneratedTerrain {
            heightfield,
            layer_weights: composite.weights,
            ground_cover,
            trees: placement.instances,
            islands,
            warnings,
        }
    }
}

/// Validate and run a single configuration.
pub fn generate(config: &GenerationConfig) -> Result<GeneratedTerrain, ConfigError> {
    Ok(GenerationPipeline::new(config.clone())?.run())
}

/// Run independent configurations in parallel.
///
/// Results are in input order and identical to running each config alone.
pub fn generate_batch(configs: &[GenerationConfig]) -> Vec<Result<GeneratedTerrain, ConfigError>> {
    log::info!("Generating {} terrains...", configs.len());
    let start = Instant::now();

    let results: Vec<_> = configs.par_iter().map(generate).collect();

    let elapsed = start.elapsed();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    log::info!(
        "Generated {} of {} terrains in {:.1}s",
        ok, configs.len(), elapsed.as_secs_f64()
    );

    results
}
