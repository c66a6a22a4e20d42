//! Generation configuration: every input of a pipeline run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::grass_gen::GroundCoverParams;
use super::island_gen::FeatureParams;
use super::splat_gen::{validate_layers, BlendFallback, LayerDefinition};
use super::tree_gen::TreeParams;
use crate::core::types::Result;
use crate::core::ConfigError;
use crate::terrain::{GenerationSeeds, HeightCurve, NoiseParams, WorldExtents};

/// Configuration for the terrain generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Master seed; every stage derives its own stream from it.
    pub seed: u32,
    /// Heightfield side length in cells.
    pub resolution: u32,
    pub world: WorldExtents,
    pub noise: NoiseParams,
    /// Remap applied after normalization (identity when absent).
    pub height_curve: Option<HeightCurve>,
    /// Ordered splat layers.
    pub layers: Vec<LayerDefinition>,
    pub blend_fallback: BlendFallback,
    /// Splat map side length, defaults to `resolution`.
    pub splat_resolution: Option<u32>,
    pub ground_cover: GroundCoverParams,
    pub trees: TreeParams,
    pub features: FeatureParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            resolution: 513,
            world: WorldExtents::default(),
            noise: NoiseParams::default(),
            height_curve: None,
            layers: LayerDefinition::standard_set(),
            blend_fallback: BlendFallback::default(),
            splat_resolution: None,
            ground_cover: GroundCoverParams::default(),
            trees: TreeParams::default(),
            features: FeatureParams::default(),
        }
    }
}

impl GenerationConfig {
    /// Default configuration with a different master seed.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed, ..Default::default() }
    }

    /// Effective splat map side length.
    pub fn splat_resolution(&self) -> u32 {
        self.splat_resolution.unwrap_or(self.resolution)
    }

    pub fn seeds(&self) -> GenerationSeeds {
        GenerationSeeds::from_master(self.seed)
    }

    /// Check every invariant. Nothing is allocated before this passes.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.resolution <= 1 {
            return Err(ConfigError::Resolution { name: "heightfield", value: self.resolution });
        }
        if self.splat_resolution() <= 1 {
            return Err(ConfigError::Resolution { name: "splat", value: self.splat_resolution() });
        }
        self.noise.validate()?;
        self.world.validate()?;
        if let Some(curve) = &self.height_curve {
            curve.validate()?;
        }
        validate_layers(&self.layers, self.blend_fallback)?;
        self.ground_cover.validate()?;
        self.trees.validate()?;
        self.features.validate()?;
        Ok(())
    }

    /// Save as pretty-printed JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON and validate. Missing fields take their defaults.
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::generation::splat_gen::LayerRule;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.seed, 12345);
        assert_eq!(config.resolution, 513);
        assert_eq!(config.splat_resolution(), 513);
        assert_eq!(config.noise.octaves, 4);
        assert_eq!(config.world.width, 2000.0);
        assert_eq!(config.world.height, 600.0);
        assert_eq!(config.ground_cover.resolution, 1024);
        assert_eq!(config.trees.count, 100);
        assert_eq!(config.layers.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = GenerationConfig::default();
        config.noise.octaves = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoOctaves));

        let config = GenerationConfig { resolution: 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Resolution { name: "heightfield", .. })));

        let config = GenerationConfig { splat_resolution: Some(0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Resolution { name: "splat", .. })));

        let mut config = GenerationConfig::default();
        config.world.length = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::WorldExtent { axis: "length", .. })));

        let config = GenerationConfig { layers: Vec::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Layers(_))));

        let config = GenerationConfig {
            height_curve: Some(HeightCurve::new(vec![(0.0, 0.0), (1.5, 1.0)])),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Curve(_))));

        let mut config = GenerationConfig::default();
        config.features.min_height = 500.0;
        assert!(matches!(config.validate(), Err(ConfigError::Features(_))));
    }

    #[test]
    fn test_overflowing_ranges_fail_validation_not_generation() {
        let mut config = GenerationConfig::default();
        config.resolution = 17;
        config.ground_cover.resolution = 16;
        config.features.enabled = true;
        config.features.min_height = -f32::MAX;
        config.features.max_height = f32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Features(_))));
        assert!(matches!(crate::generation::generate(&config), Err(ConfigError::Features(_))));

        let mut config = GenerationConfig::default();
        config.trees.max_scale = f32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Vegetation(_))));
    }

    #[test]
    fn test_json_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("terrain.json");

        let mut config = GenerationConfig::with_seed(777);
        config.height_curve = Some(HeightCurve::new(vec![(0.0, 0.0), (0.5, 0.3), (1.0, 1.0)]));
        config.layers.push(LayerDefinition::new(
            "meadow",
            LayerRule::HeightBand { min_height: 0.2, max_height: 0.4, max_slope: 20.0 },
        ));
        config.blend_fallback = BlendFallback::Even;
        config.features.enabled = true;

        config.save_json(&path).unwrap();
        let loaded = GenerationConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "seed": 9, "noise": { "octaves": 6 } }"#).unwrap();

        let config = GenerationConfig::load_json(&path).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.noise.octaves, 6);
        assert_eq!(config.noise.scale, 0.01);
        assert_eq!(config.resolution, 513);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "noise": { "octaves": 0 } }"#).unwrap();
        assert!(matches!(
            GenerationConfig::load_json(&path),
            Err(Error::Config(ConfigError::NoOctaves))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(GenerationConfig::load_json(&path), Err(Error::Json(_))));
    }
}
