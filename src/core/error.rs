//! Error types for terrain generation

use thiserror::Error;

/// Fatal configuration problems, detected before any grid is allocated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("octave count must be at least 1")]
    NoOctaves,

    #[error("{name} resolution must be greater than 1, got {value}")]
    Resolution { name: &'static str, value: u32 },

    #[error("world {axis} must be positive and finite, got {value}")]
    WorldExtent { axis: &'static str, value: f32 },

    #[error("noise scale must be positive and finite, got {0}")]
    NoiseScale(f32),

    #[error("persistence must lie in (0, 1], got {0}")]
    Persistence(f32),

    #[error("lacunarity must be at least 1, got {0}")]
    Lacunarity(f32),

    #[error("height curve: {0}")]
    Curve(String),

    #[error("layer definitions: {0}")]
    Layers(String),

    #[error("vegetation: {0}")]
    Vegetation(String),

    #[error("features: {0}")]
    Features(String),
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export error: {0}")]
    Image(#[from] image::ImageError),
}
