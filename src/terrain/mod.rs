//! Heightfield synthesis and classification stages

pub mod seed;
pub mod generator;
pub mod curve;
pub mod normalize;
pub mod extents;
pub mod slope;

pub use seed::GenerationSeeds;
pub use generator::{NoiseFieldGenerator, NoiseParams, RawHeightfield};
pub use curve::HeightCurve;
pub use normalize::HeightNormalizer;
pub use extents::WorldExtents;
pub use slope::SlopeClassifier;

use crate::math::Grid;

/// Normalized elevation grid, every cell in [0, 1]
pub type Heightfield = Grid<f32>;

/// Per-cell steepness in degrees, [0, 90]
pub type SlopeGrid = Grid<f32>;
