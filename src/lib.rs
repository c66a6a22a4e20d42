//! Stylterra - deterministic stylized terrain generation
//!
//! A validated [`generation::GenerationConfig`] drives a single forward pass
//! that synthesizes a heightfield, classifies slopes, composites splat
//! weights and places vegetation. See [`generation::GenerationPipeline`].

pub mod core;
pub mod math;
pub mod terrain;
pub mod generation;
pub mod export;
