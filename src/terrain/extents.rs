//! Mapping from grid-normalized coordinates to world space

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::core::ConfigError;
use super::seed::MAX_SAMPLE_SPAN;

/// World-space size of the generated terrain
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldExtents {
    pub width: f32,  // X extent
    pub length: f32, // Z extent
    pub height: f32, // Height of a normalized 1.0 cell
}

impl Default for WorldExtents {
    fn default() -> Self {
        Self {
            width: 2000.0,
            length: 2000.0,
            height: 600.0,
        }
    }
}

impl WorldExtents {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("width", self.width), ("length", self.length), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 || value > MAX_SAMPLE_SPAN {
                return Err(ConfigError::WorldExtent { axis, value });
            }
        }
        Ok(())
    }

    /// World position of normalized `(u, v)` at normalized height `h`.
    ///
    /// `u` runs along X, `v` along Z, height along Y.
    pub fn to_world(&self, u: f32, v: f32, h: f32) -> Vec3 {
        Vec3::new(u * self.width, h * self.height, v * self.length)
    }

    /// Inverse of [`to_world`](Self::to_world) on the ground plane.
    pub fn to_normalized(&self, world: Vec3) -> (f32, f32) {
        (world.x / self.width, world.z / self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_terrain_settings() {
        let e = WorldExtents::default();
        assert_eq!((e.width, e.length, e.height), (2000.0, 2000.0, 600.0));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_to_world() {
        let e = WorldExtents { width: 200.0, length: 500.0, height: 30.0 };
        assert_eq!(e.to_world(0.5, 0.1, 1.0), Vec3::new(100.0, 30.0, 50.0));
        assert_eq!(e.to_normalized(Vec3::new(100.0, 30.0, 50.0)), (0.5, 0.1));
    }

    #[test]
    fn test_non_positive_rejected() {
        let e = WorldExtents { length: 0.0, ..Default::default() };
        assert_eq!(e.validate(), Err(ConfigError::WorldExtent { axis: "length", value: 0.0 }));
        let e = WorldExtents { height: -1.0, ..Default::default() };
        assert!(e.validate().is_err());
        let e = WorldExtents { width: f32::INFINITY, ..Default::default() };
        assert!(e.validate().is_err());
        let e = WorldExtents { width: f32::MAX, ..Default::default() };
        assert!(e.validate().is_err());
    }
}
