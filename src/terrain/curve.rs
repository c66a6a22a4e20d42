//! Piecewise-linear height remap curve.
//!
//! [`HeightCurve`] maps a normalized height in [0, 1] to a new normalized
//! height. Keys are `(input, output)` pairs sorted by input; sampling between
//! keys interpolates linearly and sampling outside the keyed range holds the
//! nearest end key. The curve need not be monotonic.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Keyframe-based remap curve over [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
}

impl HeightCurve {
    /// Create a curve from unsorted keys. Keys are sorted by input.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// The identity mapping `y = x`.
    pub fn identity() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    /// Curve that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self { keys: vec![(0.0, value)] }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Reject curves that could push heights outside [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::Curve("curve has no keys".into()));
        }
        for &(x, y) in &self.keys {
            if !x.is_finite() || !y.is_finite() {
                return Err(ConfigError::Curve(format!("non-finite key ({}, {})", x, y)));
            }
            if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                return Err(ConfigError::Curve(format!("key ({}, {}) outside [0, 1]", x, y)));
            }
        }
        Ok(())
    }

    /// Evaluate the curve at `t`.
    pub fn sample(&self, t: f32) -> f32 {
        let Some(&(first_x, first_y)) = self.keys.first() else {
            return t;
        };
        if self.keys.len() == 1 || t <= first_x {
            return first_y;
        }

        // First key strictly past t
        match self.keys.iter().position(|k| k.0 > t) {
            Some(idx) => {
                let (x_a, y_a) = self.keys[idx - 1];
                let (x_b, y_b) = self.keys[idx];
                let span = x_b - x_a;
                if span < 1e-6 {
                    return y_b;
                }
                y_a + (y_b - y_a) * ((t - x_a) / span)
            }
            None => self.keys[self.keys.len() - 1].1,
        }
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl Serialize for HeightCurve {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HeightCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, f32)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}
