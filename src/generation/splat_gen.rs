//! Blend weight compositor: turns (height, slope) into per-layer splat weights.
//!
//! Each configured layer owns a rule producing a raw weight in [0, 1]. Raw
//! weights are normalized per cell so active cells sum to 1; cells where every
//! rule is inactive take the configured [`BlendFallback`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;
use crate::math::grid::normalized_coord;
use crate::terrain::{Heightfield, SlopeGrid};

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Raw weight function of (normalized height, slope in degrees).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerRule {
    /// Low, flat ground: `1 - 2h - s/90`
    Grass,
    /// Steep ground: `s/45`
    Rock,
    /// Mid heights: `h - s/90`
    Dirt,
    /// High ground: `(h - 0.7) * 3`
    Snow,
    /// Full weight inside a height band, fading out with slope
    HeightBand {
        min_height: f32,
        max_height: f32,
        max_slope: f32,
    },
}

impl LayerRule {
    /// Raw weight clamped to [0, 1].
    pub fn raw_weight(&self, height: f32, slope: f32) -> f32 {
        match *self {
            LayerRule::Grass => clamp01(1.0 - height * 2.0 - slope / 90.0),
            LayerRule::Rock => clamp01(slope / 45.0),
            LayerRule::Dirt => clamp01(height - slope / 90.0),
            LayerRule::Snow => clamp01((height - 0.7) * 3.0),
            LayerRule::HeightBand { min_height, max_height, max_slope } => {
                if height < min_height || height > max_height {
                    0.0
                } else {
                    clamp01(1.0 - slope / max_slope)
                }
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        if let LayerRule::HeightBand { min_height, max_height, max_slope } = *self {
            if !min_height.is_finite() || !max_height.is_finite() || !max_slope.is_finite() {
                return Err("height band has non-finite bounds".into());
            }
            if min_height > max_height {
                return Err(format!("height band [{}, {}] is inverted", min_height, max_height));
            }
            if max_slope <= 0.0 {
                return Err(format!("height band max slope must be positive, got {}", max_slope));
            }
        }
        Ok(())
    }
}

/// A named splat layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub name: String,
    pub rule: LayerRule,
}

impl LayerDefinition {
    pub fn new(name: impl Into<String>, rule: LayerRule) -> Self {
        Self { name: name.into(), rule }
    }

    /// grass, rock, dirt, snow
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::new("grass", LayerRule::Grass),
            Self::new("rock", LayerRule::Rock),
            Self::new("dirt", LayerRule::Dirt),
            Self::new("snow", LayerRule::Snow),
        ]
    }
}

/// What a cell gets when every raw weight is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendFallback {
    /// Full weight to the first configured layer
    #[default]
    FirstLayer,
    /// Full weight to the layer at this index
    Layer(usize),
    /// Equal weight to every layer
    Even,
}

/// Reject empty, unnamed, duplicated or malformed layer sets.
pub fn validate_layers(layers: &[LayerDefinition], fallback: BlendFallback) -> Result<(), ConfigError> {
    if layers.is_empty() {
        return Err(ConfigError::Layers("at least one layer is required".into()));
    }
    let mut seen = HashSet::new();
    for layer in layers {
        if layer.name.trim().is_empty() {
            return Err(ConfigError::Layers("layer names must not be empty".into()));
        }
        if !seen.insert(layer.name.as_str()) {
            return Err(ConfigError::Layers(format!("duplicate layer name '{}'", layer.name)));
        }
        layer.rule.validate()
            .map_err(|e| ConfigError::Layers(format!("layer '{}': {}", layer.name, e)))?;
    }
    if let BlendFallback::Layer(index) = fallback {
        if index >= layers.len() {
            return Err(ConfigError::Layers(format!(
                "fallback layer {} out of range for {} layers", index, layers.len()
            )));
        }
    }
    Ok(())
}

/// Per-cell weight vectors for L named layers, stored cell-major.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerWeightGrid {
    names: Vec<String>,
    side: usize,
    weights: Vec<f32>,
}

impl LayerWeightGrid {
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn layer_count(&self) -> usize {
        self.names.len()
    }

    pub fn layer_names(&self) -> &[String] {
        &self.names
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Weight vector of cell (x, y), one entry per layer in configured order.
    pub fn weights_at(&self, x: usize, y: usize) -> &[f32] {
        let l = self.names.len();
        let start = (y * self.side + x) * l;
        &self.weights[start..start + l]
    }

    /// Weight of one layer at cell (x, y).
    pub fn weight(&self, x: usize, y: usize, layer: usize) -> f32 {
        self.weights_at(x, y)[layer]
    }

    /// Index of the heaviest layer at cell (x, y); earlier layers win ties.
    pub fn dominant_layer(&self, x: usize, y: usize) -> usize {
        let w = self.weights_at(x, y);
        let mut best = 0;
        for i in 1..w.len() {
            if w[i] > w[best] {
                best = i;
            }
        }
        best
    }

    /// Raw cell-major weights (`L` floats per cell).
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}

/// Splat compositing result
#[derive(Clone, Debug)]
pub struct CompositeResult {
    pub weights: LayerWeightGrid,
    /// Cells resolved by the fallback policy
    pub zero_weight_cells: usize,
}

/// Computes normalized per-layer weights from height and slope.
pub struct BlendWeightCompositor<'a> {
    layers: &'a [LayerDefinition],
    fallback: BlendFallback,
}

impl<'a> BlendWeightCompositor<'a> {
    pub fn new(layers: &'a [LayerDefinition], fallback: BlendFallback) -> Self {
        Self { layers, fallback }
    }

    /// Write normalized weights for one cell into `out`.
    ///
    /// Returns `true` when every raw weight was zero and the fallback applied.
    pub fn blend(&self, height: f32, slope: f32, out: &mut [f32]) -> bool {
        let mut total = 0.0f32;
        for (w, layer) in out.iter_mut().zip(self.layers) {
            *w = layer.rule.raw_weight(height, slope);
            total += *w;
        }

        if total > 0.0 {
            for w in out.iter_mut() {
                *w /= total;
            }
            return false;
        }

        match self.fallback {
            BlendFallback::FirstLayer => out[0] = 1.0,
            BlendFallback::Layer(index) => out[index] = 1.0,
            BlendFallback::Even => {
                let even = 1.0 / out.len() as f32;
                out.iter_mut().for_each(|w| *w = even);
            }
        }
        true
    }

    /// Build a `resolution × resolution` weight grid over the heightfield.
    ///
    /// When the resolution differs from the heightfield, height and slope are
    /// sampled bilinearly at each weight cell's normalized position.
    pub fn composite(&self, heights: &Heightfield, slopes: &SlopeGrid, resolution: usize) -> CompositeResult {
        let l = self.layers.len();
        let same_grid = resolution == heights.side();
        let mut weights = vec![0.0f32; resolution * resolution * l];
        let mut zero_weight_cells = 0;

        for y in 0..resolution {
            for x in 0..resolution {
                let (h, s) = if same_grid {
                    (heights[(x, y)], slopes[(x, y)])
                } else {
                    let u = normalized_coord(x, resolution);
                    let v = normalized_coord(y, resolution);
                    (heights.sample_bilinear(u, v), slopes.sample_bilinear(u, v))
                };
                let start = (y * resolution + x) * l;
                if self.blend(h, s, &mut weights[start..start + l]) {
                    zero_weight_cells += 1;
                }
            }
        }

        log::debug!(
            "Composited {} layers at {}x{} ({} fallback cells)",
            l, resolution, resolution, zero_weight_cells
        );

        CompositeResult {
            weights: LayerWeightGrid {
                names: self.layers.iter().map(|layer| layer.name.clone()).collect(),
                side: resolution,
                weights,
            },
            zero_weight_cells,
        }
    }
}
