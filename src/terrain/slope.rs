//! Per-cell steepness from the normalized heightfield

use super::{Heightfield, SlopeGrid};
use super::extents::WorldExtents;

/// Steepness in degrees for a world-space height gradient, clamped to [0, 90].
///
/// Uses `libm` so the result does not depend on the platform's libc.
pub fn steepness_degrees(dh_dx: f32, dh_dy: f32) -> f32 {
    let magnitude = libm::sqrt((dh_dx as f64) * (dh_dx as f64) + (dh_dy as f64) * (dh_dy as f64));
    let degrees = libm::atan(magnitude).to_degrees();
    (degrees as f32).clamp(0.0, 90.0)
}

/// Finite-difference slope estimator.
///
/// Heights are scaled by the world max height and differences divided by the
/// world-space cell spacing, so the result is a true terrain angle.
#[derive(Clone, Copy, Debug)]
pub struct SlopeClassifier {
    max_height: f32,
    spacing_x: f32,
    spacing_y: f32,
}

impl SlopeClassifier {
    /// Classifier for an R×R heightfield spanning `extents`.
    pub fn new(extents: &WorldExtents, resolution: usize) -> Self {
        let cells = resolution.saturating_sub(1).max(1) as f32;
        Self {
            max_height: extents.height,
            spacing_x: extents.width / cells,
            spacing_y: extents.length / cells,
        }
    }

    /// Height difference along one axis: central inside, one-sided at the edges.
    #[inline]
    fn difference(h_prev: Option<f32>, h: f32, h_next: Option<f32>, spacing: f32) -> f32 {
        match (h_prev, h_next) {
            (Some(p), Some(n)) => (n - p) / (2.0 * spacing),
            (None, Some(n)) => (n - h) / spacing,
            (Some(p), None) => (h - p) / spacing,
            (None, None) => 0.0,
        }
    }

    /// Slope in degrees at cell (x, y).
    pub fn slope_at(&self, heights: &Heightfield, x: usize, y: usize) -> f32 {
        let h = heights[(x, y)];
        let left = x.checked_sub(1).map(|xi| heights[(xi, y)]);
        let right = heights.get(x + 1, y).copied();
        let down = y.checked_sub(1).map(|yi| heights[(x, yi)]);
        let up = heights.get(x, y + 1).copied();

        let dh_dx = Self::difference(left, h, right, self.spacing_x) * self.max_height;
        let dh_dy = Self::difference(down, h, up, self.spacing_y) * self.max_height;
        steepness_degrees(dh_dx, dh_dy)
    }

    pub fn classify(&self, heights: &Heightfield) -> SlopeGrid {
        let slopes = SlopeGrid::from_fn(heights.side(), |x, y| self.slope_at(heights, x, y));
        log::debug!(
            "Classified slopes for {}x{} field (spacing {:.3} x {:.3}, max height {})",
            heights.side(), heights.side(), self.spacing_x, self.spacing_y, self.max_height
        );
        slopes
    }
}
