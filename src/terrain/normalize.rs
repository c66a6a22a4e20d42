//! Height normalization, remapping and plateau smoothing.
//!
//! Heights leave this stage in [0, 1] and are never altered afterwards.

use super::curve::HeightCurve;
use super::generator::RawHeightfield;
use super::Heightfield;

/// Lower edge of the open plateau band
pub const PLATEAU_LOW: f32 = 0.6;
/// Upper edge of the open plateau band
pub const PLATEAU_HIGH: f32 = 0.7;
/// Height that plateau values are pulled toward
pub const PLATEAU_TARGET: f32 = 0.65;
/// Interpolation factor toward the plateau target
pub const PLATEAU_PULL: f32 = 0.5;

/// Constant output when the raw field has no range
pub const FLAT_HEIGHT: f32 = 0.5;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    (v - a) / (b - a)
}

/// Pull values inside the open band (0.6, 0.7) halfway toward 0.65, forming mesas.
#[inline]
pub fn plateau(v: f32) -> f32 {
    if v > PLATEAU_LOW && v < PLATEAU_HIGH {
        lerp(v, PLATEAU_TARGET, PLATEAU_PULL)
    } else {
        v
    }
}

/// Rescales a raw field to [0, 1] and applies the stylized remap.
#[derive(Clone, Debug, Default)]
pub struct HeightNormalizer {
    curve: Option<HeightCurve>,
}

impl HeightNormalizer {
    pub fn new(curve: Option<HeightCurve>) -> Self {
        Self { curve }
    }

    /// Remap a single already-rescaled value: curve, then plateau.
    pub fn remap(&self, normalized: f32) -> f32 {
        let curved = match &self.curve {
            Some(curve) => curve.sample(normalized),
            None => normalized,
        };
        plateau(curved).clamp(0.0, 1.0)
    }

    pub fn normalize(&self, raw: &RawHeightfield) -> Heightfield {
        if raw.is_flat() {
            log::warn!(
                "Raw heightfield is flat (min == max == {}); using constant {}",
                raw.min, FLAT_HEIGHT
            );
            return raw.values.map(|_| self.remap(FLAT_HEIGHT));
        }

        raw.values
            .map(|&v| self.remap(inverse_lerp(raw.min, raw.max, v).clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Grid;

    fn raw_from(values: Grid<f32>) -> RawHeightfield {
        let (min, max) = values.min_max();
        RawHeightfield { values, min, max }
    }

    #[test]
    fn test_rescales_to_unit_range() {
        let raw = raw_from(Grid::from_fn(4, |x, y| x as f32 * 3.0 - y as f32 * 2.0 - 7.0));
        let field = HeightNormalizer::default().normalize(&raw);
        assert!(field.iter().all(|&h| (0.0..=1.0).contains(&h)));
        // Extremes map to the ends (neither end is in the plateau band)
        assert_eq!(field[(3, 0)], 1.0);
        assert_eq!(field[(0, 3)], 0.0);
    }

    #[test]
    fn test_flat_field_is_half() {
        let raw = raw_from(Grid::filled(5, -0.25));
        assert!(raw.is_flat());
        let field = HeightNormalizer::default().normalize(&raw);
        assert!(field.iter().all(|&h| h == 0.5));
    }

    #[test]
    fn test_plateau_law() {
        for i in 1..100 {
            let v = PLATEAU_LOW + (PLATEAU_HIGH - PLATEAU_LOW) * i as f32 / 100.0;
            let p = plateau(v);
            if (v - PLATEAU_TARGET).abs() < 1e-6 {
                assert!((p - PLATEAU_TARGET).abs() < 1e-6);
            } else {
                let (lo, hi) = if v < PLATEAU_TARGET { (v, PLATEAU_TARGET) } else { (PLATEAU_TARGET, v) };
                assert!(p > lo && p < hi, "plateau({}) = {}", v, p);
            }
        }
        assert_eq!(plateau(0.65), 0.65);
    }

    #[test]
    fn test_plateau_leaves_outside_band() {
        for v in [0.0, 0.3, 0.6, 0.7, 0.85, 1.0] {
            assert_eq!(plateau(v), v);
        }
    }

    #[test]
    fn test_curve_applied_before_plateau() {
        // Curve maps everything to 0.62, which then falls in the plateau band
        let normalizer = HeightNormalizer::new(Some(HeightCurve::constant(0.62)));
        assert!((normalizer.remap(0.1) - 0.635).abs() < 1e-6);

        let squash = HeightNormalizer::new(Some(HeightCurve::new(vec![(0.0, 0.0), (1.0, 0.5)])));
        assert!((squash.remap(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_curve_is_pointwise() {
        let raw = raw_from(Grid::from_fn(8, |x, y| ((x * 7 + y * 3) % 11) as f32));
        let normalizer = HeightNormalizer::new(Some(HeightCurve::new(vec![(0.0, 1.0), (1.0, 0.0)])));
        let field = normalizer.normalize(&raw);
        for y in 0..8 {
            for x in 0..8 {
                let t = (raw.values[(x, y)] - raw.min) / (raw.max - raw.min);
                assert_eq!(field[(x, y)], normalizer.remap(t));
            }
        }
    }
}
