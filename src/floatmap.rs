//! Square float grids with a declared value range
//!
//! `FloatMap` is the unit of data the whole pipeline works on. The declared
//! `(min, max)` pair describes the intended bounds of the samples; it is only
//! enforced when `clamp_to_range` is called. Transforms rebuild the sample
//! buffer wholesale; only single-cell writes and `add_within_range` mutate
//! cells in place.

use crate::error::{MapGenError, Result};
use crate::point::Point;
use crate::tilemap::Tilemap;

/// A `size`×`size` grid of f32 samples tagged with a declared range.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatMap {
    min: f32,
    max: f32,
    cells: Tilemap<f32>,
}

impl FloatMap {
    /// All-zero grid with the given declared range.
    pub fn new(min: f32, max: f32, size: usize) -> Self {
        Self {
            min,
            max,
            cells: Tilemap::new_with(size, size, 0.0),
        }
    }

    /// Grid whose samples are `f(x, y)`, evaluated in parallel.
    pub fn from_fn<F>(min: f32, max: f32, size: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f32 + Sync + Send,
    {
        Self {
            min,
            max,
            cells: Tilemap::from_fn(size, size, f),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.width
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Replace the declared range without touching any sample.
    pub fn set_range(&mut self, min: f32, max: f32) {
        self.min = min;
        self.max = max;
    }

    /// Row-major samples.
    pub fn values(&self) -> &[f32] {
        self.cells.as_slice()
    }

    pub fn get(&self, x: usize, y: usize) -> Result<f32> {
        self.cells
            .try_get(x, y)
            .copied()
            .ok_or_else(|| self.index_error(x as i64, y as i64))
    }

    pub fn get_point(&self, p: Point) -> Result<f32> {
        if !self.cells.in_bounds(p.x as i64, p.y as i64) {
            return Err(self.index_error(p.x as i64, p.y as i64));
        }
        self.get(p.x as usize, p.y as usize)
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) -> Result<()> {
        if x >= self.size() || y >= self.size() {
            return Err(self.index_error(x as i64, y as i64));
        }
        self.cells.set(x, y, value);
        Ok(())
    }

    fn index_error(&self, x: i64, y: i64) -> MapGenError {
        MapGenError::Index {
            x,
            y,
            width: self.cells.width,
            height: self.cells.height,
        }
    }

    fn ensure_same_size(&self, other: &FloatMap, op: &str) -> Result<()> {
        if self.size() != other.size() {
            return Err(MapGenError::config(format!(
                "{} needs equal sizes, got {} and {}",
                op,
                self.size(),
                other.size()
            )));
        }
        Ok(())
    }

    // =========================================================================
    // RANGE TRANSFORMS
    // =========================================================================

    /// Linearly remap every sample from the declared range onto `[new_min, new_max]`
    /// and adopt the new range.
    ///
    /// A degenerate declared range (`min == max`) has no linear remap and is
    /// reported as a configuration error instead of producing NaN/Infinity.
    pub fn rescale_to(&mut self, new_min: f32, new_max: f32) -> Result<()> {
        let (min, max) = (self.min, self.max);
        if !(min.is_finite() && max.is_finite()) || min == max {
            return Err(MapGenError::config(format!(
                "cannot rescale from degenerate range [{}, {}]",
                min, max
            )));
        }
        let span = max - min;
        let target = new_max - new_min;
        self.cells = self.cells.map(|&v| target * (v - min) / span + new_min);
        self.min = new_min;
        self.max = new_max;
        Ok(())
    }

    /// Reflect every sample about the declared maximum: `v -> max - v`.
    /// For a `[0, 1]` range this is the usual `1 - v`.
    pub fn invert(&mut self) {
        let max = self.max;
        self.cells = self.cells.map(|&v| max - v);
    }

    /// Force every sample into the declared range. Irreversible.
    pub fn clamp_to_range(&mut self) {
        let (min, max) = (self.min, self.max);
        self.cells = self.cells.map(|&v| {
            if v > max {
                max
            } else if v < min {
                min
            } else {
                v
            }
        });
    }

    /// Add `delta` to each sample whose current value lies in `[lo, hi]`.
    pub fn add_within_range(&mut self, delta: f32, lo: f32, hi: f32) {
        self.cells.for_each_mut(|v| {
            if *v >= lo && *v <= hi {
                *v += delta;
            }
        });
    }

    // =========================================================================
    // BLENDS
    // =========================================================================

    /// Elementwise product. The declared range is left as is.
    pub fn multiply_blend(&mut self, other: &FloatMap) -> Result<()> {
        self.ensure_same_size(other, "multiply blend")?;
        self.cells = self.cells.zip_map(&other.cells, |a, b| a * b);
        Ok(())
    }

    /// Elementwise product where a zero means "no data": when exactly one side
    /// is zero the other side is kept untouched.
    ///
    /// Used to merge landmass masks without one mask's empty ocean erasing the
    /// other's land.
    pub fn blend_zero_as_absent(&mut self, other: &FloatMap) -> Result<()> {
        self.ensure_same_size(other, "zero-as-absent blend")?;
        self.cells = self.cells.zip_map(&other.cells, |&a, &b| match (a == 0.0, b == 0.0) {
            (true, true) => 0.0,
            (true, false) => b,
            (false, true) => a,
            (false, false) => a * b,
        });
        Ok(())
    }

    /// Elementwise blend where a nonzero operand always beats a zero one;
    /// two nonzero operands multiply.
    pub fn blend_prefer_nonzero(&mut self, other: &FloatMap) -> Result<()> {
        self.ensure_same_size(other, "prefer-nonzero blend")?;
        self.cells = self.cells.zip_map(&other.cells, |&a, &b| {
            if b == 0.0 {
                a
            } else if a == 0.0 {
                b
            } else {
                a * b
            }
        });
        Ok(())
    }

    // =========================================================================
    // LOCAL SMOOTHING
    // =========================================================================

    /// Pull samples toward their neighbourhood mean.
    ///
    /// Disc centers are laid out every `spacing` cells starting at `spacing`.
    /// Discs are processed one after another (column-major over centers), each
    /// reading the values left by the previous ones. A member at distance `d`
    /// moves toward the disc mean by `min(tolerance, |v - mean|) * (1 - d/radius)`.
    ///
    /// Fails with `MapGenError::Range` as soon as an adjustment leaves `[0, 1]`,
    /// which means tolerance and radius do not suit the data. Cells already
    /// processed keep their new values.
    pub fn local_smooth(&mut self, radius: usize, spacing: usize, tolerance: f32) -> Result<()> {
        if radius == 0 || spacing == 0 {
            return Err(MapGenError::config(format!(
                "smoothing needs positive radius and spacing, got radius={} spacing={}",
                radius, spacing
            )));
        }

        let size = self.size();
        let r = radius as i64;
        let radius_f = radius as f32;

        for cx in (spacing..size).step_by(spacing) {
            for cy in (spacing..size).step_by(spacing) {
                let center = Point::new(cx as i32, cy as i32);

                let mut disc = Vec::new();
                for x in (cx as i64 - r).max(0)..=(cx as i64 + r).min(size as i64 - 1) {
                    for y in (cy as i64 - r).max(0)..=(cy as i64 + r).min(size as i64 - 1) {
                        let p = Point::new(x as i32, y as i32);
                        let d = p.distance(center);
                        if d <= radius_f {
                            disc.push((x as usize, y as usize, d));
                        }
                    }
                }

                let mean = disc
                    .iter()
                    .map(|&(x, y, _)| *self.cells.get(x, y))
                    .sum::<f32>()
                    / disc.len() as f32;

                for (x, y, d) in disc {
                    let val = *self.cells.get(x, y);
                    let deviation = val - mean;
                    let falloff = 1.0 - d / radius_f;
                    let adjustment = tolerance.min(deviation.abs()) * falloff;

                    if !(0.0..=1.0).contains(&adjustment) {
                        return Err(MapGenError::Range { x, y, adjustment });
                    }

                    if deviation > 0.0 {
                        self.cells.set(x, y, val - adjustment);
                    } else if deviation < 0.0 {
                        self.cells.set(x, y, val + adjustment);
                    }
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// NON-MUTATING BLENDS
// =============================================================================

/// `a * w1 + b * w2`, sized and ranged like `a`.
pub fn weighted_blend(a: &FloatMap, b: &FloatMap, w1: f32, w2: f32) -> Result<FloatMap> {
    a.ensure_same_size(b, "weighted blend")?;
    Ok(FloatMap {
        min: a.min,
        max: a.max,
        cells: a.cells.zip_map(&b.cells, |p, q| p * w1 + q * w2),
    })
}

/// Elementwise product of two grids sharing size and declared range.
pub fn multiply(a: &FloatMap, b: &FloatMap) -> Result<FloatMap> {
    a.ensure_same_size(b, "multiply")?;
    if a.min != b.min || a.max != b.max {
        return Err(MapGenError::config(format!(
            "multiply needs equal ranges, got [{}, {}] and [{}, {}]",
            a.min, a.max, b.min, b.max
        )));
    }
    Ok(FloatMap {
        min: a.min,
        max: a.max,
        cells: a.cells.zip_map(&b.cells, |p, q| p * q),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(size: usize) -> FloatMap {
        FloatMap::from_fn(0.0, 1.0, size, |x, y| (x + y) as f32 / (2 * (size - 1)) as f32)
    }

    #[test]
    fn test_new_is_all_zero() {
        let map = FloatMap::new(-1.0, 1.0, 8);
        assert_eq!(map.size(), 8);
        assert!(map.values().iter().all(|&v| v == 0.0));
        assert_eq!((map.min(), map.max()), (-1.0, 1.0));
    }

    #[test]
    fn test_out_of_bounds_is_index_error() {
        let mut map = FloatMap::new(0.0, 1.0, 4);
        assert!(matches!(map.get(4, 0), Err(MapGenError::Index { .. })));
        assert!(matches!(map.set(0, 9, 1.0), Err(MapGenError::Index { .. })));
        assert!(matches!(map.get_point(Point::new(-1, 2)), Err(MapGenError::Index { .. })));
        map.set(3, 3, 0.5).unwrap();
        assert_eq!(map.get(3, 3).unwrap(), 0.5);
    }

    #[test]
    fn test_rescale_round_trip() {
        let original = FloatMap::from_fn(-1.0, 1.0, 16, |x, y| ((x * 7 + y * 3) % 11) as f32 / 5.0 - 1.0);
        let mut map = original.clone();
        map.rescale_to(0.0, 1.0).unwrap();
        map.rescale_to(-1.0, 1.0).unwrap();
        for (a, b) in original.values().iter().zip(map.values()) {
            assert!((a - b).abs() < 1e-5, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_rescale_maps_endpoints() {
        let mut map = FloatMap::new(-1.0, 1.0, 2);
        map.set(0, 0, -1.0).unwrap();
        map.set(1, 0, 1.0).unwrap();
        map.rescale_to(0.0, 1.0).unwrap();
        assert_eq!(map.get(0, 0).unwrap(), 0.0);
        assert_eq!(map.get(1, 0).unwrap(), 1.0);
        assert_eq!(map.get(0, 1).unwrap(), 0.5);
        assert_eq!((map.min(), map.max()), (0.0, 1.0));
    }

    #[test]
    fn test_rescale_degenerate_range_is_configuration_error() {
        let mut map = FloatMap::new(0.5, 0.5, 4);
        assert!(matches!(map.rescale_to(0.0, 1.0), Err(MapGenError::Configuration(_))));
    }

    #[test]
    fn test_invert_is_involution_on_unit_range() {
        let original = gradient(9);
        let mut map = original.clone();
        map.invert();
        assert_eq!(map.get(0, 0).unwrap(), 1.0);
        map.invert();
        for (a, b) in original.values().iter().zip(map.values()) {
            assert!((a - b).abs() <= f32::EPSILON, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_invert_reflects_about_max() {
        let mut map = FloatMap::new(-1.0, 3.0, 2);
        map.set(0, 0, 1.0).unwrap();
        map.invert();
        assert_eq!(map.get(0, 0).unwrap(), 2.0);
        assert_eq!(map.get(1, 1).unwrap(), 3.0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let mut map = FloatMap::from_fn(0.0, 1.0, 8, |x, _| x as f32 * 0.4 - 1.0);
        map.clamp_to_range();
        let once = map.clone();
        map.clamp_to_range();
        assert_eq!(map, once);
        assert!(map.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_add_within_range_only_touches_inside() {
        let mut map = FloatMap::new(0.0, 1.0, 2);
        map.set(0, 0, -0.5).unwrap();
        map.set(1, 0, 0.5).unwrap();
        map.set(0, 1, 1.0).unwrap();
        map.set(1, 1, 1.5).unwrap();
        map.add_within_range(0.25, 0.0, 1.0);
        assert_eq!(map.get(0, 0).unwrap(), -0.5);
        assert_eq!(map.get(1, 0).unwrap(), 0.75);
        assert_eq!(map.get(0, 1).unwrap(), 1.25);
        assert_eq!(map.get(1, 1).unwrap(), 1.5);
    }

    #[test]
    fn test_zero_as_absent_with_empty_operand_is_identity() {
        let land = gradient(8);
        let mut map = land.clone();
        map.blend_zero_as_absent(&FloatMap::new(0.0, 1.0, 8)).unwrap();
        assert_eq!(map, land);

        let mut empty = FloatMap::new(0.0, 1.0, 8);
        empty.blend_zero_as_absent(&land).unwrap();
        assert_eq!(empty.values(), land.values());
    }

    #[test]
    fn test_zero_as_absent_multiplies_overlap() {
        let mut a = FloatMap::new(0.0, 1.0, 2);
        let mut b = FloatMap::new(0.0, 1.0, 2);
        a.set(0, 0, 0.5).unwrap();
        b.set(0, 0, 0.5).unwrap();
        b.set(1, 0, 0.3).unwrap();
        a.blend_zero_as_absent(&b).unwrap();
        assert_eq!(a.get(0, 0).unwrap(), 0.25);
        assert_eq!(a.get(1, 0).unwrap(), 0.3);
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_prefer_nonzero_blend() {
        let mut a = FloatMap::new(0.0, 1.0, 2);
        let mut b = FloatMap::new(0.0, 1.0, 2);
        a.set(0, 0, 0.4).unwrap();
        a.set(1, 0, 0.5).unwrap();
        b.set(1, 0, 0.5).unwrap();
        b.set(0, 1, 0.9).unwrap();
        a.blend_prefer_nonzero(&b).unwrap();
        assert_eq!(a.get(0, 0).unwrap(), 0.4);
        assert_eq!(a.get(1, 0).unwrap(), 0.25);
        assert_eq!(a.get(0, 1).unwrap(), 0.9);
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_blends_reject_size_mismatch() {
        let mut a = FloatMap::new(0.0, 1.0, 4);
        let b = FloatMap::new(0.0, 1.0, 8);
        assert!(a.multiply_blend(&b).is_err());
        assert!(a.blend_zero_as_absent(&b).is_err());
        assert!(weighted_blend(&a, &b, 0.5, 0.5).is_err());
        assert!(multiply(&a, &b).is_err());
    }

    #[test]
    fn test_weighted_blend_takes_range_from_first() {
        let a = FloatMap::from_fn(0.0, 1.0, 4, |_, _| 1.0);
        let b = FloatMap::from_fn(-1.0, 1.0, 4, |_, _| 0.5);
        let blended = weighted_blend(&a, &b, 0.75, 0.25).unwrap();
        assert_eq!((blended.min(), blended.max()), (0.0, 1.0));
        assert!(blended.values().iter().all(|&v| (v - 0.875).abs() < 1e-6));
    }

    #[test]
    fn test_multiply_requires_equal_ranges() {
        let a = FloatMap::new(0.0, 1.0, 4);
        let b = FloatMap::new(-1.0, 1.0, 4);
        assert!(matches!(multiply(&a, &b), Err(MapGenError::Configuration(_))));
    }

    #[test]
    fn test_local_smooth_pulls_toward_mean() {
        let mut map = FloatMap::from_fn(0.0, 1.0, 16, |x, y| if (x + y) % 2 == 0 { 0.8 } else { 0.2 });
        let spread_before = spread(&map);
        map.local_smooth(4, 4, 0.1).unwrap();
        assert!(spread(&map) <= spread_before);
        assert!(map.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Cells at a disc center move by the full tolerance.
        assert!((map.get(4, 4).unwrap() - 0.7).abs() < 0.05);
    }

    #[test]
    fn test_local_smooth_rejects_oversized_tolerance() {
        let mut map = FloatMap::from_fn(0.0, 10.0, 16, |x, _| if x < 8 { 0.0 } else { 10.0 });
        let result = map.local_smooth(6, 8, 4.0);
        assert!(matches!(result, Err(MapGenError::Range { .. })));
    }

    #[test]
    fn test_local_smooth_rejects_zero_radius() {
        let mut map = gradient(8);
        assert!(matches!(map.local_smooth(0, 4, 0.1), Err(MapGenError::Configuration(_))));
    }

    fn spread(map: &FloatMap) -> f32 {
        let max = map.values().iter().cloned().fold(f32::MIN, f32::max);
        let min = map.values().iter().cloned().fold(f32::MAX, f32::min);
        max - min
    }
}
