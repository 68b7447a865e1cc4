//! Radial falloff masks used to sculpt noise into landmasses
//!
//! Every mask is a `FloatMap` with declared range [0, 1]. Falloff is quadratic:
//! a cell at scaled distance `d` from a center gets `gain - (d / denom)^2`,
//! floored at zero, where `denom` is the mask radius minus a fixed margin.

use tracing::debug;

use crate::error::{MapGenError, Result};
use crate::floatmap::{self, FloatMap};
use crate::point::Point;
use crate::seeds::{derive_seed, SeedStream};

/// Cells subtracted from a mask radius to get its falloff denominator.
pub const FALLOFF_MARGIN: f32 = 10.0;

/// Fraction of the side kept clear of island centers on each border.
const SCATTER_BORDER: f32 = 0.1;

const NEGATIVE_ISLAND_TAG: u64 = 0x4E45_4741;

// =============================================================================
// CIRCULAR MASKS
// =============================================================================

/// Mask centered on the grid. Larger `shape_coeff` shrinks the landmass;
/// halving it roughly doubles the apparent radius.
pub fn circular_mask(size: usize, shape_coeff: f32) -> Result<FloatMap> {
    let falloff = size as f32 * 0.5 - FALLOFF_MARGIN;
    if falloff <= 0.0 {
        return Err(MapGenError::config(format!(
            "grid of size {} is too small for a circular mask",
            size
        )));
    }
    let center = (size / 2) as i32;
    Ok(radial(size, Point::new(center, center), falloff, shape_coeff, 1.0))
}

/// Mask centered on `origin` whose center value is `gain`.
pub fn defined_circular_mask(
    size: usize,
    origin: Point,
    radius: i32,
    shape_coeff: f32,
    gain: f32,
) -> Result<FloatMap> {
    let falloff = radius as f32 - FALLOFF_MARGIN;
    if falloff <= 0.0 {
        return Err(MapGenError::config(format!(
            "mask radius {} must exceed the falloff margin of {}",
            radius, FALLOFF_MARGIN
        )));
    }
    Ok(radial(size, origin, falloff, shape_coeff, gain))
}

fn radial(size: usize, origin: Point, falloff: f32, shape_coeff: f32, gain: f32) -> FloatMap {
    FloatMap::from_fn(0.0, 1.0, size, move |x, y| {
        let dx = ((origin.x - x as i32).abs() as f32) * shape_coeff;
        let dy = ((origin.y - y as i32).abs() as f32) * shape_coeff;
        let delta = dx.hypot(dy) / falloff;
        (gain - delta * delta).max(0.0)
    })
}

// =============================================================================
// COMPOSITE MASKS
// =============================================================================

/// Union of `count` jittered islands around `average_radius`.
///
/// Islands are inverted, multiplied together, and the product inverted once, so
/// each island's footprint survives independently of the others. With no
/// islands the result is all zero.
pub fn scattered_islands_mask(
    size: usize,
    seed: u64,
    average_radius: i32,
    count: usize,
    jitter: f32,
) -> Result<FloatMap> {
    if count == 0 {
        return Ok(FloatMap::new(0.0, 1.0, size));
    }

    let mut stream = SeedStream::new(seed);
    let rmin = (average_radius as f32 * (1.0 - jitter)) as i32;
    let rmax = (average_radius as f32 * (1.0 + jitter)) as i32;
    let border = (size as f32 * SCATTER_BORDER) as i32;
    let omin = border + average_radius;
    let omax = size as i32 - average_radius - border;
    if omax < omin || rmax < rmin {
        return Err(MapGenError::config(format!(
            "no room for islands of radius {} on a grid of size {}",
            average_radius, size
        )));
    }

    let mut union: Option<FloatMap> = None;
    for _ in 0..count {
        let origin = Point::random_in_range(stream.rng(), omin, omax);
        let radius = stream.int_between(rmin, rmax);
        let shape = stream.modifier(1.0, jitter);
        let gain = stream.modifier(1.0, jitter);

        let mut island = defined_circular_mask(size, origin, radius, shape, gain)?;
        island.invert();
        match union.as_mut() {
            Some(acc) => acc.multiply_blend(&island)?,
            None => union = Some(island),
        }
    }

    let mut mask = union.unwrap_or_else(|| FloatMap::new(0.0, 1.0, size));
    mask.invert();
    Ok(mask)
}

/// Islands whose smallest jittered radius falls inside the falloff margin are
/// dropped instead of failing the whole mask.
fn fitting_count(count: usize, average_radius: i32, jitter: f32) -> usize {
    let smallest = (average_radius as f32 * (1.0 - jitter)) as i32;
    if smallest as f32 <= FALLOFF_MARGIN {
        0
    } else {
        count
    }
}

/// Sparse raised and lowered spots used to break up smooth height fields.
///
/// Island counts grow with the side length (`size / 256` scaled by a jitter
/// factor and a weight of 0.5 for raised, 0.33 for lowered spots).
pub fn extremity_mask(size: usize, seed: u64) -> Result<FloatMap> {
    let mut stream = SeedStream::new(seed);
    let jitter = stream.modifier(0.2, 0.1);
    let base = (size / 16) as f32 / 16.0;
    let count_positive = (base * stream.modifier(1.0, jitter) * 0.5) as usize;
    let count_negative = (base * stream.modifier(1.0, jitter) * 0.33) as usize;
    let count_positive = fitting_count(count_positive, (size / 48) as i32, jitter);
    let count_negative = fitting_count(count_negative, (size / 64) as i32, jitter);

    debug!(
        count_positive,
        count_negative,
        radius_positive = size / 48,
        radius_negative = size / 64,
        "extremity islands"
    );

    let positive = scattered_islands_mask(size, seed, (size / 48) as i32, count_positive, jitter)?;
    let mut negative = scattered_islands_mask(
        size,
        derive_seed(seed, NEGATIVE_ISLAND_TAG),
        (size / 64) as i32,
        count_negative,
        jitter,
    )?;
    negative.invert();

    floatmap::multiply(&positive, &negative)
}

/// Scattered mask that raises land: islands at radius `size / 48`, lifted by
/// 0.2 and clamped back into [0, 1].
pub fn additive_mask(size: usize, seed: u64) -> Result<FloatMap> {
    let mut stream = SeedStream::new(seed);
    let jitter = stream.modifier(0.2, 0.1);
    let base = (size / 16) as f32 / 16.0;
    let count = (base * stream.modifier(1.0, jitter) * 0.7) as usize;
    let count = fitting_count(count, (size / 48) as i32, jitter);

    debug!(count, radius = size / 48, "additive islands");

    let mut mask = scattered_islands_mask(size, seed, (size / 48) as i32, count, jitter)?;
    mask.add_within_range(0.2, 0.0, 1.0);
    mask.rescale_to(0.0, 1.0)?;
    mask.clamp_to_range();
    Ok(mask)
}

/// Elongated landmass: a chain of jittered circular masks along a random line.
pub fn fractal_chain_mask(size: usize, seed: u64) -> Result<FloatMap> {
    let mut stream = SeedStream::new(seed);
    let randomness = stream.modifier(0.2, 0.1);

    let third = (size / 3) as i32;
    let half = (size / 2) as i32;
    let start = Point::new(stream.int_within(half, 0.8), stream.int_within(third, 0.5));
    let end = Point::new(stream.int_within(half, 0.8), stream.int_within(2 * third, 0.6));

    let average_width = stream.int_within((size / 5) as i32, 0.6).max(1);
    let length = start.distance(end);
    let spread = ((length as i32) / (average_width - (average_width as f32 * 0.1) as i32).max(1)).max(1);
    let max_offset = (average_width as f32 * randomness) as i32;
    let shape_jitter = stream.modifier(1.0, randomness);
    let radius_jitter = stream.modifier(1.0, randomness);
    let gain_jitter = stream.modifier(1.0, randomness);

    let links = (length as i32 / spread) as usize + 1;
    let step = length / links as f32;
    let (dir_x, dir_y) = if length > 0.0 {
        ((end.x - start.x) as f32 / length, (end.y - start.y) as f32 / length)
    } else {
        (0.0, 0.0)
    };

    let min_radius = FALLOFF_MARGIN as i32 + 1;
    let mut chain: Option<FloatMap> = None;
    for i in 0..links {
        let along = step * i as f32;
        let lo = average_width as f32 * (1.0 - radius_jitter);
        let hi = average_width as f32 * (1.0 + radius_jitter);
        let radius = ((lo + stream.unit() * (hi - lo)) as i32).max(min_radius);
        let shape = stream.modifier(1.0, shape_jitter);
        let gain = stream.modifier(1.0, gain_jitter);
        let cx = (start.x as f32 + dir_x * along) as i32 + stream.int_between(-max_offset, max_offset);
        let cy = (start.y as f32 + dir_y * along) as i32 + stream.int_between(-max_offset, max_offset);

        let mut link = defined_circular_mask(size, Point::new(cx, cy), radius, shape, gain)?;
        link.invert();
        match chain.as_mut() {
            Some(acc) => acc.multiply_blend(&link)?,
            None => chain = Some(link),
        }
    }

    let mut mask = chain.unwrap_or_else(|| FloatMap::new(0.0, 1.0, size));
    mask.invert();
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit(map: &FloatMap) -> bool {
        map.values().iter().all(|v| (0.0..=1.0).contains(v))
    }

    #[test]
    fn test_circular_mask_peaks_at_center() {
        let mask = circular_mask(64, 1.0).unwrap();
        assert_eq!(mask.get(32, 32).unwrap(), 1.0);
        assert_eq!(mask.get(0, 0).unwrap(), 0.0);
        assert!(mask.get(32, 32).unwrap() > mask.get(40, 32).unwrap());
        assert!(in_unit(&mask));
    }

    #[test]
    fn test_smaller_shape_coeff_grows_landmass() {
        let normal = circular_mask(64, 1.0).unwrap();
        let pangea = circular_mask(64, 0.5).unwrap();
        let covered = |m: &FloatMap| m.values().iter().filter(|&&v| v > 0.0).count();
        assert!(covered(&pangea) > covered(&normal));
        for (p, n) in pangea.values().iter().zip(normal.values()) {
            assert!(p >= n);
        }
    }

    #[test]
    fn test_circular_mask_rejects_tiny_grid() {
        assert!(matches!(circular_mask(20, 1.0), Err(MapGenError::Configuration(_))));
    }

    #[test]
    fn test_defined_mask_gain_sets_center_value() {
        let mask = defined_circular_mask(64, Point::new(10, 50), 30, 1.0, 0.6).unwrap();
        assert!((mask.get(10, 50).unwrap() - 0.6).abs() < 1e-6);
        assert_eq!(mask.get(63, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_defined_mask_rejects_radius_within_margin() {
        let result = defined_circular_mask(64, Point::new(32, 32), 10, 1.0, 1.0);
        assert!(matches!(result, Err(MapGenError::Configuration(_))));
    }

    #[test]
    fn test_scattered_islands_union() {
        let mask = scattered_islands_mask(256, 11, 24, 5, 0.15).unwrap();
        assert!(in_unit(&mask));
        assert!(mask.values().iter().any(|&v| v > 0.5));
        // Border band is never an island center and stays empty at the corners.
        assert_eq!(mask.get(0, 0).unwrap(), 0.0);
        assert_eq!(mask, scattered_islands_mask(256, 11, 24, 5, 0.15).unwrap());
    }

    #[test]
    fn test_single_island_matches_defined_mask_footprint() {
        let mask = scattered_islands_mask(128, 5, 20, 1, 0.1).unwrap();
        let peak = mask.values().iter().cloned().fold(0.0f32, f32::max);
        assert!(peak > 0.8 && peak <= 1.0);
    }

    #[test]
    fn test_zero_islands_is_empty() {
        let mask = scattered_islands_mask(64, 1, 8, 0, 0.1).unwrap();
        assert!(mask.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_scattered_rejects_crowded_grid() {
        let result = scattered_islands_mask(64, 1, 40, 2, 0.1);
        assert!(matches!(result, Err(MapGenError::Configuration(_))));
    }

    #[test]
    fn test_extremity_mask_small_world_is_flat() {
        // (512 / 16) / 16 * m * 0.5 < 1 for every jitter, so no islands appear.
        let mask = extremity_mask(512, 42).unwrap();
        assert!(mask.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_extremity_mask_large_world_has_spots() {
        let mask = extremity_mask(1024, 42).unwrap();
        assert!(in_unit(&mask));
        assert!(mask.values().iter().any(|&v| v > 0.0));
        assert_eq!(mask, extremity_mask(1024, 42).unwrap());
    }

    #[test]
    fn test_extremity_mask_odd_size_skips_undersized_islands() {
        // size / 48 = 12 leaves no room for the falloff margin once jittered.
        let mask = extremity_mask(600, 3).unwrap();
        assert!(mask.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fractal_chain_mask_is_deterministic() {
        let a = fractal_chain_mask(128, 3).unwrap();
        let b = fractal_chain_mask(128, 3).unwrap();
        assert_eq!(a, b);
        assert!(in_unit(&a));
        assert!(a.values().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_additive_mask_stays_in_unit_range() {
        let mask = additive_mask(1024, 9).unwrap();
        assert!(in_unit(&mask));
        assert!(mask.values().iter().any(|&v| v >= 0.2));
    }
}
