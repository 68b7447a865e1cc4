//! Multi-octave coherent noise grids
//!
//! Octave `i` samples its own simplex lattice (seeded `seed + i`) at frequency
//! `2^i / (size / 2)` with amplitude `persistence^i`. The raw sum is not
//! normalised and can leave the unit interval, so it is clamped into [-1, 1].

use noise::{NoiseFn, Simplex};

use crate::floatmap::FloatMap;

/// Generate a `size`×`size` grid of layered simplex noise, declared range [-1, 1].
///
/// The same `(size, seed, octaves, persistence)` always yields the same grid.
pub fn generate(size: usize, seed: u32, octaves: u32, persistence: f64) -> FloatMap {
    let layers: Vec<Simplex> = (0..octaves).map(|i| Simplex::new(seed.wrapping_add(i))).collect();
    let base_wavelength = (size as f64 / 2.0).max(1.0);

    FloatMap::from_fn(-1.0, 1.0, size, |x, y| {
        let v = layered(&layers, x as f64, y as f64, base_wavelength, persistence) as f32;
        v.clamp(-1.0, 1.0)
    })
}

/// Sum of octaves at one point.
fn layered(layers: &[Simplex], x: f64, y: f64, base_wavelength: f64, persistence: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0 / base_wavelength;

    for layer in layers {
        total += amplitude * layer.get([x * frequency, y * frequency]);
        amplitude *= persistence;
        frequency *= 2.0;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_grid() {
        let a = generate(32, 99, 6, 0.65);
        let b = generate(32, 99, 6, 0.65);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_grid() {
        let a = generate(32, 1, 4, 0.6);
        let b = generate(32, 2, 4, 0.6);
        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn test_values_within_unit_bounds() {
        let map = generate(64, 7, 10, 0.74);
        assert_eq!((map.min(), map.max()), (-1.0, 1.0));
        assert!(map.values().iter().all(|v| (-1.0..=1.0).contains(v)));
        // Not a flat field
        let first = map.values()[0];
        assert!(map.values().iter().any(|&v| v != first));
    }
}
