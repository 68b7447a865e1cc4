//! World data container module
//!
//! Bundles the generated grids into a single struct for easy passing between
//! the generator, the classifier and the exporters. Owns no generation logic.

use std::collections::BTreeMap;

use crate::biomes::Biome;
use crate::error::{MapGenError, Result};
use crate::floatmap::FloatMap;
use crate::seeds::WorldParams;
use crate::tilemap::Tilemap;

/// Byte standing in for an unclassified tile in `World::checksum`.
pub const UNCLASSIFIED_ID: u8 = u8::MAX;

/// All generated world data bundled together
#[derive(Clone, Debug)]
pub struct World {
    /// Side length in tiles
    pub size: usize,
    /// Seed-derived parameters (carries the seed itself)
    pub params: WorldParams,
    /// Height field, [0, 1]
    pub heightmap: FloatMap,
    /// Moisture field, [0, 1]
    pub moisture: FloatMap,
    /// Biome per tile; `None` until classification runs
    pub biomes: Tilemap<Option<Biome>>,
}

impl World {
    /// Create a world from finished height and moisture fields. Biomes start unset.
    pub fn new(params: WorldParams, heightmap: FloatMap, moisture: FloatMap) -> Result<Self> {
        let size = heightmap.size();
        if moisture.size() != size {
            return Err(MapGenError::config(format!(
                "heightmap is {}x{} but moisture map is {}x{}",
                size,
                size,
                moisture.size(),
                moisture.size()
            )));
        }
        Ok(Self {
            size,
            params,
            heightmap,
            moisture,
            biomes: Tilemap::new_with(size, size, None),
        })
    }

    /// Convenience accessor for the world seed
    pub fn seed(&self) -> i32 {
        self.params.seed
    }

    pub fn biome_at(&self, x: usize, y: usize) -> Result<Option<Biome>> {
        self.biomes.try_get(x, y).copied().ok_or(MapGenError::Index {
            x: x as i64,
            y: y as i64,
            width: self.size,
            height: self.size,
        })
    }

    /// Get tile info at coordinates
    pub fn tile_info(&self, x: usize, y: usize) -> Result<TileInfo> {
        Ok(TileInfo {
            x,
            y,
            height: self.heightmap.get(x, y)?,
            moisture: self.moisture.get(x, y)?,
            biome: self.biome_at(x, y)?,
        })
    }

    /// Fraction of classified tiles that are not water.
    pub fn land_fraction(&self) -> f32 {
        let total = self.size * self.size;
        if total == 0 {
            return 0.0;
        }
        let land = self
            .biomes
            .iter()
            .filter(|(_, _, b)| matches!(b, Some(biome) if !biome.is_water()))
            .count();
        land as f32 / total as f32
    }

    /// Number of tiles per biome. Biomes with no tiles are omitted.
    pub fn biome_counts(&self) -> BTreeMap<Biome, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, biome) in self.biomes.iter() {
            if let Some(biome) = biome {
                *counts.entry(*biome).or_insert(0) += 1;
            }
        }
        counts
    }

    /// CRC-32 of the side length (u64, little endian) followed by one byte
    /// per tile: the biome id, or `UNCLASSIFIED_ID` for an empty tile.
    ///
    /// Independent of platform, toolchain and build, so a reference world's
    /// value can be pinned.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&(self.size as u64).to_le_bytes());
        let ids: Vec<u8> = self
            .biomes
            .as_slice()
            .iter()
            .map(|b| b.map_or(UNCLASSIFIED_ID, |b| b.id()))
            .collect();
        hasher.update(&ids);
        hasher.finalize()
    }

    /// File name the biome map is written to.
    pub fn output_file_name(&self) -> String {
        format!("mapgen-{}.png", self.params.seed)
    }
}

/// Information about a single tile
#[derive(Clone, Debug, PartialEq)]
pub struct TileInfo {
    pub x: usize,
    pub y: usize,
    pub height: f32,
    pub moisture: f32,
    pub biome: Option<Biome>,
}

impl TileInfo {
    /// Format moisture as string
    pub fn moisture_str(&self) -> String {
        let desc = if self.moisture < 0.2 {
            "arid"
        } else if self.moisture < 0.4 {
            "dry"
        } else if self.moisture < 0.6 {
            "moderate"
        } else if self.moisture < 0.8 {
            "wet"
        } else {
            "saturated"
        };
        format!("{:.2} ({})", self.moisture, desc)
    }

    pub fn biome_str(&self) -> &'static str {
        self.biome.map(|b| b.label()).unwrap_or("Unclassified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::DEFAULT_SHAPE_COEFF;

    fn params(seed: i32) -> WorldParams {
        WorldParams {
            seed,
            randomness: 0.1,
            height_modifier: -0.05,
            moisture_modifier: -0.02,
            shape_coeff: DEFAULT_SHAPE_COEFF,
        }
    }

    fn test_world() -> World {
        let height = FloatMap::from_fn(0.0, 1.0, 4, |x, _| x as f32 / 4.0);
        let moisture = FloatMap::new(0.0, 1.0, 4);
        World::new(params(42), height, moisture).unwrap()
    }

    #[test]
    fn test_new_world_is_unclassified() {
        let world = test_world();
        assert_eq!(world.size, 4);
        assert!(world.biomes.iter().all(|(_, _, b)| b.is_none()));
        assert_eq!(world.land_fraction(), 0.0);
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let height = FloatMap::new(0.0, 1.0, 4);
        let moisture = FloatMap::new(0.0, 1.0, 8);
        assert!(matches!(
            World::new(params(1), height, moisture),
            Err(MapGenError::Configuration(_))
        ));
    }

    #[test]
    fn test_tile_info_and_bounds() {
        let mut world = test_world();
        world.biomes.set(2, 1, Some(Biome::Desert));
        let info = world.tile_info(2, 1).unwrap();
        assert_eq!(info.height, 0.5);
        assert_eq!(info.biome, Some(Biome::Desert));
        assert_eq!(info.biome_str(), "Desert");
        assert!(info.moisture_str().contains("arid"));
        assert!(matches!(world.tile_info(4, 0), Err(MapGenError::Index { .. })));
    }

    #[test]
    fn test_counts_and_land_fraction() {
        let mut world = test_world();
        world.biomes.fill(Some(Biome::Water));
        world.biomes.set(1, 1, Some(Biome::Forest));
        world.biomes.set(2, 2, Some(Biome::Forest));
        world.biomes.set(3, 3, Some(Biome::Snow));
        let counts = world.biome_counts();
        assert_eq!(counts[&Biome::Water], 13);
        assert_eq!(counts[&Biome::Forest], 2);
        assert_eq!(counts[&Biome::Snow], 1);
        assert_eq!(world.land_fraction(), 3.0 / 16.0);
    }

    #[test]
    fn test_checksum_tracks_biomes() {
        let mut world = test_world();
        let before = world.checksum();
        assert_eq!(before, test_world().checksum());
        world.biomes.set(0, 0, Some(Biome::Beach));
        assert_ne!(before, world.checksum());
    }

    #[test]
    fn test_checksum_is_fixed_crc_of_biome_ids() {
        let mut world = test_world();
        assert_eq!(world.checksum(), 433_051_952);
        world.biomes.fill(Some(Biome::Water));
        assert_eq!(world.checksum(), 3_402_060_927);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(test_world().output_file_name(), "mapgen-42.png");
    }
}
