//! Biome classification from height and moisture
//!
//! Each biome owns one or more inclusive rectangles in (height, moisture)
//! space. A cell takes the LAST biome whose rectangle contains it, in the order
//! of `Biome::ALL` and then of each biome's rectangles. Rectangles may overlap;
//! the later declaration wins.

use serde::Serialize;

use crate::error::{MapGenError, Result};
use crate::tilemap::Tilemap;
use crate::world::World;

/// Axis-aligned rectangle in (height, moisture) space, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeRange {
    pub min_height: f32,
    pub max_height: f32,
    pub min_moisture: f32,
    pub max_moisture: f32,
}

impl BiomeRange {
    pub const fn new(min_height: f32, max_height: f32, min_moisture: f32, max_moisture: f32) -> Self {
        Self {
            min_height,
            max_height,
            min_moisture,
            max_moisture,
        }
    }

    pub fn contains(&self, height: f32, moisture: f32) -> bool {
        height >= self.min_height
            && height <= self.max_height
            && moisture >= self.min_moisture
            && moisture <= self.max_moisture
    }
}

/// Biome types based on height and moisture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Biome {
    Water,
    Beach,
    Desert,
    Grassland,
    Forest,
    Rainforest,
    Swamp,
    Highland,
    Taiga,
    Mountain,
    Snow,
}

// Finished heights peak near 0.7; Mountain and Snow sit below that.
const WATER: &[BiomeRange] = &[BiomeRange::new(0.0, 0.20, 0.0, 1.0)];
const BEACH: &[BiomeRange] = &[BiomeRange::new(0.20, 0.24, 0.0, 1.0)];
const DESERT: &[BiomeRange] = &[BiomeRange::new(0.24, 0.42, 0.0, 0.20)];
const GRASSLAND: &[BiomeRange] = &[BiomeRange::new(0.24, 0.42, 0.20, 0.45)];
const FOREST: &[BiomeRange] = &[BiomeRange::new(0.24, 0.42, 0.45, 0.70)];
const RAINFOREST: &[BiomeRange] = &[BiomeRange::new(0.24, 0.42, 0.70, 1.0)];
const SWAMP: &[BiomeRange] = &[BiomeRange::new(0.24, 0.30, 0.82, 1.0)];
const HIGHLAND: &[BiomeRange] = &[BiomeRange::new(0.42, 0.52, 0.0, 0.50)];
const TAIGA: &[BiomeRange] = &[BiomeRange::new(0.42, 0.52, 0.50, 1.0)];
const MOUNTAIN: &[BiomeRange] = &[BiomeRange::new(0.52, 0.60, 0.0, 1.0)];
const SNOW: &[BiomeRange] = &[BiomeRange::new(0.60, 1.0, 0.0, 1.0)];

impl Biome {
    /// Every biome in classification order.
    pub const ALL: [Biome; 11] = [
        Biome::Water,
        Biome::Beach,
        Biome::Desert,
        Biome::Grassland,
        Biome::Forest,
        Biome::Rainforest,
        Biome::Swamp,
        Biome::Highland,
        Biome::Taiga,
        Biome::Mountain,
        Biome::Snow,
    ];

    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Biome::Water => "Water",
            Biome::Beach => "Beach",
            Biome::Desert => "Desert",
            Biome::Grassland => "Grassland",
            Biome::Forest => "Forest",
            Biome::Rainforest => "Rainforest",
            Biome::Swamp => "Swamp",
            Biome::Highland => "Highland",
            Biome::Taiga => "Taiga",
            Biome::Mountain => "Mountain",
            Biome::Snow => "Snow",
        }
    }

    /// Classification rectangles owned by this biome.
    pub fn ranges(&self) -> &'static [BiomeRange] {
        match self {
            Biome::Water => WATER,
            Biome::Beach => BEACH,
            Biome::Desert => DESERT,
            Biome::Grassland => GRASSLAND,
            Biome::Forest => FOREST,
            Biome::Rainforest => RAINFOREST,
            Biome::Swamp => SWAMP,
            Biome::Highland => HIGHLAND,
            Biome::Taiga => TAIGA,
            Biome::Mountain => MOUNTAIN,
            Biome::Snow => SNOW,
        }
    }

    /// Get RGB color for biome visualization
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Biome::Water => (30, 60, 120),
            Biome::Beach => (225, 210, 160),
            Biome::Desert => (210, 180, 120),
            Biome::Grassland => (140, 170, 80),
            Biome::Forest => (40, 100, 40),
            Biome::Rainforest => (20, 90, 40),
            Biome::Swamp => (70, 90, 60),
            Biome::Highland => (150, 140, 100),
            Biome::Taiga => (50, 80, 50),
            Biome::Mountain => (140, 140, 130),
            Biome::Snow => (255, 255, 255),
        }
    }

    /// Single character for ASCII dumps.
    pub fn glyph(&self) -> char {
        match self {
            Biome::Water => '~',
            Biome::Beach => ',',
            Biome::Desert => '.',
            Biome::Grassland => 'g',
            Biome::Forest => 'f',
            Biome::Rainforest => 'R',
            Biome::Swamp => 'W',
            Biome::Highland => 'h',
            Biome::Taiga => 'T',
            Biome::Mountain => 'A',
            Biome::Snow => '^',
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Water)
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Biome for one (height, moisture) pair; `None` when no rectangle covers it.
///
/// The scan never stops early: a later matching rectangle overrides an earlier one.
pub fn classify(height: f32, moisture: f32) -> Option<Biome> {
    let mut found = None;
    for biome in Biome::ALL {
        for range in biome.ranges() {
            if range.contains(height, moisture) {
                found = Some(biome);
            }
        }
    }
    found
}

/// Fill the world's biome grid and verify that every cell was classified.
pub fn assign_biomes(world: &mut World) -> Result<()> {
    let heightmap = &world.heightmap;
    let moisture = &world.moisture;
    let size = heightmap.size();
    let heights = heightmap.values();
    let moistures = moisture.values();

    let biomes = Tilemap::from_fn(size, size, |x, y| {
        let idx = y * size + x;
        classify(heights[idx], moistures[idx])
    });

    if let Some((x, y, _)) = biomes.iter().find(|(_, _, b)| b.is_none()) {
        let idx = y * size + x;
        return Err(MapGenError::Unclassified {
            x,
            y,
            height: heights[idx],
            moisture: moistures[idx],
        });
    }

    world.biomes = biomes;
    Ok(())
}

/// Turn single-tile land surrounded by water on all four sides into water.
///
/// One pass over interior cells; border cells are never changed. Returns the
/// number of tiles converted.
pub fn remove_isolated_tiles(biomes: &mut Tilemap<Option<Biome>>) -> usize {
    let is_water = |b: &Option<Biome>| matches!(b, Some(Biome::Water));
    let mut removed = 0;

    for x in 1..biomes.width.saturating_sub(1) {
        for y in 1..biomes.height.saturating_sub(1) {
            if is_water(biomes.get(x, y)) {
                continue;
            }
            let surrounded = biomes
                .neighbors(x, y)
                .iter()
                .all(|&(nx, ny)| is_water(biomes.get(nx, ny)));
            if surrounded {
                biomes.set(x, y, Some(Biome::Water));
                removed += 1;
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_unit_square() {
        let steps = 200;
        for i in 0..=steps {
            for j in 0..=steps {
                let h = i as f32 / steps as f32;
                let m = j as f32 / steps as f32;
                assert!(classify(h, m).is_some(), "gap at height={} moisture={}", h, m);
            }
        }
    }

    #[test]
    fn test_last_matching_rectangle_wins() {
        // Rainforest and Swamp overlap; Swamp is declared later.
        assert_eq!(classify(0.27, 0.90), Some(Biome::Swamp));
        assert_eq!(classify(0.35, 0.90), Some(Biome::Rainforest));
        // Shared edge between Water and Beach goes to Beach.
        assert_eq!(classify(0.20, 0.5), Some(Biome::Beach));
        assert_eq!(classify(0.19, 0.5), Some(Biome::Water));
    }

    #[test]
    fn test_upper_bands_sit_inside_produced_heights() {
        assert_eq!(classify(0.45, 0.30), Some(Biome::Highland));
        assert_eq!(classify(0.45, 0.70), Some(Biome::Taiga));
        assert_eq!(classify(0.55, 0.50), Some(Biome::Mountain));
        assert_eq!(classify(0.65, 0.50), Some(Biome::Snow));
        assert_eq!(classify(1.0, 1.0), Some(Biome::Snow));
    }

    #[test]
    fn test_out_of_domain_is_unclassified() {
        assert_eq!(classify(1.5, 0.5), None);
        assert_eq!(classify(f32::NAN, 0.5), None);
    }

    #[test]
    fn test_isolated_tile_becomes_water() {
        let mut biomes = Tilemap::new_with(5, 5, Some(Biome::Water));
        biomes.set(2, 2, Some(Biome::Forest));
        assert_eq!(remove_isolated_tiles(&mut biomes), 1);
        assert!(biomes.iter().all(|(_, _, b)| *b == Some(Biome::Water)));
    }

    #[test]
    fn test_connected_land_survives_cleanup() {
        let mut biomes = Tilemap::new_with(5, 5, Some(Biome::Water));
        biomes.set(2, 2, Some(Biome::Forest));
        biomes.set(3, 2, Some(Biome::Grassland));
        assert_eq!(remove_isolated_tiles(&mut biomes), 0);
        assert_eq!(*biomes.get(2, 2), Some(Biome::Forest));
    }

    #[test]
    fn test_border_tiles_are_untouched() {
        let mut biomes = Tilemap::new_with(5, 5, Some(Biome::Water));
        biomes.set(0, 2, Some(Biome::Beach));
        assert_eq!(remove_isolated_tiles(&mut biomes), 0);
        assert_eq!(*biomes.get(0, 2), Some(Biome::Beach));
    }

    #[test]
    fn test_ids_follow_declaration_order() {
        for (i, biome) in Biome::ALL.iter().enumerate() {
            assert_eq!(biome.id() as usize, i);
        }
    }
}
