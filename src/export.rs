//! Raster and JSON output for generated worlds
//!
//! Renderers build an `RgbImage` in memory; the `export_*` functions write it
//! (or a JSON summary) to disk. Nothing in the pipeline depends on this module
//! except `Generator::run`.

use std::collections::BTreeMap;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::error::{MapGenError, Result};
use crate::floatmap::FloatMap;
use crate::seeds::WorldParams;
use crate::world::World;

/// Render the biome grid with each biome's fixed color.
pub fn render_biome_map(world: &World) -> Result<RgbImage> {
    let size = world.size;
    let mut img: RgbImage = ImageBuffer::new(size as u32, size as u32);

    for (x, y, biome) in world.biomes.iter() {
        let biome = biome.ok_or_else(|| MapGenError::Unclassified {
            x,
            y,
            height: world.heightmap.values()[y * size + x],
            moisture: world.moisture.values()[y * size + x],
        })?;
        let (r, g, b) = biome.color();
        img.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
    }

    Ok(img)
}

/// Export the biome map as a PNG.
pub fn export_biome_map(world: &World, path: &Path) -> Result<()> {
    render_biome_map(world)?.save(path)?;
    Ok(())
}

/// Greyscale rendering of a grid, black at the declared minimum and white at the maximum.
pub fn render_greyscale(map: &FloatMap) -> RgbImage {
    let size = map.size();
    let (min, max) = (map.min(), map.max());
    let span = if max > min { max - min } else { 1.0 };
    let mut img: RgbImage = ImageBuffer::new(size as u32, size as u32);

    for (idx, &v) in map.values().iter().enumerate() {
        let t = ((v - min) / span).clamp(0.0, 1.0);
        let grey = (t * 255.0) as u8;
        img.put_pixel((idx % size) as u32, (idx / size) as u32, Rgb([grey, grey, grey]));
    }

    img
}

/// Banded heat map of a [0, 1] grid.
pub fn render_heat_map(map: &FloatMap) -> RgbImage {
    let size = map.size();
    let mut img: RgbImage = ImageBuffer::new(size as u32, size as u32);

    for (idx, &v) in map.values().iter().enumerate() {
        img.put_pixel((idx % size) as u32, (idx / size) as u32, Rgb(heat_color(v)));
    }

    img
}

fn heat_color(v: f32) -> [u8; 3] {
    if v >= 0.85 {
        [220, 30, 30] // red
    } else if v >= 0.7 {
        [240, 140, 30] // orange
    } else if v >= 0.55 {
        [240, 220, 40] // yellow
    } else if v >= 0.35 {
        [60, 170, 60] // green
    } else if v >= 0.15 {
        [40, 80, 200] // blue
    } else if v >= 0.05 {
        [60, 60, 60] // dark grey
    } else {
        [0, 0, 0]
    }
}

/// Export a grid as a greyscale PNG.
pub fn export_floatmap_png(map: &FloatMap, path: &Path) -> Result<()> {
    render_greyscale(map).save(path)?;
    Ok(())
}

/// Export a grid as a banded heat map PNG.
pub fn export_heat_map(map: &FloatMap, path: &Path) -> Result<()> {
    render_heat_map(map).save(path)?;
    Ok(())
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Serializable overview of a generated world.
#[derive(Clone, Debug, Serialize)]
pub struct WorldSummary {
    pub seed: i32,
    pub size: usize,
    pub params: WorldParams,
    pub land_fraction: f32,
    pub biome_counts: BTreeMap<String, usize>,
    pub checksum: u32,
    pub image: String,
}

impl WorldSummary {
    pub fn from_world(world: &World) -> Self {
        Self {
            seed: world.seed(),
            size: world.size,
            params: world.params,
            land_fraction: world.land_fraction(),
            biome_counts: world
                .biome_counts()
                .into_iter()
                .map(|(biome, count)| (biome.label().to_string(), count))
                .collect(),
            checksum: world.checksum(),
            image: world.output_file_name(),
        }
    }
}

/// Write the world summary as pretty-printed JSON.
pub fn export_summary(world: &World, path: &Path) -> Result<()> {
    let summary = WorldSummary::from_world(world);
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
