//! Debug script to print a small world's biomes as ASCII
//!
//! Usage: debug_biomes [seed] [size]

use std::fs::File;
use std::io::Write;

use mapgen::{Biome, Generator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let seed: i32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(12345);
    let size: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(128);

    let world = Generator::new(size, seed)?.generate()?;

    let mut file = File::create("biome_debug.txt")?;

    writeln!(file, "=== BIOME DEBUG MAP ({}x{}) seed={} ===", size, size, seed)?;
    writeln!(file, "{}", world.params)?;
    writeln!(file)?;

    writeln!(file, "LEGEND:")?;
    for biome in Biome::ALL {
        writeln!(file, "  {} = {}", biome.glyph(), biome.label())?;
    }
    writeln!(file)?;

    for y in 0..size {
        let row: String = (0..size)
            .map(|x| match world.biome_at(x, y) {
                Ok(Some(biome)) => biome.glyph(),
                _ => '?',
            })
            .collect();
        writeln!(file, "{}", row)?;
    }
    writeln!(file)?;

    let counts = world.biome_counts();
    let total = (size * size) as f64;
    writeln!(file, "BIOME DISTRIBUTION:")?;
    for (biome, count) in &counts {
        writeln!(file, "  {:<12} {:>8} ({:.1}%)", biome.label(), count, 100.0 * *count as f64 / total)?;
    }

    println!("Wrote biome_debug.txt ({} biomes, {:.1}% land)", counts.len(), world.land_fraction() * 100.0);
    Ok(())
}
