use std::path::{Path, PathBuf};
use std::panic;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::Parser;

use mapgen::export;
use mapgen::logging;
use mapgen::{GenerationFlag, Generator, PipelineParams, Result, Stage, World, WorldSize};

/// How often the front end samples generation progress.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "mapgen")]
#[command(about = "Generate deterministic 2D world maps from a seed")]
struct Args {
    /// World size
    #[arg(long, value_enum, default_value_t = WorldSize::Tiny)]
    size: WorldSize,

    /// World seed (uses random seed if not specified)
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<i32>,

    /// Grow one large continent instead of scattered land
    #[arg(long)]
    pangea: bool,

    /// Directory the map and any extra exports are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also export the heightmap as a greyscale PNG
    #[arg(long)]
    export_height: bool,

    /// Also export the moisture map as a greyscale PNG
    #[arg(long)]
    export_moisture: bool,

    /// Also export a banded heat map of the heightmap
    #[arg(long)]
    heat_map: bool,

    /// Write a JSON summary next to the map
    #[arg(long)]
    summary: bool,

    /// JSON file overriding pipeline parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);

    println!("Generating world with seed: {}", seed);
    println!("Map size: {}", args.size);

    let mut generator = Generator::new(args.size.tiles(), seed)?;
    if args.pangea {
        generator = generator.with_flag(GenerationFlag::Pangea);
    }
    if let Some(path) = &args.params {
        println!("Loading pipeline parameters from {}", path.display());
        generator = generator.with_params(PipelineParams::from_json_file(path)?)?;
    }

    std::fs::create_dir_all(&args.output_dir)?;

    // Generate on a worker thread and poll progress from this one
    let progress = generator.progress();
    let output_dir = args.output_dir.clone();
    let worker = thread::spawn(move || generator.run(&output_dir));

    let mut last_stage: Option<Stage> = None;
    loop {
        let finished = worker.is_finished();
        let snapshot = progress.snapshot();
        if last_stage != Some(snapshot.stage) {
            println!("[{:>3}%] {}", snapshot.percent, snapshot.status);
            last_stage = Some(snapshot.stage);
        }
        if finished {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    let (world, path) = join_worker(worker)?;

    println!("Wrote {}", path.display());
    println!("Land: {:.1}%", world.land_fraction() * 100.0);

    write_extras(&args, &world, &args.output_dir)
}

/// Optional exports requested on the command line.
fn write_extras(args: &Args, world: &World, dir: &Path) -> Result<()> {
    let seed = world.seed();

    if args.export_height {
        let path = dir.join(format!("mapgen-{}-height.png", seed));
        export::export_floatmap_png(&world.heightmap, &path)?;
        println!("Wrote {}", path.display());
    }

    if args.export_moisture {
        let path = dir.join(format!("mapgen-{}-moisture.png", seed));
        export::export_floatmap_png(&world.moisture, &path)?;
        println!("Wrote {}", path.display());
    }

    if args.heat_map {
        let path = dir.join(format!("mapgen-{}-heat.png", seed));
        export::export_heat_map(&world.heightmap, &path)?;
        println!("Wrote {}", path.display());
    }

    if args.summary {
        let path = dir.join(format!("mapgen-{}.json", seed));
        export::export_summary(world, &path)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Wait for the generation thread. A panic in the worker is re-raised here
/// with its original payload.
fn join_worker<T>(worker: JoinHandle<Result<T>>) -> Result<T> {
    match worker.join() {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}
