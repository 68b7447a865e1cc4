//! World generation pipeline
//!
//! `Generator` derives every tunable from the world seed, then runs the stages
//! strictly in order: height noise, height masking, moisture noise, moisture
//! masking, biome assignment, cleanup. Work inside a stage is parallel; the
//! random draws that feed a stage always happen before it starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::biomes;
use crate::error::{MapGenError, Result};
use crate::export;
use crate::floatmap::{self, FloatMap};
use crate::masks;
use crate::noise_field;
use crate::point::Point;
use crate::progress::{Progress, Stage};
use crate::seeds::{world_seed_bits, SeedStream, WorldParams};
use crate::world::World;

/// Smallest side length the mask math supports.
pub const MIN_WORLD_SIZE: usize = 32;

/// Optional switches that alter generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationFlag {
    /// One large continent: halves the mask shape coefficient.
    Pangea,
}

impl GenerationFlag {
    pub fn id(&self) -> u8 {
        match self {
            GenerationFlag::Pangea => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationFlag::Pangea => "Pangea",
        }
    }

    /// Shape coefficient this flag imposes on every mask.
    pub fn shape_coeff(&self) -> f32 {
        match self {
            GenerationFlag::Pangea => 0.5,
        }
    }
}

/// Tunable constants of the pipeline. Defaults reproduce the canonical worlds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Octaves of height noise (default: 10).
    pub height_octaves: u32,

    /// Octaves of moisture noise (default: 12).
    pub moisture_octaves: u32,

    /// Half-open range the height persistence is drawn from.
    pub height_persistence: (f32, f32),

    /// Half-open range the moisture persistence is drawn from.
    pub moisture_persistence: (f32, f32),

    /// Weight of the central circular mask in the height mask.
    pub primary_mask_weight: f32,

    /// Weight of the extremity mask in the height mask.
    pub extremity_mask_weight: f32,

    /// Moisture mask radius as a fraction of the side length.
    pub moisture_mask_radius: f32,

    /// How far the polar center may stray from the grid center, as a fraction.
    pub polar_spread: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            height_octaves: 10,
            moisture_octaves: 12,
            height_persistence: (0.62, 0.74),
            moisture_persistence: (0.53, 0.68),
            primary_mask_weight: 0.75,
            extremity_mask_weight: 0.25,
            moisture_mask_radius: 0.8,
            polar_spread: 0.5,
        }
    }
}

impl PipelineParams {
    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: PipelineParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.height_octaves == 0 || self.moisture_octaves == 0 {
            return Err(MapGenError::config("octave counts must be at least 1"));
        }
        for (name, (lo, hi)) in [
            ("height_persistence", self.height_persistence),
            ("moisture_persistence", self.moisture_persistence),
        ] {
            if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo >= hi {
                return Err(MapGenError::config(format!(
                    "{} must be a non-empty positive range, got [{}, {})",
                    name, lo, hi
                )));
            }
        }
        if !(self.primary_mask_weight.is_finite() && self.extremity_mask_weight.is_finite()) {
            return Err(MapGenError::config("mask weights must be finite"));
        }
        if !self.moisture_mask_radius.is_finite() || self.moisture_mask_radius <= 0.0 {
            return Err(MapGenError::config("moisture_mask_radius must be positive"));
        }
        if !(0.0..=1.0).contains(&self.polar_spread) {
            return Err(MapGenError::config("polar_spread must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Runs the pipeline for one `(size, seed)` pair.
pub struct Generator {
    size: usize,
    seed: i32,
    flags: Vec<GenerationFlag>,
    params: PipelineParams,
    progress: Arc<Progress>,
}

impl Generator {
    /// Rejects sizes too small for the masks before anything is drawn.
    pub fn new(size: usize, seed: i32) -> Result<Self> {
        if size < MIN_WORLD_SIZE {
            return Err(MapGenError::config(format!(
                "world size {} is below the minimum of {}",
                size, MIN_WORLD_SIZE
            )));
        }
        Ok(Self {
            size,
            seed,
            flags: Vec::new(),
            params: PipelineParams::default(),
            progress: Arc::new(Progress::new()),
        })
    }

    pub fn with_flag(mut self, flag: GenerationFlag) -> Self {
        info!("Flag set: {}", flag.label());
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }

    pub fn with_params(mut self, params: PipelineParams) -> Result<Self> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn flags(&self) -> &[GenerationFlag] {
        &self.flags
    }

    /// Shared handle for observers polling from another thread.
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Generate the world without writing anything.
    pub fn generate(&self) -> Result<World> {
        let world = self.build()?;
        self.checkpoint(Stage::Done)?;
        Ok(world)
    }

    /// Generate the world and write its biome map into `output_dir`.
    ///
    /// The written path is published on the progress handle before `Done`.
    pub fn run(&self, output_dir: &Path) -> Result<(World, PathBuf)> {
        let world = self.build()?;
        let path = self.write_map(&world, output_dir)?;
        Ok((world, path))
    }

    /// Cancellation is honoured only before the file is created. Once the map
    /// is on disk the run finishes as `Done`.
    fn write_map(&self, world: &World, output_dir: &Path) -> Result<PathBuf> {
        self.ensure_running(Stage::Done)?;
        let path = output_dir.join(world.output_file_name());
        export::export_biome_map(world, &path)?;
        self.progress.set_output_path(path.clone());
        self.publish(Stage::Done);
        Ok(path)
    }

    /// Every stage up to and including cleanup.
    fn build(&self) -> Result<World> {
        let size = self.size;
        let p = &self.params;

        // Draw order is fixed: changing it changes every world.
        let mut stream = SeedStream::for_world(self.seed);
        let mut params = WorldParams::derive(self.seed, &mut stream);
        for flag in &self.flags {
            params.shape_coeff = flag.shape_coeff();
        }
        info!(
            seed = self.seed,
            size,
            randomness = params.randomness,
            height_modifier = params.height_modifier,
            moisture_modifier = params.moisture_modifier,
            shape_coeff = params.shape_coeff,
            "Derived world parameters"
        );

        let height_seed = stream.noise_seed();
        let height_persistence = stream.range(p.height_persistence.0, p.height_persistence.1);
        let moisture_persistence = stream.range(p.moisture_persistence.0, p.moisture_persistence.1);
        let half = (size / 2) as i32;
        let polar_center = Point::new(
            stream.int_within(half, p.polar_spread),
            stream.int_within(half, p.polar_spread),
        );
        let moisture_seed = stream.noise_seed();

        // Height
        self.checkpoint(Stage::GeneratingHeight)?;
        debug!(
            height_seed,
            octaves = p.height_octaves,
            persistence = height_persistence,
            "Seeding height noise"
        );
        let mut height_noise = noise_field::generate(
            size,
            height_seed,
            p.height_octaves,
            height_persistence as f64,
        );
        height_noise.rescale_to(0.0, 1.0)?;
        height_noise.invert();

        self.checkpoint(Stage::MaskingHeight)?;
        let mut primary = masks::circular_mask(size, params.shape_coeff)?;
        primary.rescale_to(0.0, 1.0)?;
        let extremity = masks::extremity_mask(size, world_seed_bits(self.seed))?;
        let mut heightmap =
            floatmap::weighted_blend(&primary, &extremity, p.primary_mask_weight, p.extremity_mask_weight)?;
        heightmap.multiply_blend(&height_noise)?;
        finish_field(&mut heightmap, params.height_modifier)?;

        // Moisture
        self.checkpoint(Stage::GeneratingMoisture)?;
        debug!(
            moisture_seed,
            octaves = p.moisture_octaves,
            persistence = moisture_persistence,
            polar_center = %polar_center,
            "Seeding moisture noise"
        );
        let mut moisture_noise = noise_field::generate(
            size,
            moisture_seed,
            p.moisture_octaves,
            moisture_persistence as f64,
        );
        moisture_noise.rescale_to(0.0, 1.0)?;
        moisture_noise.invert();

        self.checkpoint(Stage::MaskingMoisture)?;
        let radius = (size as f32 * p.moisture_mask_radius) as i32;
        let moisture_mask =
            masks::defined_circular_mask(size, polar_center, radius, params.shape_coeff, 1.0)?;
        let mut moisture = floatmap::multiply(&moisture_noise, &moisture_mask)?;
        finish_field(&mut moisture, params.moisture_modifier)?;

        // Biomes
        self.checkpoint(Stage::AssigningBiomes)?;
        let mut world = World::new(params, heightmap, moisture)?;
        biomes::assign_biomes(&mut world)?;

        self.checkpoint(Stage::Finalizing)?;
        let removed = biomes::remove_isolated_tiles(&mut world.biomes);
        debug!(removed, "Removed isolated tiles");

        Ok(world)
    }

    /// Stop if cancellation was requested, otherwise publish `stage`.
    fn checkpoint(&self, stage: Stage) -> Result<()> {
        self.ensure_running(stage)?;
        self.publish(stage);
        Ok(())
    }

    fn ensure_running(&self, stage: Stage) -> Result<()> {
        if self.progress.is_cancelled() {
            info!(stage = stage.status(), "Generation cancelled");
            return Err(MapGenError::Cancelled { stage });
        }
        Ok(())
    }

    fn publish(&self, stage: Stage) {
        self.progress.advance(stage);
        info!("[{:>3}%] {}", stage.percent(), stage.status());
    }
}

/// Apply the seed-derived offset, then settle the field into [0, 1].
fn finish_field(field: &mut FloatMap, modifier: f32) -> Result<()> {
    field.add_within_range(modifier, 0.0, 1.0);
    field.rescale_to(0.0, 1.0)?;
    field.clamp_to_range();
    Ok(())
}
