//! Deterministic world map generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod biomes;
pub mod error;
pub mod export;
pub mod floatmap;
pub mod generator;
pub mod logging;
pub mod masks;
pub mod noise_field;
pub mod point;
pub mod progress;
pub mod seeds;
pub mod size;
pub mod tilemap;
pub mod world;

pub use biomes::Biome;
pub use error::{MapGenError, Result};
pub use floatmap::FloatMap;
pub use generator::{GenerationFlag, Generator, PipelineParams, MIN_WORLD_SIZE};
pub use progress::{Progress, Snapshot, Stage};
pub use size::WorldSize;
pub use world::World;
