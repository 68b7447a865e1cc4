//! Error taxonomy for map generation
//!
//! Every failure the pipeline can report is a `MapGenError`. Generation is fully
//! deterministic, so a failure for a given size/seed reproduces identically and
//! should be treated as a configuration problem rather than a transient one.

use std::fmt;

use crate::progress::Stage;

/// Errors produced by grids, masks, classification, and the output writers.
#[derive(Debug)]
pub enum MapGenError {
    /// Coordinate outside the grid. Always a programming defect.
    Index {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
    /// Invalid size, seed, or parameter combination
    Configuration(String),
    /// Smoothing adjustment computed outside [0, 1]
    Range { x: usize, y: usize, adjustment: f32 },
    /// Cell left without a biome after classification (gap in the range table)
    Unclassified {
        x: usize,
        y: usize,
        height: f32,
        moisture: f32,
    },
    /// Cancellation observed at a stage boundary
    Cancelled { stage: Stage },
    /// Failed to encode or save an image
    Image(image::ImageError),
    /// Failed to read or write a file
    Io(std::io::Error),
    /// Failed to (de)serialize JSON
    Json(serde_json::Error),
}

impl MapGenError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        MapGenError::Configuration(msg.into())
    }
}

impl fmt::Display for MapGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapGenError::Index { x, y, width, height } => write!(
                f,
                "Grid access ({}, {}) is outside a {}x{} grid",
                x, y, width, height
            ),
            MapGenError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            MapGenError::Range { x, y, adjustment } => write!(
                f,
                "Smoothing adjustment {} at ({}, {}) is outside [0, 1]; check radius and tolerance",
                adjustment, x, y
            ),
            MapGenError::Unclassified { x, y, height, moisture } => write!(
                f,
                "No biome covers ({}, {}) with height={} moisture={}",
                x, y, height, moisture
            ),
            MapGenError::Cancelled { stage } => {
                write!(f, "Generation cancelled before '{}'", stage.status())
            }
            MapGenError::Image(e) => write!(f, "Failed to write image: {}", e),
            MapGenError::Io(e) => write!(f, "I/O error: {}", e),
            MapGenError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for MapGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapGenError::Image(e) => Some(e),
            MapGenError::Io(e) => Some(e),
            MapGenError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for MapGenError {
    fn from(e: image::ImageError) -> Self {
        MapGenError::Image(e)
    }
}

impl From<std::io::Error> for MapGenError {
    fn from(e: std::io::Error) -> Self {
        MapGenError::Io(e)
    }
}

impl From<serde_json::Error> for MapGenError {
    fn from(e: serde_json::Error) -> Self {
        MapGenError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, MapGenError>;
