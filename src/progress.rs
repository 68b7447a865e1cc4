//! Generation progress published to a polling consumer
//!
//! The generator advances a `Stage` atomically; any thread holding the shared
//! `Progress` can take a `Snapshot` at any time. Stages only move forward, so the
//! reported percentage never decreases.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Preparing,
    GeneratingHeight,
    MaskingHeight,
    GeneratingMoisture,
    MaskingMoisture,
    AssigningBiomes,
    Finalizing,
    Done,
}

impl Stage {
    /// Returns all stages in order.
    pub fn all() -> &'static [Stage] {
        &[
            Self::Preparing,
            Self::GeneratingHeight,
            Self::MaskingHeight,
            Self::GeneratingMoisture,
            Self::MaskingMoisture,
            Self::AssigningBiomes,
            Self::Finalizing,
            Self::Done,
        ]
    }

    /// Status line shown while the stage runs.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Preparing => "Preparing",
            Self::GeneratingHeight => "Generating heightmap",
            Self::MaskingHeight => "Masking heightmap",
            Self::GeneratingMoisture => "Generating moisture map",
            Self::MaskingMoisture => "Masking moisture map",
            Self::AssigningBiomes => "Assigning biomes",
            Self::Finalizing => "Finalizing",
            Self::Done => "Done",
        }
    }

    /// Fixed progress checkpoint for the stage.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Preparing => 0,
            Self::GeneratingHeight => 5,
            Self::MaskingHeight => 25,
            Self::GeneratingMoisture => 50,
            Self::MaskingMoisture => 75,
            Self::AssigningBiomes => 88,
            Self::Finalizing => 95,
            Self::Done => 100,
        }
    }

    /// Position in execution order (0-7).
    pub fn index(&self) -> usize {
        *self as usize
    }

    fn from_index(idx: usize) -> Stage {
        Self::all()[idx.min(Self::all().len() - 1)]
    }
}

/// Point-in-time view of a running generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub stage: Stage,
    pub status: &'static str,
    pub percent: u8,
    pub output_path: Option<PathBuf>,
}

/// Thread-safe progress channel between the generator and its observers.
#[derive(Debug, Default)]
pub struct Progress {
    stage: AtomicUsize,
    cancelled: AtomicBool,
    output_path: Mutex<Option<PathBuf>>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `stage`. Moving backwards is ignored.
    pub fn advance(&self, stage: Stage) {
        self.stage.fetch_max(stage.index(), Ordering::SeqCst);
    }

    pub fn stage(&self) -> Stage {
        Stage::from_index(self.stage.load(Ordering::SeqCst))
    }

    pub fn percent(&self) -> u8 {
        self.stage().percent()
    }

    pub fn status(&self) -> &'static str {
        self.stage().status()
    }

    /// Ask the generator to stop at the next stage boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Record where the finished map was written.
    pub fn set_output_path(&self, path: PathBuf) {
        if let Ok(mut slot) = self.output_path.lock() {
            *slot = Some(path);
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        let stage = self.stage();
        Snapshot {
            stage,
            status: stage.status(),
            percent: stage.percent(),
            output_path: self.output_path(),
        }
    }
}
