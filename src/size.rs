//! Fixed world sizes offered by the command line.

/// Side length choices, from quick previews to full-scale maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum WorldSize {
    #[default]
    Tiny,
    Small,
    Standard,
    Large,
    Massive,
}

impl WorldSize {
    pub const ALL: [WorldSize; 5] = [
        WorldSize::Tiny,
        WorldSize::Small,
        WorldSize::Standard,
        WorldSize::Large,
        WorldSize::Massive,
    ];

    /// Side length in tiles
    pub fn tiles(&self) -> usize {
        match self {
            WorldSize::Tiny => 512,
            WorldSize::Small => 1024,
            WorldSize::Standard => 2048,
            WorldSize::Large => 4096,
            WorldSize::Massive => 8192,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorldSize::Tiny => "Tiny (512)",
            WorldSize::Small => "Small (1024)",
            WorldSize::Standard => "Standard (2048)",
            WorldSize::Large => "Large (4096)",
            WorldSize::Massive => "Massive (8192)",
        }
    }

    pub fn from_tiles(tiles: usize) -> Option<WorldSize> {
        Self::ALL.into_iter().find(|s| s.tiles() == tiles)
    }
}

impl std::fmt::Display for WorldSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
