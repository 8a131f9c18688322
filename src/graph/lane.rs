use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Number of colors lanes cycle through unless a custom palette says otherwise.
pub const DEFAULT_PALETTE_SIZE: usize = 6;

/// A column of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lane(usize);

impl Lane {
    pub const fn new(position: usize) -> Self {
        Lane(position)
    }

    pub const fn position(self) -> usize {
        self.0
    }

    /// Palette slot for this lane. A zero-sized palette maps everything to slot 0.
    pub const fn color_index(self, palette_size: usize) -> usize {
        if palette_size == 0 {
            0
        } else {
            self.0 % palette_size
        }
    }
}

impl Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
