use bitvec::prelude::*;
use std::fmt;

use crate::spatial::tiles::TileId;

/// Fixed-size bitset recording which tiles have been seen
///
/// Used to check that a set of grids covers every tile exactly once.
/// Uses 0-based tile ids, matching [`TileId`].
#[derive(Clone, Debug)]
pub struct TileBitset {
    bits: BitVec,
    max_tiles: usize,
}

impl TileBitset {
    /// Create a bitset with no tiles present
    pub fn new(max_tiles: usize) -> Self {
        Self {
            bits: bitvec![0; max_tiles],
            max_tiles,
        }
    }

    /// Insert a tile, returning `false` if it was already present or out of range
    pub fn insert(&mut self, tile: TileId) -> bool {
        if tile >= self.max_tiles || self.contains(tile) {
            return false;
        }
        self.bits.set(tile, true);
        true
    }

    /// Test tile membership
    pub fn contains(&self, tile: TileId) -> bool {
        self.bits.get(tile).as_deref() == Some(&true)
    }

    /// Test if every tile is present
    pub fn is_full(&self) -> bool {
        self.bits.all()
    }

    /// Count tiles in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Tiles not yet inserted
    pub fn missing(&self) -> Vec<TileId> {
        self.bits.iter_zeros().collect()
    }
}

impl fmt::Display for TileBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileBitset({}/{} tiles)", self.count(), self.max_tiles)
    }
}
