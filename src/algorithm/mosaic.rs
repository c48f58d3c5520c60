//! Finished mosaics and partial results of cancelled builds

use ndarray::Array2;

use crate::algorithm::bitset::TileBitset;
use crate::io::error::{Result, invariant_violation};
use crate::spatial::tiles::TileId;

/// Build stage of a [`MosaicBuilder`](crate::algorithm::builder::MosaicBuilder)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Projection, tiles and singleton sections are being prepared
    Seed,
    /// Ordered merges under a growing distance threshold
    ProgressiveMerge,
    /// Unconstrained merges until one section remains
    Stitch,
    /// A single section covers every tile
    Done,
}

/// Rectangular grid of tile ids with holes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicGrid {
    /// Indexed `[row, col]`
    cells: Array2<Option<TileId>>,
}

impl MosaicGrid {
    /// Wrap a section grid
    pub const fn new(cells: Array2<Option<TileId>>) -> Self {
        Self { cells }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Tile at `(col, row)`; `None` for holes and out-of-range positions
    pub fn get(&self, col: usize, row: usize) -> Option<TileId> {
        self.cells.get((row, col)).copied().flatten()
    }

    /// Occupied cells as `(col, row, tile)`
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        self.cells
            .indexed_iter()
            .filter_map(|((row, col), cell)| cell.map(|tile| (col, row, tile)))
    }

    /// Number of occupied cells
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Number of empty cells
    pub fn hole_count(&self) -> usize {
        self.cells.len() - self.tile_count()
    }

    /// Raw grid, indexed `[row, col]`
    pub const fn cells(&self) -> &Array2<Option<TileId>> {
        &self.cells
    }
}

/// Check that `grids` together hold every tile in `0..tile_count` exactly once
///
/// # Errors
///
/// Returns an invariant error naming the first duplicated, out-of-range or
/// missing tile.
pub fn verify_partition<'a>(
    grids: impl IntoIterator<Item = &'a MosaicGrid>,
    tile_count: usize,
) -> Result<()> {
    let mut seen = TileBitset::new(tile_count);
    for grid in grids {
        for (col, row, tile) in grid.occupied() {
            if !seen.insert(tile) {
                return Err(invariant_violation(
                    "verify_partition",
                    &format!("tile {tile} at ({col}, {row}) is duplicated or out of range"),
                ));
            }
        }
    }

    if !seen.is_full() {
        return Err(invariant_violation(
            "verify_partition",
            &format!("tiles missing from the grid: {:?}", seen.missing()),
        ));
    }
    Ok(())
}

/// A complete mosaic: one grid covering every usable tile
#[derive(Clone, Debug)]
pub struct Mosaic<P> {
    grid: MosaicGrid,
    payloads: Vec<P>,
    excluded: Vec<P>,
}

impl<P> Mosaic<P> {
    /// Assemble a mosaic; `payloads` is indexed by tile id
    pub const fn new(grid: MosaicGrid, payloads: Vec<P>, excluded: Vec<P>) -> Self {
        Self {
            grid,
            payloads,
            excluded,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Payload at `(col, row)`; `None` for holes
    pub fn get(&self, col: usize, row: usize) -> Option<&P> {
        self.grid
            .get(col, row)
            .and_then(|tile| self.payloads.get(tile))
    }

    /// Rows top to bottom, each a left-to-right sequence of cells
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&P>>> + '_ {
        (0..self.height()).map(move |row| (0..self.width()).map(|col| self.get(col, row)).collect())
    }

    /// Occupied cells as `(col, row, payload)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &P)> + '_ {
        self.grid
            .occupied()
            .filter_map(|(col, row, tile)| self.payloads.get(tile).map(|p| (col, row, p)))
    }

    /// Underlying tile-id grid
    pub const fn grid(&self) -> &MosaicGrid {
        &self.grid
    }

    /// Payloads of placed tiles, indexed by tile id
    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    /// Payloads dropped up front for lacking the requested color
    pub fn excluded(&self) -> &[P] {
        &self.excluded
    }

    /// Number of occupied cells
    pub fn tile_count(&self) -> usize {
        self.grid.tile_count()
    }

    /// Number of empty cells
    pub fn hole_count(&self) -> usize {
        self.grid.hole_count()
    }

    /// Check the grid holds every placed tile exactly once
    ///
    /// # Errors
    ///
    /// Returns an invariant error if a tile is duplicated or missing.
    pub fn verify_partition(&self) -> Result<()> {
        verify_partition([&self.grid], self.payloads.len())
    }
}

/// Fragments left when a build is cancelled before stitching finished
#[derive(Clone, Debug)]
pub struct PartialMosaic<P> {
    phase: Phase,
    fragments: Vec<MosaicGrid>,
    payloads: Vec<P>,
    excluded: Vec<P>,
}

impl<P> PartialMosaic<P> {
    /// Assemble a partial result
    pub const fn new(
        phase: Phase,
        fragments: Vec<MosaicGrid>,
        payloads: Vec<P>,
        excluded: Vec<P>,
    ) -> Self {
        Self {
            phase,
            fragments,
            payloads,
            excluded,
        }
    }

    /// Phase that was interrupted
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Every live section at the time of cancellation
    pub fn fragments(&self) -> &[MosaicGrid] {
        &self.fragments
    }

    /// Payloads indexed by tile id
    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    /// Payloads dropped up front for lacking the requested color
    pub fn excluded(&self) -> &[P] {
        &self.excluded
    }

    /// Check the fragments together hold every placed tile exactly once
    ///
    /// # Errors
    ///
    /// Returns an invariant error if a tile is duplicated or missing.
    pub fn verify_partition(&self) -> Result<()> {
        verify_partition(&self.fragments, self.payloads.len())
    }

    /// Promote the fragment with the most tiles to a standalone mosaic
    ///
    /// Payloads are shared with the full tile set, so holes and other
    /// fragments' tiles simply don't appear in the returned grid.
    pub fn into_largest(self) -> Option<Mosaic<P>> {
        let largest = self
            .fragments
            .into_iter()
            .max_by_key(MosaicGrid::tile_count)?;
        Some(Mosaic::new(largest, self.payloads, self.excluded))
    }
}

/// Result of running a build
#[derive(Clone, Debug)]
pub enum BuildOutcome<P> {
    /// Every tile placed in a single grid
    Complete(Mosaic<P>),
    /// Build cancelled; fragments are still a partition of the tiles
    Incomplete(PartialMosaic<P>),
}

impl<P> BuildOutcome<P> {
    /// Whether the build ran to completion
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// The finished mosaic, if any
    pub fn complete(self) -> Option<Mosaic<P>> {
        match self {
            Self::Complete(mosaic) => Some(mosaic),
            Self::Incomplete(_) => None,
        }
    }
}
