//! Rectangular blocks of tiles, the unit of merging
//!
//! A section owns a dense grid of optional tile ids; empty cells are holes
//! left behind when two sections of different heights (or widths) are joined.
//! Sections are never mutated after construction: a merge produces a new
//! section and both operands are retired.

use ndarray::Array2;
use std::collections::BTreeSet;

use crate::spatial::regions::RegionCoord;
use crate::spatial::tiles::TileId;

/// Stable identity of a section for the lifetime of a build
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId(pub usize);

/// Join direction of a merge
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// Sections are placed side by side; widths add up
    Horizontal,
    /// Sections are stacked; heights add up
    Vertical,
}

impl Axis {
    /// Both axes in canonical order
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Index of this axis in a `[x, y]` coordinate pair
    pub const fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

/// Axis-aligned bounds in projection space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum coordinate on each axis
    pub min: [f64; 2],
    /// Maximum coordinate on each axis
    pub max: [f64; 2],
}

impl Bounds {
    /// Degenerate bounds around a single point
    pub const fn point(coordinate: [f64; 2]) -> Self {
        Self {
            min: coordinate,
            max: coordinate,
        }
    }

    /// Smallest bounds covering both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let [ax0, ay0] = self.min;
        let [ax1, ay1] = self.max;
        let [bx0, by0] = other.min;
        let [bx1, by1] = other.max;
        Self {
            min: [ax0.min(bx0), ay0.min(by0)],
            max: [ax1.max(bx1), ay1.max(by1)],
        }
    }

    /// Lower edge along `axis`
    pub const fn lower(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.min[0],
            Axis::Vertical => self.min[1],
        }
    }

    /// Upper edge along `axis`
    pub const fn upper(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.max[0],
            Axis::Vertical => self.max[1],
        }
    }

    /// Midpoint along `axis`
    pub fn center(&self, axis: Axis) -> f64 {
        (self.lower(axis) + self.upper(axis)) / 2.0
    }

    /// Whether these bounds lie entirely at or before `other` along `axis`
    pub fn precedes(&self, other: &Self, axis: Axis) -> bool {
        self.upper(axis) <= other.lower(axis)
    }

    /// Empty space between the upper edge of `self` and the lower edge of `other`
    pub fn gap_to(&self, other: &Self, axis: Axis) -> f64 {
        (other.lower(axis) - self.upper(axis)).max(0.0)
    }
}

/// A rectangular block of tiles and holes
#[derive(Clone, Debug)]
pub struct Section {
    id: SectionId,
    /// Indexed `[row, col]`
    cells: Array2<Option<TileId>>,
    bounds: Bounds,
    regions: BTreeSet<RegionCoord>,
}

impl Section {
    /// A 1x1 section holding one tile
    pub fn singleton(
        id: SectionId,
        tile: TileId,
        coordinate: [f64; 2],
        region: RegionCoord,
    ) -> Self {
        Self {
            id,
            cells: Array2::from_elem((1, 1), Some(tile)),
            bounds: Bounds::point(coordinate),
            regions: BTreeSet::from([region]),
        }
    }

    /// Assemble a section from already-validated parts
    pub const fn from_parts(
        id: SectionId,
        cells: Array2<Option<TileId>>,
        bounds: Bounds,
        regions: BTreeSet<RegionCoord>,
    ) -> Self {
        Self {
            id,
            cells,
            bounds,
            regions,
        }
    }

    /// Section identity
    pub const fn id(&self) -> SectionId {
        self.id
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Grid of tile ids, indexed `[row, col]`
    pub const fn cells(&self) -> &Array2<Option<TileId>> {
        &self.cells
    }

    /// Consume the section, returning its grid
    pub fn into_cells(self) -> Array2<Option<TileId>> {
        self.cells
    }

    /// Coordinate-space bounds of the contained tiles
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Regions of the spatial index this section is registered in
    pub const fn regions(&self) -> &BTreeSet<RegionCoord> {
        &self.regions
    }

    /// Tile at `(col, row)`, `None` for holes or out-of-range positions
    pub fn cell(&self, col: usize, row: usize) -> Option<TileId> {
        self.cells.get((row, col)).copied().flatten()
    }

    /// Extent along the join axis
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    /// Extent perpendicular to the join axis
    pub fn cross_extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.height(),
            Axis::Vertical => self.width(),
        }
    }

    /// Tile at `along` positions down the join axis and `across` positions perpendicular to it
    ///
    /// With `flipped` the section is traversed in reverse along the join axis.
    pub fn cell_along(
        &self,
        axis: Axis,
        along: usize,
        across: usize,
        flipped: bool,
    ) -> Option<TileId> {
        let extent = self.extent(axis);
        if along >= extent {
            return None;
        }
        let along = if flipped { extent - 1 - along } else { along };
        match axis {
            Axis::Horizontal => self.cell(along, across),
            Axis::Vertical => self.cell(across, along),
        }
    }

    /// Difference between width and height
    pub fn skew(&self) -> usize {
        self.width().abs_diff(self.height())
    }

    /// Number of occupied cells
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Number of empty cells
    pub fn hole_count(&self) -> usize {
        self.cells.len() - self.tile_count()
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.cells.iter().filter_map(|cell| *cell)
    }
}
