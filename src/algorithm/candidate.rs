//! Merge candidates: proposed concatenations of two sections along one axis
//!
//! Candidates are cheap to generate and carry only the join geometry (axis,
//! flips, perpendicular shifts) and a ranked cost. The merged grid is built
//! lazily by [`MergeCandidate::materialize`] once the scheduler commits to it.

use ndarray::Array2;
use std::cmp::Ordering;

use crate::io::configuration::{FORCE_GAP_WEIGHT, UNMATCHED_SEAM_DISTANCE};
use crate::io::error::{Result, invariant_violation};
use crate::math::vector::distance;
use crate::spatial::section::{Axis, Section, SectionId};
use crate::spatial::tiles::TileId;

/// Unordered pair of sections, smaller id first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(pub SectionId, pub SectionId);

impl PairKey {
    /// Normalize two ids into a key
    pub fn new(a: SectionId, b: SectionId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// Ranked cost of a merge, compared lexicographically
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeCost {
    /// Hole penalty
    pub holes: usize,
    /// Seam distance, plus the weighted gap for forced merges
    pub distance: f64,
}

impl MergeCost {
    /// Lexicographic total order: holes first, then distance
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.holes
            .cmp(&other.holes)
            .then(self.distance.total_cmp(&other.distance))
    }
}

/// Limits applied to ordered merges during progressive rounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeLimits {
    /// Largest seam distance accepted
    pub max_distance: f64,
    /// Largest hole estimate accepted; `None` disables the check
    pub max_holes: Option<usize>,
}

/// Proposed concatenation of `first` followed by `second` along `axis`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeCandidate {
    /// Section placed first (left or top)
    pub first: SectionId,
    /// Section placed second (right or bottom)
    pub second: SectionId,
    /// Join direction
    pub axis: Axis,
    /// Whether `first` is reversed along the join axis
    pub flip_first: bool,
    /// Whether `second` is reversed along the join axis
    pub flip_second: bool,
    /// Perpendicular offset of `first` inside the merged grid
    pub shift_first: usize,
    /// Perpendicular offset of `second` inside the merged grid
    pub shift_second: usize,
    /// Empty cells the join introduces
    pub empty_cells: usize,
    /// Ranked cost
    pub cost: MergeCost,
}

impl Eq for MergeCandidate {}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeCandidate {
    /// Cheaper candidates order first; ties break on geometry so ordering is total
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.empty_cells.cmp(&other.empty_cells))
            .then(self.first.cmp(&other.first))
            .then(self.second.cmp(&other.second))
            .then(self.axis.cmp(&other.axis))
            .then(self.flip_first.cmp(&other.flip_first))
            .then(self.flip_second.cmp(&other.flip_second))
            .then(self.shift_first.cmp(&other.shift_first))
            .then(self.shift_second.cmp(&other.shift_second))
    }
}

impl MergeCandidate {
    /// Unordered pair this candidate joins
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.first, self.second)
    }

    /// Whether the candidate consumes section `id`
    pub fn involves(&self, id: SectionId) -> bool {
        self.first == id || self.second == id
    }

    /// `(width, height)` of the merged grid
    pub fn merged_dimensions(&self, first: &Section, second: &Section) -> (usize, usize) {
        merged_dimensions(first, second, self.axis)
    }

    /// Build the merged section
    ///
    /// Bounds and regions are the unions of both operands. Flips reorder grid
    /// cells only, so they never affect the coordinate-space bounds.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the operands don't match the candidate
    /// or a cell would be written twice.
    pub fn materialize(&self, id: SectionId, first: &Section, second: &Section) -> Result<Section> {
        if first.id() != self.first || second.id() != self.second {
            return Err(invariant_violation(
                "materialize",
                &format!(
                    "candidate joins {:?}+{:?} but got {:?}+{:?}",
                    self.first,
                    self.second,
                    first.id(),
                    second.id()
                ),
            ));
        }

        let (width, height) = self.merged_dimensions(first, second);
        let mut cells: Array2<Option<TileId>> = Array2::from_elem((height, width), None);

        let placements = [
            (first, self.flip_first, 0, self.shift_first),
            (second, self.flip_second, first.extent(self.axis), self.shift_second),
        ];
        for (section, flipped, along_offset, across_offset) in placements {
            for along in 0..section.extent(self.axis) {
                for across in 0..section.cross_extent(self.axis) {
                    let Some(tile) = section.cell_along(self.axis, along, across, flipped) else {
                        continue;
                    };
                    let (col, row) = match self.axis {
                        Axis::Horizontal => (along + along_offset, across + across_offset),
                        Axis::Vertical => (across + across_offset, along + along_offset),
                    };
                    let slot = cells.get_mut((row, col)).ok_or_else(|| {
                        invariant_violation(
                            "materialize",
                            &format!("cell ({col}, {row}) outside {width}x{height} grid"),
                        )
                    })?;
                    if slot.is_some() {
                        return Err(invariant_violation(
                            "materialize",
                            &format!("cell ({col}, {row}) written twice"),
                        ));
                    }
                    *slot = Some(tile);
                }
            }
        }

        let bounds = first.bounds().union(second.bounds());
        let regions = first.regions().union(second.regions()).copied().collect();

        Ok(Section::from_parts(id, cells, bounds, regions))
    }
}

/// Ordered merge candidates between `a` and `b`
///
/// Tries both orders on both axes, proposing a join only where the sections
/// are already ordered along that axis. Candidates over the hole budget,
/// without any facing tiles, or with a seam above `limits.max_distance` are
/// rejected. Survivors are ranked by seam distance alone.
pub fn merge(
    a: &Section,
    b: &Section,
    colors: &[[f64; 3]],
    limits: MergeLimits,
) -> Vec<MergeCandidate> {
    let mut candidates = Vec::new();

    for axis in Axis::ALL {
        for (first, second) in [(a, b), (b, a)] {
            if !first.bounds().precedes(second.bounds(), axis) {
                continue;
            }

            let holes = hole_estimate(first, second, axis);
            if limits.max_holes.is_some_and(|budget| holes > budget) {
                continue;
            }

            let seam = best_seam(first, second, axis, false, false, colors);
            let Some(distance) = seam.distance else {
                continue;
            };
            if distance > limits.max_distance {
                continue;
            }

            candidates.push(MergeCandidate {
                first: first.id(),
                second: second.id(),
                axis,
                flip_first: false,
                flip_second: false,
                shift_first: seam.shift_first,
                shift_second: seam.shift_second,
                empty_cells: empty_cells(first, second, axis),
                cost: MergeCost { holes: 0, distance },
            });
        }
    }

    candidates
}

/// Unconstrained merge candidates between `a` and `b`
///
/// Always returns at least one candidate per axis: the plain join in
/// coordinate order, plus a join with the smaller section reversed along
/// the axis when that reversal changes anything. Costs rank by introduced
/// empty cells, then seam distance plus the weighted coordinate gap.
pub fn force_merge(a: &Section, b: &Section, colors: &[[f64; 3]]) -> Vec<MergeCandidate> {
    let mut candidates = Vec::new();

    for axis in Axis::ALL {
        let (first, second) = coordinate_order(a, b, axis);
        let flip_first_side = first.tile_count() < second.tile_count();

        let mut orientations = vec![(false, false)];
        let flipped = if flip_first_side { first } else { second };
        if flipped.extent(axis) > 1 {
            orientations.push((flip_first_side, !flip_first_side));
        }

        let gap = first.bounds().gap_to(second.bounds(), axis);
        let empty = empty_cells(first, second, axis);

        for (flip_first, flip_second) in orientations {
            let seam = best_seam(first, second, axis, flip_first, flip_second, colors);
            let seam_distance = seam.distance.unwrap_or(UNMATCHED_SEAM_DISTANCE);
            candidates.push(MergeCandidate {
                first: first.id(),
                second: second.id(),
                axis,
                flip_first,
                flip_second,
                shift_first: seam.shift_first,
                shift_second: seam.shift_second,
                empty_cells: empty,
                cost: MergeCost {
                    holes: empty,
                    distance: FORCE_GAP_WEIGHT.mul_add(gap, seam_distance),
                },
            });
        }
    }

    candidates
}

/// `(width, height)` of `first` and `second` joined along `axis`
pub fn merged_dimensions(first: &Section, second: &Section, axis: Axis) -> (usize, usize) {
    match axis {
        Axis::Horizontal => (
            first.width() + second.width(),
            first.height().max(second.height()),
        ),
        Axis::Vertical => (
            first.width().max(second.width()),
            first.height() + second.height(),
        ),
    }
}

/// Hole penalty of joining `first` and `second` along `axis`
///
/// Perpendicular mismatch times the combined parallel extent, adjusted by
/// an elongation term: growing skew beyond the worse operand is inflated
/// by the larger dimension, reducing skew earns a bonus. A plain 1x2 or
/// 2x1 pair is never penalized for elongation.
pub fn hole_estimate(first: &Section, second: &Section, axis: Axis) -> usize {
    let mismatch = first.cross_extent(axis).abs_diff(second.cross_extent(axis));
    let base = mismatch.saturating_mul(first.extent(axis) + second.extent(axis));

    let (width, height) = merged_dimensions(first, second, axis);
    let is_pair = (width, height) == (1, 2) || (width, height) == (2, 1);

    let skew = width.abs_diff(height) as i64;
    let mut elongation = skew - first.skew().max(second.skew()) as i64;
    if is_pair {
        elongation = 0;
    } else if elongation > 0 {
        let scale = (width.max(height) as i64).saturating_mul(1 + base as i64);
        elongation = elongation.saturating_mul(scale);
    }

    (base as i64).saturating_add(elongation).max(0) as usize
}

/// Cells of the merged grid left empty by the join itself
pub fn empty_cells(first: &Section, second: &Section, axis: Axis) -> usize {
    let (cross_first, cross_second) = (first.cross_extent(axis), second.cross_extent(axis));
    let shorter_extent = if cross_first < cross_second {
        first.extent(axis)
    } else {
        second.extent(axis)
    };
    cross_first.abs_diff(cross_second) * shorter_extent
}

/// Best perpendicular alignment found for a join
#[derive(Clone, Copy, Debug, PartialEq)]
struct Seam {
    shift_first: usize,
    shift_second: usize,
    /// Worst facing-pair distance at the chosen alignment; `None` if no tiles face each other
    distance: Option<f64>,
}

/// Slide the shorter side along the longer one, minimizing the worst facing-pair distance
fn best_seam(
    first: &Section,
    second: &Section,
    axis: Axis,
    flip_first: bool,
    flip_second: bool,
    colors: &[[f64; 3]],
) -> Seam {
    let (cross_first, cross_second) = (first.cross_extent(axis), second.cross_extent(axis));
    let overlap = cross_first.min(cross_second);
    let last_along = first.extent(axis).saturating_sub(1);

    let mut best = Seam {
        shift_first: 0,
        shift_second: 0,
        distance: None,
    };

    for offset in 0..=cross_first.abs_diff(cross_second) {
        let (shift_first, shift_second) = if cross_second > cross_first {
            (offset, 0)
        } else {
            (0, offset)
        };

        let mut worst: Option<f64> = None;
        for j in 0..overlap {
            // Merged row (or column) j + max(shift) holds both facing cells
            let across_first = j + shift_second;
            let across_second = j + shift_first;
            let facing_first = first.cell_along(axis, last_along, across_first, flip_first);
            let facing_second = second.cell_along(axis, 0, across_second, flip_second);
            if let (Some(tile_a), Some(tile_b)) = (facing_first, facing_second) {
                if let (Some(color_a), Some(color_b)) = (colors.get(tile_a), colors.get(tile_b)) {
                    let d = distance(color_a, color_b);
                    worst = Some(worst.map_or(d, |w| w.max(d)));
                }
            }
        }

        if let Some(candidate) = worst {
            if best.distance.is_none_or(|current| candidate < current) {
                best = Seam {
                    shift_first,
                    shift_second,
                    distance: Some(candidate),
                };
            }
        }
    }

    best
}

/// Order two sections by the centre of their bounds along `axis`, ties by id
fn coordinate_order<'a>(a: &'a Section, b: &'a Section, axis: Axis) -> (&'a Section, &'a Section) {
    match a
        .bounds()
        .center(axis)
        .total_cmp(&b.bounds().center(axis))
        .then(a.id().cmp(&b.id()))
    {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}
