//! Coarse region buckets for approximate nearest-neighbor search
//!
//! The projection plane is split into an R x R grid of regions. Every live
//! section is registered in each region it occupies; neighbor queries expand
//! square rings around those regions until something is found.

use ndarray::Array2;
use std::collections::BTreeSet;

use crate::io::configuration::{MAX_REGIONS, MIN_REGIONS, MIN_SEARCH_RINGS, REGION_DIVISOR};
use crate::spatial::section::SectionId;

/// Region grid coordinate `(x, y)`
pub type RegionCoord = (usize, usize);

/// Region grid side for `tile_count` tiles using the default sizing constants
pub fn region_count_for(tile_count: usize) -> usize {
    region_count(tile_count, REGION_DIVISOR, MIN_REGIONS, MAX_REGIONS)
}

/// Region grid side scaling with tile count, clamped to `[min, max]`
pub fn region_count(tile_count: usize, divisor: usize, min: usize, max: usize) -> usize {
    (tile_count / divisor.max(1)).clamp(min, max.max(min))
}

/// Maps projection coordinates to region coordinates by linear interpolation
#[derive(Clone, Copy, Debug)]
pub struct RegionMapper {
    count: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RegionMapper {
    /// Fit the mapper to the bounds of `coordinates`
    pub fn fit(coordinates: &[[f64; 2]], count: usize) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for &[x, y] in coordinates {
            min = [min[0].min(x), min[1].min(y)];
            max = [max[0].max(x), max[1].max(y)];
        }
        Self {
            count: count.max(1),
            min,
            max,
        }
    }

    /// Region grid side
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Region containing `coordinate`
    pub fn region_of(&self, coordinate: [f64; 2]) -> RegionCoord {
        let [x, y] = coordinate;
        (
            self.bucket(x, self.min[0], self.max[0]),
            self.bucket(y, self.min[1], self.max[1]),
        )
    }

    fn bucket(&self, value: f64, min: f64, max: f64) -> usize {
        let span = max - min;
        // Zero or non-finite span: everything lands in the first bucket
        if !(span.is_finite() && span > 0.0) {
            return 0;
        }
        let scaled = (self.count as f64 * (value - min) / span).floor();
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as usize).min(self.count - 1)
        }
    }
}

/// Square grid of region buckets holding live section ids
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    /// Indexed `[x, y]`
    buckets: Array2<BTreeSet<SectionId>>,
}

impl SpatialIndex {
    /// Create an empty index with `count` x `count` regions
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        Self {
            buckets: Array2::from_elem((count, count), BTreeSet::new()),
        }
    }

    /// Region grid side
    pub fn count(&self) -> usize {
        self.buckets.nrows()
    }

    /// Register `id` in every listed region; out-of-range regions are ignored
    pub fn insert<'a>(&mut self, id: SectionId, regions: impl IntoIterator<Item = &'a RegionCoord>) {
        for &(x, y) in regions {
            if let Some(bucket) = self.buckets.get_mut((x, y)) {
                bucket.insert(id);
            }
        }
    }

    /// Remove `id` from every listed region
    pub fn remove<'a>(&mut self, id: SectionId, regions: impl IntoIterator<Item = &'a RegionCoord>) {
        for &(x, y) in regions {
            if let Some(bucket) = self.buckets.get_mut((x, y)) {
                bucket.remove(&id);
            }
        }
    }

    /// Sections registered in one region
    pub fn sections_in(&self, region: RegionCoord) -> impl Iterator<Item = SectionId> + '_ {
        self.buckets
            .get(region)
            .into_iter()
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Total number of registrations across all regions
    pub fn registrations(&self) -> usize {
        self.buckets.iter().map(BTreeSet::len).sum()
    }

    /// Approximate neighbors of the section `id` occupying `regions`
    ///
    /// For each occupied region, rings of increasing Chebyshev distance are
    /// visited until one (at or beyond the minimum ring count) has produced
    /// a section other than `id`. The result never contains `id` and may be
    /// empty when the index holds nothing else.
    pub fn neighbors<'a>(
        &self,
        id: SectionId,
        regions: impl IntoIterator<Item = &'a RegionCoord>,
    ) -> BTreeSet<SectionId> {
        let count = self.count();
        let mut found = BTreeSet::new();

        for &start in regions {
            let mut found_here = false;
            for distance in 0..count {
                for region in ring(start, distance, count) {
                    for other in self.sections_in(region) {
                        if other != id {
                            found_here = true;
                            found.insert(other);
                        }
                    }
                }
                if found_here && distance >= MIN_SEARCH_RINGS {
                    break;
                }
            }
        }

        found
    }
}

/// Regions at exactly Chebyshev distance `distance` from `center`, clipped to the grid
fn ring(center: RegionCoord, distance: usize, count: usize) -> Vec<RegionCoord> {
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    let d = distance as i64;
    let limit = count as i64;

    let mut candidates = Vec::new();
    if d == 0 {
        candidates.push((cx, cy));
    } else {
        for dx in -d..=d {
            candidates.push((cx + dx, cy - d));
            candidates.push((cx + dx, cy + d));
        }
        for dy in (1 - d)..d {
            candidates.push((cx - d, cy + dy));
            candidates.push((cx + d, cy + dy));
        }
    }

    candidates
        .into_iter()
        .filter(|(x, y)| (0..limit).contains(x) && (0..limit).contains(y))
        .map(|(x, y)| (x as usize, y as usize))
        .collect()
}
