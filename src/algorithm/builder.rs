use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::algorithm::cancellation::CancellationToken;
use crate::algorithm::candidate::{MergeCandidate, MergeLimits, PairKey, force_merge, merge};
use crate::algorithm::mosaic::{
    BuildOutcome, Mosaic, MosaicGrid, PartialMosaic, Phase, verify_partition,
};
use crate::algorithm::scheduler::{MergeScheduler, SchedulerStats};
use crate::io::configuration::{
    CANCELLATION_CHECK_INTERVAL, DISTANCE_CUTOFF, DISTANCE_GROWTH, FEATURE_SCALE,
    HOLE_BUDGET_CUTOFF, INITIAL_HOLE_BUDGET, INITIAL_MAX_DISTANCE, MAX_REGIONS, MIN_REGIONS,
    PROJECTION_ITERATIONS, REGION_DIVISOR,
};
use crate::io::error::{MosaicError, Result, invalid_parameter, invariant_violation};
use crate::math::projection::{FeatureProjector, ProjectionAxes};
use crate::spatial::regions::{RegionMapper, SpatialIndex, region_count};
use crate::spatial::section::{Section, SectionId};
use crate::spatial::tiles::{ColorMode, Tile, TileSource, partition_sources};

/// Tunable parameters of a mosaic build
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MosaicConfig {
    /// Color statistic the layout is based on
    pub color_mode: ColorMode,
    /// Power-iteration passes per projection axis
    pub projection_iterations: usize,
    /// Fail on degenerate colors instead of falling back to seed axes
    pub strict_projection: bool,
    /// Multiplier applied to features before measuring seam distances
    pub feature_scale: f64,
    /// Tiles per region row
    pub region_divisor: usize,
    /// Smallest region grid side
    pub min_regions: usize,
    /// Largest region grid side
    pub max_regions: usize,
    /// Seam distance threshold of the first progressive round
    pub initial_max_distance: f64,
    /// Threshold growth factor per round
    pub distance_growth: f64,
    /// Threshold at which progressive merging hands over to stitching
    pub distance_cutoff: f64,
    /// Hole budget of the first progressive round
    pub initial_hole_budget: usize,
    /// Threshold past which hole checking is disabled
    pub hole_budget_cutoff: f64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Average,
            projection_iterations: PROJECTION_ITERATIONS,
            strict_projection: false,
            feature_scale: FEATURE_SCALE,
            region_divisor: REGION_DIVISOR,
            min_regions: MIN_REGIONS,
            max_regions: MAX_REGIONS,
            initial_max_distance: INITIAL_MAX_DISTANCE,
            distance_growth: DISTANCE_GROWTH,
            distance_cutoff: DISTANCE_CUTOFF,
            initial_hole_budget: INITIAL_HOLE_BUDGET,
            hole_budget_cutoff: HOLE_BUDGET_CUTOFF,
        }
    }
}

impl MosaicConfig {
    /// Default configuration for the given color mode
    pub fn for_mode(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            ..Self::default()
        }
    }

    /// Check every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::InvalidParameter`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        if self.projection_iterations == 0 {
            return Err(invalid_parameter(
                "projection_iterations",
                &self.projection_iterations,
                &"must be at least 1",
            ));
        }
        if !(self.feature_scale.is_finite() && self.feature_scale > 0.0) {
            return Err(invalid_parameter(
                "feature_scale",
                &self.feature_scale,
                &"must be positive and finite",
            ));
        }
        if self.region_divisor == 0 {
            return Err(invalid_parameter(
                "region_divisor",
                &self.region_divisor,
                &"must be at least 1",
            ));
        }
        if self.min_regions == 0 || self.min_regions > self.max_regions {
            return Err(invalid_parameter(
                "min_regions",
                &self.min_regions,
                &format!("must be between 1 and max_regions ({})", self.max_regions),
            ));
        }
        if !(self.initial_max_distance.is_finite() && self.initial_max_distance > 0.0) {
            return Err(invalid_parameter(
                "initial_max_distance",
                &self.initial_max_distance,
                &"must be positive and finite",
            ));
        }
        if !(self.distance_growth.is_finite() && self.distance_growth > 1.0) {
            return Err(invalid_parameter(
                "distance_growth",
                &self.distance_growth,
                &"must be finite and greater than 1",
            ));
        }
        if !(self.distance_cutoff.is_finite() && self.distance_cutoff > self.initial_max_distance)
        {
            return Err(invalid_parameter(
                "distance_cutoff",
                &self.distance_cutoff,
                &"must be finite and above initial_max_distance",
            ));
        }
        if self.hole_budget_cutoff.is_nan() {
            return Err(invalid_parameter(
                "hole_budget_cutoff",
                &self.hole_budget_cutoff,
                &"must be a number",
            ));
        }
        Ok(())
    }

    /// Region grid side used for `tile_count` tiles
    pub fn region_count(&self, tile_count: usize) -> usize {
        region_count(
            tile_count,
            self.region_divisor,
            self.min_regions,
            self.max_regions,
        )
    }

    /// Number of progressive rounds the threshold schedule allows
    pub fn progressive_rounds(&self) -> usize {
        let mut rounds = 0;
        let mut distance = self.initial_max_distance;
        while distance < self.distance_cutoff && rounds < 10_000 {
            distance *= self.distance_growth;
            rounds += 1;
        }
        rounds
    }
}

/// Receives build progress; every method defaults to doing nothing
pub trait BuildObserver {
    /// A phase has started with `live_sections` sections
    fn phase_started(&mut self, _phase: Phase, _live_sections: usize) {}

    /// A progressive round at `max_distance` has been drained
    fn round_finished(&mut self, _round: usize, _max_distance: f64, _live_sections: usize) {}

    /// A stitching pass has been drained
    fn stitch_pass_finished(&mut self, _pass: usize, _live_sections: usize) {}
}

/// Observer that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// How candidates are generated for a pair of sections
#[derive(Clone, Copy, Debug, PartialEq)]
enum MergePolicy {
    Ordered(MergeLimits),
    Forced,
}

impl MergePolicy {
    fn generate(self, a: &Section, b: &Section, colors: &[[f64; 3]]) -> Vec<MergeCandidate> {
        match self {
            Self::Ordered(limits) => merge(a, b, colors, limits),
            Self::Forced => force_merge(a, b, colors),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Applied {
    Merged,
    Stale,
}

/// Builds a color-sorted mosaic from tile sources
///
/// Construction performs the seed phase: colors are filtered by mode,
/// projected onto two principal axes, and every tile becomes a singleton
/// section registered in the spatial index. [`MosaicBuilder::build`] then
/// runs progressive merging and forced stitching until one section remains.
pub struct MosaicBuilder<P> {
    config: MosaicConfig,
    axes: ProjectionAxes,
    tiles: Vec<Tile<P>>,
    excluded: Vec<P>,
    /// Seam colors indexed by tile id
    colors: Vec<[f64; 3]>,
    sections: BTreeMap<SectionId, Section>,
    index: SpatialIndex,
    scheduler: MergeScheduler,
    next_id: usize,
    phase: Phase,
    cancellation: Option<CancellationToken>,
    /// Threshold reached by progressive merging, reused while stitching
    final_distance: f64,
}

impl<P> MosaicBuilder<P> {
    /// Seed a build from `sources`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration fails validation
    /// - No source has a usable color for the configured mode
    /// - Projection is degenerate and strict projection is enabled
    pub fn new(sources: Vec<TileSource<P>>, config: MosaicConfig) -> Result<Self> {
        config.validate()?;

        let (usable, excluded) = partition_sources(sources, config.color_mode);
        if usable.is_empty() {
            return Err(MosaicError::InvalidSourceData {
                reason: format!(
                    "no tiles have a usable {:?} color ({} excluded)",
                    config.color_mode,
                    excluded.len()
                ),
            });
        }
        if !excluded.is_empty() {
            info!(
                "{} tiles excluded for lacking a {:?} color",
                excluded.len(),
                config.color_mode
            );
        }

        let features: Vec<[f64; 3]> = usable.iter().map(|(_, feature)| *feature.vector()).collect();
        let axes = FeatureProjector::new(config.projection_iterations)
            .strict(config.strict_projection)
            .fit(&features)?;
        debug!(
            "projection axes {:?} / {:?}",
            axes.primary, axes.secondary
        );

        let tiles: Vec<Tile<P>> = usable
            .into_iter()
            .map(|(payload, feature)| Tile::new(payload, feature, &axes, config.feature_scale))
            .collect();
        let colors: Vec<[f64; 3]> = tiles.iter().map(|tile| tile.seam_color).collect();
        let coordinates: Vec<[f64; 2]> = tiles.iter().map(|tile| tile.coordinate).collect();

        let mapper = RegionMapper::fit(&coordinates, config.region_count(tiles.len()));
        let mut index = SpatialIndex::new(mapper.count());
        let mut sections = BTreeMap::new();
        for (tile, &coordinate) in coordinates.iter().enumerate() {
            let id = SectionId(tile);
            let section = Section::singleton(id, tile, coordinate, mapper.region_of(coordinate));
            index.insert(id, section.regions());
            sections.insert(id, section);
        }

        info!(
            "seeded {} sections in {}x{} regions",
            sections.len(),
            mapper.count(),
            mapper.count()
        );

        Ok(Self {
            config,
            axes,
            next_id: tiles.len(),
            tiles,
            excluded,
            colors,
            sections,
            index,
            scheduler: MergeScheduler::new(),
            phase: Phase::Seed,
            cancellation: None,
            final_distance: config.initial_max_distance,
        })
    }

    /// Abort the build when `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build configuration
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Projection axes estimated during seeding
    pub const fn axes(&self) -> &ProjectionAxes {
        &self.axes
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Tiles placed by this build, indexed by tile id
    pub fn tiles(&self) -> &[Tile<P>] {
        &self.tiles
    }

    /// Payloads dropped for lacking the configured color
    pub fn excluded(&self) -> &[P] {
        &self.excluded
    }

    /// Live sections in id order
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.sections.values()
    }

    /// Number of live sections
    pub fn live_sections(&self) -> usize {
        self.sections.len()
    }

    /// Spatial index over the live sections
    pub const fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Scheduler activity so far
    pub const fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats
    }

    /// Run the build to completion or cancellation
    ///
    /// # Errors
    ///
    /// Returns an error if stitching stops making progress or an internal
    /// invariant is violated.
    pub fn build(self) -> Result<BuildOutcome<P>> {
        self.build_observed(&mut NoopObserver)
    }

    /// Run the build, reporting progress to `observer`
    ///
    /// # Errors
    ///
    /// Returns an error if stitching stops making progress or an internal
    /// invariant is violated.
    pub fn build_observed(mut self, observer: &mut dyn BuildObserver) -> Result<BuildOutcome<P>> {
        if self.sections.len() > 1 {
            self.enter(Phase::ProgressiveMerge, observer);
            if self.progressive_merge(observer)? == Flow::Cancelled {
                return Ok(self.into_partial());
            }

            self.enter(Phase::Stitch, observer);
            if self.stitch(observer)? == Flow::Cancelled {
                return Ok(self.into_partial());
            }
        }

        self.enter(Phase::Done, observer);
        info!(
            "scheduler: {} lists enqueued, {} merges applied, {} stale",
            self.scheduler.stats.enqueued, self.scheduler.stats.applied, self.scheduler.stats.stale
        );
        self.into_mosaic().map(BuildOutcome::Complete)
    }

    fn enter(&mut self, phase: Phase, observer: &mut dyn BuildObserver) {
        self.phase = phase;
        info!("{phase:?}: {} live sections", self.sections.len());
        observer.phase_started(phase, self.sections.len());
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Ordered merges under a geometrically growing threshold and loosening hole budget
    fn progressive_merge(&mut self, observer: &mut dyn BuildObserver) -> Result<Flow> {
        let mut limits = MergeLimits {
            max_distance: self.config.initial_max_distance,
            max_holes: Some(self.config.initial_hole_budget),
        };
        let mut round = 0;

        while limits.max_distance < self.config.distance_cutoff && self.sections.len() > 1 {
            if self.is_cancelled() {
                return Ok(Flow::Cancelled);
            }

            let policy = MergePolicy::Ordered(limits);
            let pairs = self.neighbor_pairs();
            let lists = self.enqueue(&pairs, policy);
            debug!(
                "round {round}: {} neighbor pairs, {lists} candidate lists",
                pairs.len()
            );

            if self.drain(policy)? == Flow::Cancelled {
                return Ok(Flow::Cancelled);
            }
            debug!(
                "round {round} at distance {:.4} (holes {:?}): {} sections left",
                limits.max_distance,
                limits.max_holes,
                self.sections.len()
            );
            observer.round_finished(round, limits.max_distance, self.sections.len());

            limits.max_distance *= self.config.distance_growth;
            limits.max_holes = if limits.max_distance > self.config.hole_budget_cutoff {
                None
            } else {
                limits.max_holes.map(|budget| budget + 1)
            };
            round += 1;
        }

        self.final_distance = limits.max_distance;
        Ok(Flow::Continue)
    }

    /// Unconstrained merges: spatial neighbors first, then all pairs, until one section remains
    fn stitch(&mut self, observer: &mut dyn BuildObserver) -> Result<Flow> {
        // Sections created while stitching still look for cheap ordered joins first
        let follow_up = MergePolicy::Ordered(MergeLimits {
            max_distance: self.final_distance,
            max_holes: None,
        });

        let mut pairs = self.neighbor_pairs();
        let mut pass = 0;

        while self.sections.len() > 1 {
            if self.is_cancelled() {
                return Ok(Flow::Cancelled);
            }

            let before = self.sections.len();
            let lists = self.enqueue(&pairs, MergePolicy::Forced);
            debug!(
                "stitch pass {pass}: {} pairs, {lists} candidate lists",
                pairs.len()
            );

            if self.drain(follow_up)? == Flow::Cancelled {
                return Ok(Flow::Cancelled);
            }
            info!(
                "stitch pass {pass}: {} -> {} sections",
                before,
                self.sections.len()
            );
            observer.stitch_pass_finished(pass, self.sections.len());

            if pass > 0 && self.sections.len() >= before {
                return Err(MosaicError::NonTerminating {
                    pass,
                    live_sections: self.sections.len(),
                });
            }

            pass += 1;
            pairs = self.all_pairs();
        }

        Ok(Flow::Continue)
    }

    /// Apply candidates cheapest first until the queue empties or one section is left
    fn drain(&mut self, policy: MergePolicy) -> Result<Flow> {
        let mut applied_since_check = 0;

        while self.sections.len() > 1 {
            let Some(mut list) = self.scheduler.pop_list() else {
                break;
            };
            let Some(candidate) = list.pop() else {
                continue;
            };

            match self.apply(&candidate, policy)? {
                Applied::Merged => {
                    self.scheduler.record_applied();
                    applied_since_check += 1;
                    if applied_since_check >= CANCELLATION_CHECK_INTERVAL {
                        applied_since_check = 0;
                        if self.is_cancelled() {
                            return Ok(Flow::Cancelled);
                        }
                    }
                }
                Applied::Stale => {
                    self.scheduler.record_stale();
                    self.scheduler.push_list(list);
                }
            }
        }

        Ok(Flow::Continue)
    }

    /// Replace both operands of `candidate` with their merge and enqueue its neighbors
    fn apply(&mut self, candidate: &MergeCandidate, policy: MergePolicy) -> Result<Applied> {
        let (Some(first), Some(second)) = (
            self.sections.get(&candidate.first),
            self.sections.get(&candidate.second),
        ) else {
            return Ok(Applied::Stale);
        };

        let id = SectionId(self.next_id);
        let merged = candidate.materialize(id, first, second)?;
        self.next_id += 1;

        for operand in [candidate.first, candidate.second] {
            let section = self.sections.remove(&operand).ok_or_else(|| {
                invariant_violation("apply", &format!("section {operand:?} vanished"))
            })?;
            self.index.remove(operand, section.regions());
        }
        self.index.insert(id, merged.regions());

        let neighbors = self.neighborhood(&merged);
        let follow_ups: Vec<MergeCandidate> = neighbors
            .iter()
            .filter_map(|other| self.sections.get(other))
            .flat_map(|other| policy.generate(&merged, other, &self.colors))
            .collect();

        self.sections.insert(id, merged);
        self.scheduler.push(follow_ups);
        Ok(Applied::Merged)
    }

    /// Neighbors from the spatial index, or every other live section when none are found
    fn neighborhood(&self, section: &Section) -> BTreeSet<SectionId> {
        let found = self.index.neighbors(section.id(), section.regions());
        if !found.is_empty() {
            return found;
        }

        trace!(
            "no indexed neighbors for {:?}, falling back to all {} live sections",
            section.id(),
            self.sections.len()
        );
        self.sections
            .keys()
            .copied()
            .filter(|&other| other != section.id())
            .collect()
    }

    /// Unordered neighbor pairs across all live sections, each listed once
    fn neighbor_pairs(&self) -> Vec<PairKey> {
        let mut pairs = BTreeSet::new();
        for section in self.sections.values() {
            for other in self.neighborhood(section) {
                pairs.insert(PairKey::new(section.id(), other));
            }
        }
        pairs.into_iter().collect()
    }

    /// Every unordered pair of live sections
    fn all_pairs(&self) -> Vec<PairKey> {
        let ids: Vec<SectionId> = self.sections.keys().copied().collect();
        let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
        for (i, &a) in ids.iter().enumerate() {
            for &b in ids.iter().skip(i + 1) {
                pairs.push(PairKey::new(a, b));
            }
        }
        pairs
    }

    /// Generate candidates for `pairs` under `policy` and push them to the scheduler
    fn enqueue(&mut self, pairs: &[PairKey], policy: MergePolicy) -> usize {
        let batches = generate_candidates(&self.sections, &self.colors, pairs, policy);
        batches
            .into_iter()
            .map(|batch| self.scheduler.push(batch))
            .sum()
    }

    fn into_mosaic(self) -> Result<Mosaic<P>> {
        let tile_count = self.tiles.len();
        let mut survivors = self.sections.into_values();
        let (Some(section), None) = (survivors.next(), survivors.next()) else {
            return Err(invariant_violation(
                "finish",
                &"expected exactly one live section",
            ));
        };

        let grid = MosaicGrid::new(section.into_cells());
        verify_partition([&grid], tile_count)?;

        let payloads = self.tiles.into_iter().map(|tile| tile.payload).collect();
        Ok(Mosaic::new(grid, payloads, self.excluded))
    }

    fn into_partial(self) -> BuildOutcome<P> {
        let phase = self.phase;
        warn!(
            "build cancelled during {phase:?} with {} sections left",
            self.sections.len()
        );

        let fragments = self
            .sections
            .into_values()
            .map(|section| MosaicGrid::new(section.into_cells()))
            .collect();
        let payloads = self.tiles.into_iter().map(|tile| tile.payload).collect();
        BuildOutcome::Incomplete(PartialMosaic::new(
            phase,
            fragments,
            payloads,
            self.excluded,
        ))
    }
}

/// Candidates for every pair; generation is side-effect free and may run in parallel
fn generate_candidates(
    sections: &BTreeMap<SectionId, Section>,
    colors: &[[f64; 3]],
    pairs: &[PairKey],
    policy: MergePolicy,
) -> Vec<Vec<MergeCandidate>> {
    let generate = |pair: &PairKey| match (sections.get(&pair.0), sections.get(&pair.1)) {
        (Some(a), Some(b)) => policy.generate(a, b, colors),
        _ => Vec::new(),
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pairs.par_iter().map(generate).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs.iter().map(generate).collect()
    }
}
