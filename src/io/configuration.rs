//! Algorithm constants and runtime configuration defaults

// Projection
/// Power-iteration passes per principal axis
pub const PROJECTION_ITERATIONS: usize = 10;
/// Starting direction for the primary axis (normalized before use)
pub const PRIMARY_AXIS_SEED: [f64; 3] = [-0.5, 0.0, 0.5];
/// Starting direction for the secondary axis
pub const SECONDARY_AXIS_SEED: [f64; 3] = [0.0, 1.0, 0.0];
/// Multiplier applied to color features before seam distances are measured
pub const FEATURE_SCALE: f64 = 3.0;

// Spatial index sizing keeps bucket occupancy roughly constant
/// Tiles per region row used to derive the region count
pub const REGION_DIVISOR: usize = 70;
/// Smallest region grid side
pub const MIN_REGIONS: usize = 5;
/// Largest region grid side
pub const MAX_REGIONS: usize = 100;
/// Rings always visited by a neighbor search before it may stop
pub const MIN_SEARCH_RINGS: usize = 1;

// Progressive merge schedule
/// Seam distance threshold of the first progressive round
pub const INITIAL_MAX_DISTANCE: f64 = 0.01;
/// Geometric growth of the threshold per round
pub const DISTANCE_GROWTH: f64 = 1.1;
/// Progressive merging stops once the threshold reaches this value
pub const DISTANCE_CUTOFF: f64 = 0.6;
/// Hole budget of the first progressive round
pub const INITIAL_HOLE_BUDGET: usize = 1;
/// Past this threshold hole checking is disabled
pub const HOLE_BUDGET_CUTOFF: f64 = 0.5;

// Forced stitching
/// Weight of the coordinate-space gap in forced merge costs
pub const FORCE_GAP_WEIGHT: f64 = 5.0;
/// Seam distance charged when two sections share no facing tiles
pub const UNMATCHED_SEAM_DISTANCE: f64 = 4.0;

/// Applied merges between cancellation checks
pub const CANCELLATION_CHECK_INTERVAL: usize = 64;

// Swatch analysis
/// Squared RGB distance (0-255 scale) within which a pixel counts toward the dominant color
pub const DOMINANT_MAX_DIFF: f64 = 7000.0;
/// Percentage of pixels that must be near the average for a valid dominant color
pub const DOMINANT_SHARE_PERCENT: usize = 85;
/// Swatches narrower or shorter than this are skipped
pub const MIN_SWATCH_SIZE: u32 = 16;
/// Side length of generated synthetic swatches
pub const SYNTHETIC_SWATCH_SIZE: u32 = 16;
/// Per-channel noise amplitude of synthetic swatches
pub const SYNTHETIC_NOISE: u8 = 12;

// Defaults for configurable parameters
/// Fixed seed for reproducible synthetic libraries
pub const DEFAULT_SEED: u64 = 42;
/// Rendered pixel size of one mosaic cell
pub const DEFAULT_CELL_SIZE: u32 = 16;
/// Output file used when none is given
pub const DEFAULT_OUTPUT: &str = "blockmap.png";

// Output settings
/// Suffix added to the output filename of a cancelled build
pub const PARTIAL_SUFFIX: &str = "_partial";
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
