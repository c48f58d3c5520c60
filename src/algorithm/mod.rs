/// Tile partition checks over grids
pub mod bitset;
/// Phased mosaic builder and its configuration
pub mod builder;
/// Cooperative cancellation with optional deadlines
pub mod cancellation;
/// Ordered and forced merge candidate generation
pub mod candidate;
/// Finished and partial mosaics
pub mod mosaic;
/// Min-cost priority queue of candidate lists
pub mod scheduler;
