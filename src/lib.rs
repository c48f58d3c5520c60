//! Color-similarity mosaic layout for square texture swatches
//!
//! Tiles are projected onto the two principal axes of their color features,
//! seeded as singleton sections, and repeatedly joined edge to edge: first by
//! cheap ordered merges under a growing color-distance threshold, then by
//! forced stitching until one rectangular grid holds every tile.

#![forbid(unsafe_code)]

/// Mosaic construction: merge candidates, scheduling and the phased builder
pub mod algorithm;
/// Swatch loading, image export, progress display and the command line shell
pub mod io;
/// Vector helpers and principal-axis projection
pub mod math;
/// Tiles, sections and the region index used for neighbor lookup
pub mod spatial;

pub use io::error::{MosaicError, Result};
