//! Spatial data structures for the layout
//!
//! This module contains:
//! - Tile records and the color-feature transform
//! - Rectangular sections with holes
//! - Region mapping and the spatial neighbor index

/// Region mapping and spatial neighbor index
pub mod regions;
/// Rectangular tile grids and their bounds
pub mod section;
/// Tile sources, color features and placed tiles
pub mod tiles;

pub use section::{Section, SectionId};
