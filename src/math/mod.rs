//! Mathematical utilities for the layout

/// Principal-axis estimation and projection of color features
pub mod projection;
/// Small fixed-size vector operations
pub mod vector;
