//! Input/output shell around the builder

/// Command-line arguments and mosaic processing
pub mod cli;
/// Default parameters and constants
pub mod configuration;
/// Error types
pub mod error;
/// PNG export of finished mosaics
pub mod image;
/// Terminal progress display
pub mod progress;
/// Swatch loading and color statistics
pub mod swatch;
/// Seeded synthetic swatch generation
pub mod synthetic;
