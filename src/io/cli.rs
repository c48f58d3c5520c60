//! Command-line interface for building a swatch mosaic

use crate::algorithm::builder::{MosaicBuilder, MosaicConfig};
use crate::algorithm::cancellation::CancellationToken;
use crate::algorithm::mosaic::{BuildOutcome, Mosaic};
use crate::io::configuration::{DEFAULT_CELL_SIZE, DEFAULT_OUTPUT, DEFAULT_SEED, PARTIAL_SUFFIX};
use crate::io::error::{MosaicError, Result};
use crate::io::image::{CellStyle, export_mosaic_png};
use crate::io::progress::ProgressManager;
use crate::io::swatch::{Swatch, SwatchLibrary};
use crate::io::synthetic::synthetic_library;
use crate::spatial::tiles::ColorMode;
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "blockmap")]
#[command(
    author,
    version,
    about = "Arrange texture swatches into a color-sorted mosaic"
)]
/// Command-line arguments for the mosaic builder
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory of PNG swatches
    #[arg(value_name = "TARGET", required_unless_present = "synthetic")]
    pub target: Option<PathBuf>,

    /// Generate N synthetic swatches instead of loading a directory
    #[arg(long, value_name = "N", conflicts_with = "target")]
    pub synthetic: Option<usize>,

    /// Random seed for synthetic swatches
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Lay out by dominant color; swatches without one are left out
    #[arg(short, long)]
    pub dominant: bool,

    /// Output PNG path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Cell size in pixels
    #[arg(short, long, default_value_t = DEFAULT_CELL_SIZE)]
    pub cell_size: u32,

    /// Fill cells with their average color instead of the texture
    #[arg(short, long)]
    pub flat: bool,

    /// Cancel the build after this many seconds and export the largest fragment
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail instead of falling back when colors give no principal axis
    #[arg(long)]
    pub strict_projection: bool,

    /// Suppress progress output and all logging below errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log phase summaries
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Color statistic selected on the command line
    pub const fn color_mode(&self) -> ColorMode {
        if self.dominant {
            ColorMode::Dominant
        } else {
            ColorMode::Average
        }
    }

    /// Cell drawing style selected on the command line
    pub const fn cell_style(&self) -> CellStyle {
        if self.flat {
            CellStyle::Flat
        } else {
            CellStyle::Texture
        }
    }

    /// Default log specification when `RUST_LOG` is unset
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build configuration derived from the flags
    pub fn config(&self) -> MosaicConfig {
        MosaicConfig {
            strict_projection: self.strict_projection,
            ..MosaicConfig::for_mode(self.color_mode())
        }
    }

    /// Where the largest fragment of a cancelled build is written
    pub fn partial_output_path(&self) -> PathBuf {
        partial_path(&self.output)
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    let extension = output
        .extension()
        .map_or_else(|| "png".into(), |ext| ext.to_string_lossy());
    let name = format!("{stem}{PARTIAL_SUFFIX}.{extension}");

    output
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Install the global logger
///
/// `RUST_LOG` takes precedence over `default_level`. The returned handle must
/// be kept alive for the duration of the program.
///
/// # Errors
///
/// Returns [`MosaicError::Logging`] if the specification is invalid or a
/// logger is already installed.
pub fn setup_logging(default_level: &str) -> Result<LoggerHandle> {
    Ok(Logger::try_with_env_or_str(default_level)?.start()?)
}

/// Loads swatches, runs the build and exports the result
pub struct MosaicProcessor {
    cli: Cli,
}

impl MosaicProcessor {
    /// Create a processor for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load or generate swatches, build the mosaic and write it out
    ///
    /// # Errors
    ///
    /// Returns an error if loading, building or exporting fails
    pub fn process(&self) -> Result<()> {
        let library = self.load_library()?;
        let config = self.cli.config();

        let mut builder = MosaicBuilder::new(library.into_sources(), config)?;
        if let Some(seconds) = self.cli.timeout {
            builder = builder.with_cancellation(
                CancellationToken::new().with_timeout(Duration::from_secs(seconds)),
            );
        }
        for swatch in builder.excluded() {
            info!(
                "excluded {}: no {:?} color",
                swatch.name(),
                config.color_mode
            );
        }

        let outcome = if self.cli.should_show_progress() {
            let mut progress = ProgressManager::new(config.progressive_rounds());
            let outcome = builder.build_observed(&mut progress);
            progress.finish();
            outcome?
        } else {
            builder.build()?
        };

        match outcome {
            BuildOutcome::Complete(mosaic) => self.export(&mosaic, &self.cli.output),
            BuildOutcome::Incomplete(partial) => {
                let path = self.cli.partial_output_path();
                warn!(
                    "build cancelled during {:?} with {} fragments; exporting the largest to {}",
                    partial.phase(),
                    partial.fragments().len(),
                    path.display()
                );
                partial
                    .into_largest()
                    .map_or(Ok(()), |mosaic| self.export(&mosaic, &path))
            }
        }
    }

    fn load_library(&self) -> Result<SwatchLibrary> {
        match (&self.cli.target, self.cli.synthetic) {
            (_, Some(count)) => Ok(synthetic_library(count, self.cli.seed)),
            (Some(target), None) if target.is_dir() => SwatchLibrary::from_directory(target),
            (Some(target), None) => Err(MosaicError::FileSystem {
                path: target.clone(),
                operation: "open swatch directory",
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "target must be a directory of PNG swatches",
                ),
            }),
            (None, None) => Err(MosaicError::InvalidSourceData {
                reason: "no swatch directory or synthetic count given".to_string(),
            }),
        }
    }

    fn export(&self, mosaic: &Mosaic<Swatch>, path: &Path) -> Result<()> {
        export_mosaic_png(mosaic, self.cli.cell_size, self.cli.cell_style(), path)?;
        info!(
            "wrote {}x{} mosaic with {} tiles and {} holes to {}",
            mosaic.width(),
            mosaic.height(),
            mosaic.tile_count(),
            mosaic.hole_count(),
            path.display()
        );
        Ok(())
    }
}
