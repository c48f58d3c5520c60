//! Error types for mosaic construction and the swatch I/O shell

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to load a swatch image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Input tiles don't meet the builder's requirements
    InvalidSourceData {
        /// Description of what's wrong with the input
        reason: String,
    },

    /// Configuration parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Principal axis estimation summed to a zero or non-finite vector
    ///
    /// Only raised when strict projection is requested; otherwise the
    /// projector falls back to its seed direction.
    DegenerateProjection {
        /// Which axis could not be estimated
        axis: &'static str,
    },

    /// A full all-pairs stitching pass failed to merge anything
    NonTerminating {
        /// Stitch pass during which progress stopped
        pass: usize,
        /// Number of sections still live
        live_sections: usize,
    },

    /// An internal invariant was violated
    ///
    /// Never expected in correct operation: a grid cell owned twice,
    /// a section missing from the live set, or a broken tile partition.
    Invariant {
        /// Operation that detected the violation
        operation: &'static str,
        /// Description of the violation
        reason: String,
    },

    /// Failed to save the rendered mosaic to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Logger could not be installed
    Logging {
        /// Underlying logger error
        source: flexi_logger::FlexiLoggerError,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::DegenerateProjection { axis } => {
                write!(
                    f,
                    "Degenerate projection: {axis} axis estimate collapsed to a zero vector"
                )
            }
            Self::NonTerminating {
                pass,
                live_sections,
            } => {
                write!(
                    f,
                    "Stitching made no progress in pass {pass} ({live_sections} sections left)"
                )
            }
            Self::Invariant { operation, reason } => {
                write!(f, "Invariant violated in {operation}: {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Logging { source } => write!(f, "Failed to initialize logging: {source}"),
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Logging { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<flexi_logger::FlexiLoggerError> for MosaicError {
    fn from(err: flexi_logger::FlexiLoggerError) -> Self {
        Self::Logging { source: err }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an internal invariant error
pub fn invariant_violation(operation: &'static str, reason: &impl ToString) -> MosaicError {
    MosaicError::Invariant {
        operation,
        reason: reason.to_string(),
    }
}
