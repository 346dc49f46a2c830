//! Error types for audio-dl
//!
//! Only batch-fatal conditions surface as [`Error`]: tool preflight, output
//! directory setup, and an empty source list. Per-item download failures are
//! recorded on the item itself (see [`crate::types::ItemFailure`]) and never
//! abort the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for audio-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for audio-dl
#[derive(Debug, Error)]
pub enum Error {
    /// A required external tool could not be resolved
    #[error("{tool} not found. {hint}")]
    MissingTool {
        /// Tool binary name (e.g., "yt-dlp")
        tool: String,
        /// Install hint shown to the user
        hint: String,
    },

    /// Output directory could not be created
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A URL list file could not be read
    #[error("failed to read URL file {path}: {source}")]
    UrlFile {
        /// The file passed on the command line
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No download sources were provided
    #[error("no URLs provided")]
    NoSources,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
