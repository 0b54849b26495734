//! Error types for archive-tee
//!
//! A single error enum covers the whole pipeline: pattern resolution,
//! tree traversal, sink lifecycle, and entry encoding. Every category
//! aborts the stream job that encountered it; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for archive-tee operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for archive-tee
///
/// Each variant carries enough context to identify the source pattern,
/// path, or archive entry that failed.
#[derive(Debug, Error)]
pub enum Error {
    /// A source glob pattern could not be parsed
    #[error("invalid source pattern {pattern:?}: {reason}")]
    Pattern {
        /// The offending glob pattern
        pattern: String,
        /// Parser detail describing what is wrong with the pattern
        reason: String,
    },

    /// Stat/open failure while walking a resolved root or opening a read handle
    #[error("traversal failed at {}: {source}", path.display())]
    Traversal {
        /// The path that could not be visited or opened
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A destination sink or its encoder could not be created, finalized,
    /// or was already closed
    #[error("archive sink {target}: {reason}")]
    Sink {
        /// The destination the sink is bound to
        target: String,
        /// Why the sink operation failed
        reason: String,
    },

    /// An encoder rejected an entry
    #[error("failed to write entry {name:?}: {reason}")]
    Write {
        /// The archive entry name that failed
        name: String,
        /// Why the encoder rejected the entry
        reason: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "outputs")
        key: Option<String>,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}
