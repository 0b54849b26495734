//! # archive-tee
//!
//! Streaming fan-out archiver: package file trees into multiple tar.gz and
//! zip destinations in a single pass over the filesystem.
//!
//! ## Design Philosophy
//!
//! archive-tee is designed to be:
//! - **Single-pass** - Matched trees are walked exactly once, no matter how
//!   many destinations are bound
//! - **Streaming** - File contents flow straight from disk into each
//!   encoder; whole files and whole archives are never buffered in memory
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Fail-fast** - The first error aborts a job; partial archives are
//!   reported, never silently repaired
//!
//! ## Quick Start
//!
//! ```no_run
//! use archive_tee::{ArchiveFormat, OutputConfig, PackageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PackageConfig {
//!         sources: vec!["data/**/*.log".to_string()],
//!         outputs: vec![
//!             OutputConfig {
//!                 path: "backups/logs.tar.gz".into(),
//!                 format: None, // inferred from the extension
//!             },
//!             OutputConfig {
//!                 path: "backups/logs.zip".into(),
//!                 format: Some(ArchiveFormat::Zip),
//!             },
//!         ],
//!     };
//!
//!     archive_tee::package(&config).await?;
//!     Ok(())
//! }
//! ```
//!
//! For custom sinks or several concurrent jobs, assemble
//! [`ArchiveWriter`]s into a [`WriterSet`], build [`StreamJob`]s, and run
//! them through [`run_jobs`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Concurrent job execution and error aggregation
pub mod coordinator;
/// Error types
pub mod error;
/// The fan-out streaming engine
pub mod job;
/// Source pattern resolution
pub mod resolver;
/// Core types: archive formats and file entries
pub mod types;
/// Archive entry naming utilities
pub mod utils;
/// Recursive file tree traversal
pub mod walker;
/// Archive writer construction and entry encoding
pub mod writer;

// Re-export commonly used types
pub use config::{OutputConfig, PackageConfig};
pub use coordinator::run_jobs;
pub use error::{Error, Result};
pub use job::{CloseToken, SharedWriters, StreamJob, WriterSet};
pub use types::{ArchiveFormat, FileEntry};
pub use writer::{ArchiveWriter, ByteSink};

/// Package every source matched by the config into every configured output
///
/// Builds one owning [`StreamJob`] from the config and runs it: each output
/// file is created (parent directories included), every matched file is
/// streamed into every archive in a single filesystem pass, and all
/// archives are finished before this returns.
///
/// # Errors
///
/// Returns a validation error before anything is written, or the job's
/// first streaming/sink error; on error, already-created outputs may hold
/// a partial archive.
///
/// # Example
///
/// ```no_run
/// use archive_tee::{OutputConfig, PackageConfig};
///
/// # async fn run() -> archive_tee::Result<()> {
/// let config = PackageConfig {
///     sources: vec!["site/**".to_string()],
///     outputs: vec![OutputConfig {
///         path: "dist/site.tar.gz".into(),
///         format: None,
///     }],
/// };
/// archive_tee::package(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn package(config: &PackageConfig) -> Result<()> {
    config.validate()?;

    let mut writers = Vec::with_capacity(config.outputs.len());
    for output in &config.outputs {
        let format = output.resolved_format().ok_or_else(|| Error::Config {
            message: format!(
                "cannot infer archive format from {}",
                output.path.display()
            ),
            key: Some("outputs".to_string()),
        })?;
        writers.push(ArchiveWriter::create_local(&output.path, format)?);
    }

    let job = StreamJob::owning(config.sources.clone(), WriterSet::new(writers));
    run_jobs(vec![job]).await
}
