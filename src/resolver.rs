//! Source pattern resolution
//!
//! Expands glob patterns into concrete filesystem roots. Matching zero
//! paths is not an error; only a syntactically invalid pattern is.

use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Expand a glob pattern into concrete filesystem paths
///
/// Candidate paths that cannot be read while matching (e.g. permission
/// errors on an intermediate directory) are skipped, so an unreadable
/// branch of the tree narrows the match set rather than failing the
/// resolve. The returned order is stable within a single call.
///
/// # Errors
///
/// Returns [`Error::Pattern`] when the pattern itself cannot be parsed.
pub fn resolve(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|error| Error::Pattern {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    })?;

    let matches: Vec<PathBuf> = entries.filter_map(std::result::Result::ok).collect();
    debug!(pattern, matches = matches.len(), "source pattern resolved");

    Ok(matches)
}
