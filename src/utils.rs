//! Utility functions for archive entry naming

use std::path::{Component, Path};

/// Fallback entry name for paths with no usable components
const UNNAMED_ENTRY: &str = "unnamed";

/// Derive a portable archive entry name from a filesystem path
///
/// Strips volume/drive prefixes, root separators, and parent-directory
/// components, then joins the remaining components with `/` so entry names
/// are identical regardless of the platform the archive was produced on.
/// Parent-directory components are dropped rather than resolved so an entry
/// name can never escape the archive root when extracted.
///
/// # Arguments
///
/// * `path` - The filesystem path to derive the entry name from
///
/// # Returns
///
/// A relative, `/`-separated, non-empty entry name. Paths consisting solely
/// of separators or `..` components map to a fixed placeholder name.
///
/// # Examples
///
/// ```
/// use archive_tee::utils::clean_entry_name;
/// use std::path::Path;
///
/// assert_eq!(clean_entry_name(Path::new("/var/log/app.log")), "var/log/app.log");
/// assert_eq!(clean_entry_name(Path::new("data/a.log")), "data/a.log");
/// assert_eq!(clean_entry_name(Path::new("../escape.txt")), "escape.txt");
/// ```
#[must_use]
pub fn clean_entry_name(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();

    for component in path.components() {
        if let Component::Normal(part) = component {
            let part = part.to_string_lossy();
            if !part.is_empty() {
                parts.push(part.into_owned());
            }
        }
    }

    if parts.is_empty() {
        return UNNAMED_ENTRY.to_string();
    }

    parts.join("/")
}
