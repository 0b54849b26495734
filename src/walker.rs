//! Recursive file tree traversal
//!
//! Visits every regular file under a resolved root in the walker's native
//! depth-first order. Directories are descended into but never yielded, and
//! the first stat/open error aborts the walk — there is no continue-on-error
//! mode, because a partially-enumerated tree would silently produce an
//! incomplete archive.

use crate::error::{Error, Result};
use crate::types::FileEntry;
use crate::utils::clean_entry_name;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Walk `root` depth-first, invoking `visit` for every regular file
///
/// A root that is itself a regular file yields exactly that file. Archive
/// entry names are computed relative to the root's parent directory, so a
/// matched file contributes its file name and a matched directory keeps its
/// own name as the top-level archive folder.
///
/// The traversal order is whatever native order the filesystem returns;
/// within a single run this order is deterministic and becomes the entry
/// order of every archive fed from this walk.
///
/// # Errors
///
/// Returns [`Error::Traversal`] on the first stat/open failure, or whatever
/// error `visit` itself returns; either aborts the walk immediately.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(FileEntry) -> Result<()>,
{
    let base = root.parent().filter(|parent| !parent.as_os_str().is_empty());

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|error| {
            let path = error
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            Error::Traversal {
                path,
                source: error.into(),
            }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().as_os_str().is_empty() {
            continue;
        }

        let relative = base
            .and_then(|base| entry.path().strip_prefix(base).ok())
            .unwrap_or_else(|| entry.path());
        let name = clean_entry_name(relative);
        debug!(path = %entry.path().display(), name = %name, "file discovered");

        visit(FileEntry::new(entry.path().to_path_buf(), name)?)?;
    }

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect_names(root: &Path) -> Vec<String> {
        let mut names = Vec::new();
        walk(root, |entry| {
            names.push(entry.name().to_string());
            Ok(())
        })
        .unwrap();
        names
    }

    #[test]
    fn file_root_yields_its_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.log");
        fs::write(&file, b"0123456789").unwrap();

        assert_eq!(collect_names(&file), vec!["a.log".to_string()]);
    }

    #[test]
    fn directory_root_keeps_its_name_as_top_level_folder() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("sub")).unwrap();
        fs::write(tree.join("top.txt"), b"t").unwrap();
        fs::write(tree.join("sub").join("leaf.txt"), b"l").unwrap();

        let mut names = collect_names(&tree);
        names.sort();
        assert_eq!(
            names,
            vec!["tree/sub/leaf.txt".to_string(), "tree/top.txt".to_string()]
        );
    }

    #[test]
    fn directories_are_descended_but_not_yielded() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("empty")).unwrap();
        fs::write(tree.join("only.txt"), b"x").unwrap();

        let names = collect_names(&tree);
        assert_eq!(names, vec!["tree/only.txt".to_string()]);
    }

    #[test]
    fn missing_root_aborts_with_traversal_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("not-here");

        let result = walk(&missing, |_| Ok(()));
        assert!(matches!(result, Err(Error::Traversal { .. })));
    }

    #[test]
    fn visit_error_aborts_the_walk() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"b").unwrap();

        let mut visited = 0;
        let result = walk(temp_dir.path(), |_| {
            visited += 1;
            Err(Error::Other("stop".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(visited, 1, "walk must stop at the first visit error");
    }

    #[test]
    fn entry_names_are_never_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("f"), b"x").unwrap();

        walk(temp_dir.path(), |entry| {
            assert!(!entry.name().is_empty());
            Ok(())
        })
        .unwrap();
    }
}
