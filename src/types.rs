//! Core types: archive formats and discovered file entries

use crate::error::{Error, Result};
use crate::utils::clean_entry_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, Metadata};
use std::path::{Path, PathBuf};

/// Container format an archive sink encodes into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    /// Gzip-compressed tar stream (`.tar.gz` / `.tgz`)
    TarGz,
    /// Zip archive (`.zip`)
    Zip,
}

impl ArchiveFormat {
    /// Infer the archive format from a destination path's extension
    ///
    /// Recognizes `.tar.gz`, `.tgz`, and `.zip` (case-insensitive).
    /// Returns `None` for anything else so callers can require an explicit
    /// format instead of guessing.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tee::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ArchiveFormat::from_path(Path::new("out/logs.tar.gz")), Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("backup.ZIP")), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("data.bin")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// Conventional file extension for this format, without a leading dot
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A single regular file discovered during a walk
///
/// Carries the real filesystem path, the cleaned archive-relative entry
/// name, and the file's metadata. No read stream is stored on the entry:
/// every write attempt opens its own handle via [`FileEntry::open`] so
/// concurrent destination writers never race on a shared cursor.
#[derive(Debug)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    metadata: Metadata,
}

impl FileEntry {
    /// Build an entry for `path` under the archive name `name`
    ///
    /// The name is expected to be already cleaned (relative, `/`-separated,
    /// non-empty); the walker guarantees this for entries it yields.
    pub(crate) fn new(path: PathBuf, name: String) -> Result<Self> {
        let metadata = std::fs::metadata(&path).map_err(|source| Error::Traversal {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            name,
            metadata,
        })
    }

    /// Build an entry for `path`, naming it by its cleaned path
    ///
    /// Useful when driving an [`crate::ArchiveWriter`] directly without
    /// going through the walker.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = clean_entry_name(&path);
        Self::new(path, name)
    }

    /// Open a fresh, independent read handle on the source file
    ///
    /// Each destination writer gets its own handle so a failure or partial
    /// read on one destination cannot disturb another.
    pub fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|source| Error::Traversal {
            path: self.path.clone(),
            source,
        })
    }

    /// The real filesystem path of the source file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cleaned archive-relative entry name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem metadata captured when the entry was discovered
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Size of the source file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.metadata.len()
    }
}
