//! Archive writer construction and entry encoding
//!
//! One [`ArchiveWriter`] wraps a format-specific encoder (tar+gzip or zip)
//! bound to a byte sink. Entries stream straight from an open read handle
//! into the encoder; nothing is buffered beyond what the encoders themselves
//! hold. Finishing a writer consumes it, flushes the trailing archive
//! structures, and hands the sink back to the caller, so an encoder can
//! never sever a sink its owner still needs.

use crate::error::{Error, Result};
use crate::types::{ArchiveFormat, FileEntry};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::Path;
use time::OffsetDateTime;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Compression level applied to both the gzip and deflate streams
const COMPRESSION_LEVEL: u32 = 5;

/// Extensions of already-compressed formats that gain nothing from deflate
const PRECOMPRESSED_EXTENSIONS: &[&str] = &[
    "7z", "avi", "br", "bz2", "flac", "gif", "gz", "jar", "jpeg", "jpg", "lz4", "lzma", "mkv",
    "mov", "mp3", "mp4", "mpg", "ogg", "png", "rar", "tbz2", "tgz", "txz", "webm", "webp", "xz",
    "zip", "zst",
];

/// A byte destination an archive can be encoded into
///
/// The zip encoder finalizes entry headers and its central directory in
/// place, so sinks must be seekable. `std::fs::File` and
/// `std::io::Cursor<Vec<u8>>` both qualify.
pub trait ByteSink: Write + Seek + Send {}

impl<T: Write + Seek + Send> ByteSink for T {}

/// Format-specific encoder state
enum Encoder {
    TarGz(tar::Builder<GzEncoder<Box<dyn ByteSink>>>),
    Zip(zip::ZipWriter<Box<dyn ByteSink>>),
}

/// An archive encoder bound to a single destination sink
///
/// Created once before a job starts, written zero or more times, and
/// finished exactly once — `finish` consumes the writer, so a second close
/// cannot be expressed.
pub struct ArchiveWriter {
    encoder: Encoder,
    format: ArchiveFormat,
    target: String,
}

impl ArchiveWriter {
    /// Create a local destination file and bind an encoder to it
    ///
    /// Parent directories are created if needed and an existing file at
    /// `path` is truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`] when the destination file or its parent
    /// directories cannot be created.
    pub fn create_local(path: &Path, format: ArchiveFormat) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|error| Error::Sink {
                target: path.display().to_string(),
                reason: format!("failed to create parent directories: {error}"),
            })?;
        }

        let file = File::create(path).map_err(|error| Error::Sink {
            target: path.display().to_string(),
            reason: format!("failed to create destination file: {error}"),
        })?;

        debug!(path = %path.display(), %format, "local archive sink created");
        Ok(Self::bind(Box::new(file), format, path.display().to_string()))
    }

    /// Bind an encoder to an arbitrary caller-supplied sink
    pub fn from_sink(sink: Box<dyn ByteSink>, format: ArchiveFormat) -> Self {
        Self::bind(sink, format, format!("{format} stream"))
    }

    fn bind(sink: Box<dyn ByteSink>, format: ArchiveFormat, target: String) -> Self {
        let encoder = match format {
            ArchiveFormat::TarGz => Encoder::TarGz(tar::Builder::new(GzEncoder::new(
                sink,
                Compression::new(COMPRESSION_LEVEL),
            ))),
            ArchiveFormat::Zip => Encoder::Zip(zip::ZipWriter::new(sink)),
        };
        Self {
            encoder,
            format,
            target,
        }
    }

    /// Stream one file into the archive under the entry's cleaned name
    ///
    /// The caller supplies a freshly-opened read handle; the writer never
    /// shares or reuses handles across destinations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] when the encoder or the underlying sink
    /// rejects the entry. The archive must be considered corrupt past this
    /// point; the job-level response is to abort.
    pub fn append(&mut self, entry: &FileEntry, mut reader: File) -> Result<()> {
        match &mut self.encoder {
            Encoder::TarGz(builder) => {
                let mut header = tar::Header::new_gnu();
                header.set_metadata(entry.metadata());
                builder
                    .append_data(&mut header, entry.name(), &mut reader)
                    .map_err(|error| Error::Write {
                        name: entry.name().to_string(),
                        reason: error.to_string(),
                    })?;
            }
            Encoder::Zip(writer) => {
                writer
                    .start_file(entry.name(), zip_entry_options(entry))
                    .map_err(|error| Error::Write {
                        name: entry.name().to_string(),
                        reason: error.to_string(),
                    })?;
                io::copy(&mut reader, writer).map_err(|error| Error::Write {
                    name: entry.name().to_string(),
                    reason: error.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Finish the archive and hand the sink back to the owner
    ///
    /// Writes the trailing archive structures (tar end blocks + gzip
    /// trailer, or the zip central directory), flushes the sink, and
    /// returns it. Consuming `self` makes a double finish unrepresentable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`] when the trailing structures cannot be
    /// written or the sink cannot be flushed.
    pub fn finish(self) -> Result<Box<dyn ByteSink>> {
        let target = self.target;
        let mut sink = match self.encoder {
            Encoder::TarGz(builder) => {
                let gz = builder.into_inner().map_err(|error| Error::Sink {
                    target: target.clone(),
                    reason: format!("failed to finish tar stream: {error}"),
                })?;
                gz.finish().map_err(|error| Error::Sink {
                    target: target.clone(),
                    reason: format!("failed to finish gzip stream: {error}"),
                })?
            }
            Encoder::Zip(mut writer) => writer.finish().map_err(|error| Error::Sink {
                target: target.clone(),
                reason: format!("failed to finish zip archive: {error}"),
            })?,
        };

        sink.flush().map_err(|error| Error::Sink {
            target,
            reason: format!("failed to flush sink: {error}"),
        })?;
        Ok(sink)
    }

    /// The container format this writer encodes into
    #[must_use]
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Human-readable description of the bound destination
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Per-entry zip options: selective compression plus source metadata
///
/// Entries whose extension marks them as already compressed are stored
/// rather than deflated, so recompression cost is only paid where it can
/// actually shrink the entry.
fn zip_entry_options(entry: &FileEntry) -> FileOptions {
    let mut options = if is_precompressed(entry.name()) {
        FileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL as i32))
    };

    options = options.large_file(entry.size() >= u64::from(u32::MAX));

    if let Ok(modified) = entry.metadata().modified()
        && let Ok(mtime) = zip::DateTime::try_from(OffsetDateTime::from(modified))
    {
        options = options.last_modified_time(mtime);
    }

    options
}

fn is_precompressed(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            PRECOMPRESSED_EXTENSIONS.contains(&ext.as_str())
        })
}
