//! Shared helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Create files under `root`, creating parent directories as needed
pub fn build_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Entry names and sizes from a tar.gz archive, in archive order
pub fn tar_gz_entries(bytes: &[u8]) -> Vec<(String, u64)> {
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.path().unwrap().to_string_lossy().into_owned(),
                entry.header().size().unwrap(),
            )
        })
        .collect()
}

/// Entry names and sizes from a zip archive, in archive order
pub fn zip_entries(bytes: &[u8]) -> Vec<(String, u64)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let file = archive.by_index(index).unwrap();
        entries.push((file.name().to_string(), file.size()));
    }
    entries
}

/// Content of a named entry in a tar.gz archive
pub fn tar_gz_entry_content(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(bytes));
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().to_string_lossy() == name {
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            return content;
        }
    }
    panic!("entry {name:?} not found in tar.gz archive");
}

/// Content of a named entry in a zip archive
pub fn zip_entry_content(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    content
}

/// An in-memory sink that stays observable after the writer set drops it
///
/// Clones share one buffer, so a test can keep a handle while the job owns
/// the boxed sink.
#[derive(Clone)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Cursor<Vec<u8>>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Cursor::new(Vec::new()))),
        }
    }

    /// Snapshot of everything written so far
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.lock().unwrap().get_ref().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().unwrap().flush()
    }
}

impl Seek for SharedBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.lock().unwrap().seek(pos)
    }
}

/// A sink that rejects writes once `budget` bytes have been accepted
pub struct FailingSink {
    written: usize,
    budget: usize,
}

impl FailingSink {
    pub fn new(budget: usize) -> Self {
        Self { written: 0, budget }
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.budget {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "sink budget exhausted",
            ));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FailingSink {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(self.written as u64)
    }
}
