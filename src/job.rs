//! The fan-out streaming engine
//!
//! A [`StreamJob`] resolves its source patterns in order, walks every
//! matched root once, and replicates each discovered file into every bound
//! [`ArchiveWriter`] through an independently-opened read handle. The first
//! error of any kind aborts the job; archives are not designed to be
//! internally consistent after a partial failure, so no best-effort
//! continuation is attempted.
//!
//! Writer lifecycle follows an explicit ownership token: a [`WriterSet`]
//! splits into a cloneable [`SharedWriters`] handle plus exactly one
//! [`CloseToken`], and only the token holder can close the set. Closing
//! consumes the token, so a double close cannot be expressed.

use crate::error::{Error, Result};
use crate::types::FileEntry;
use crate::writer::{ArchiveWriter, ByteSink};
use crate::{resolver, walker};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// An ordered set of archive writers plus an optional upstream sink
///
/// The upstream sink covers the case where several writers feed a shared
/// downstream destination (e.g. the write end of a pipe) that must outlive
/// every encoder and be flushed exactly once, by the set's owner.
pub struct WriterSet {
    writers: Vec<ArchiveWriter>,
    upstream: Option<Box<dyn ByteSink>>,
}

impl WriterSet {
    /// Bind an ordered sequence of writers into a set
    #[must_use]
    pub fn new(writers: Vec<ArchiveWriter>) -> Self {
        Self {
            writers,
            upstream: None,
        }
    }

    /// Attach an upstream sink that the owner flushes and drops on close
    #[must_use]
    pub fn with_upstream(mut self, sink: Box<dyn ByteSink>) -> Self {
        self.upstream = Some(sink);
        self
    }

    /// Split the set into a shareable handle and its single close token
    ///
    /// The handle can be cloned into any number of jobs; the token cannot.
    #[must_use]
    pub fn into_shared(self) -> (SharedWriters, CloseToken) {
        let shared = SharedWriters {
            inner: Arc::new(Mutex::new(Some(self))),
        };
        let token = CloseToken {
            set: shared.clone(),
        };
        (shared, token)
    }

    /// Finish every writer and flush the upstream sink
    ///
    /// All writers are finished even when an earlier one fails; the first
    /// failure is returned.
    fn close(self) -> Result<()> {
        let mut first_failure: Option<Error> = None;

        for writer in self.writers {
            let target = writer.target().to_string();
            if let Err(error) = writer.finish() {
                warn!(target = %target, %error, "failed to finish archive writer");
                first_failure.get_or_insert(error);
            }
        }

        if let Some(mut sink) = self.upstream
            && let Err(error) = sink.flush()
        {
            let error = Error::Sink {
                target: "upstream sink".to_string(),
                reason: format!("failed to flush: {error}"),
            };
            warn!(%error, "failed to flush upstream sink");
            first_failure.get_or_insert(error);
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// A cloneable handle to a writer set shared between jobs
///
/// Fan-out locks the set per file entry, so concurrently-running jobs that
/// share one set cannot interleave bytes within a single entry. Once the
/// [`CloseToken`] has been used, every further write attempt through any
/// handle fails with a sink error.
#[derive(Clone)]
pub struct SharedWriters {
    inner: Arc<Mutex<Option<WriterSet>>>,
}

impl SharedWriters {
    fn lock(&self) -> MutexGuard<'_, Option<WriterSet>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // a poisoned set is still closable/countable; the panic that
            // poisoned it has already surfaced through the task join
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of writers still open in the set (zero once closed)
    #[must_use]
    pub fn writer_count(&self) -> usize {
        self.lock().as_ref().map_or(0, |set| set.writers.len())
    }

    fn fan_out(&self, entry: &FileEntry) -> Result<()> {
        let mut guard = self.lock();
        let Some(set) = guard.as_mut() else {
            return Err(Error::Sink {
                target: "writer set".to_string(),
                reason: "already closed".to_string(),
            });
        };

        for writer in &mut set.writers {
            let reader = entry.open()?;
            writer.append(entry, reader)?;
        }
        Ok(())
    }
}

/// The single permission to close a shared writer set
///
/// Exactly one token exists per [`WriterSet`]; closing consumes it.
pub struct CloseToken {
    set: SharedWriters,
}

impl CloseToken {
    /// Finish every writer in the set and flush the upstream sink
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Sink`] encountered while finishing;
    /// remaining writers are still finished.
    pub fn close(self) -> Result<()> {
        let set = self.set.lock().take();
        match set {
            Some(set) => set.close(),
            None => Ok(()),
        }
    }
}

/// One streaming job: an ordered list of source patterns fanned out into a
/// writer set
///
/// Jobs holding the [`CloseToken`] close their writers on every exit path,
/// success or abort; jobs without it leave the set open for the caller.
pub struct StreamJob {
    sources: Vec<String>,
    writers: SharedWriters,
    close: Option<CloseToken>,
}

impl StreamJob {
    /// Build a non-owning job over an already-shared writer set
    #[must_use]
    pub fn new(sources: Vec<String>, writers: SharedWriters) -> Self {
        Self {
            sources,
            writers,
            close: None,
        }
    }

    /// Build a job that exclusively owns its writer set and closes it when
    /// the job finishes
    #[must_use]
    pub fn owning(sources: Vec<String>, set: WriterSet) -> Self {
        let (writers, token) = set.into_shared();
        Self {
            sources,
            writers,
            close: Some(token),
        }
    }

    /// Hand this job the close token for its (shared) writer set
    #[must_use]
    pub fn with_close(mut self, token: CloseToken) -> Self {
        self.close = Some(token);
        self
    }

    /// Run the job to completion, blocking the calling thread
    ///
    /// Sources are processed strictly in order, files within a source in
    /// the walker's native order, and writers in set order for every file —
    /// so all archives written by this job share one entry order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; the job stops streaming at that
    /// point. If this job holds the close token the writers are still
    /// closed, and a close failure never masks the streaming error.
    pub fn run(self) -> Result<()> {
        let streamed = stream_sources(&self.sources, &self.writers);

        let closed = match self.close {
            Some(token) => token.close(),
            None => Ok(()),
        };

        match (streamed, closed) {
            (Ok(()), close_result) => close_result,
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(close_error)) => {
                warn!(%close_error, "writer close failed after streaming error");
                Err(error)
            }
        }
    }
}

fn stream_sources(sources: &[String], writers: &SharedWriters) -> Result<()> {
    for pattern in sources {
        let roots = resolver::resolve(pattern)?;
        for root in &roots {
            walker::walk(root, |entry| writers.fan_out(&entry))?;
            info!(
                root = %root.display(),
                writers = writers.writer_count(),
                "source root streamed"
            );
        }
    }
    Ok(())
}
