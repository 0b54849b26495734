//! Concurrent job execution and error aggregation
//!
//! Each [`StreamJob`] runs as an independent blocking task on the tokio
//! runtime. The coordinator joins every task before returning (the
//! completion barrier) and surfaces the first error delivered to a shared
//! channel sized to hold one message per job, so a second failing job can
//! never block or be dropped. Failing jobs do not cancel their siblings;
//! there is no cooperative cancellation in this design.

use crate::error::{Error, Result};
use crate::job::StreamJob;
use futures::future;
use tokio::sync::mpsc;
use tracing::warn;

/// Run every job to completion and return the first observed error
///
/// Jobs are spawned concurrently; ordering only exists within a single
/// job. Successful siblings of a failed job still run to completion, so a
/// returned error means "at least one destination may be incomplete", not
/// "nothing was written".
///
/// # Errors
///
/// Returns the first error delivered by any job, or [`Error::Other`] when
/// a job task panicked. Which error is "first" among near-simultaneous
/// failures is inherently a race and not specified.
pub async fn run_jobs(jobs: Vec<StreamJob>) -> Result<()> {
    if jobs.is_empty() {
        return Ok(());
    }

    let (error_tx, mut error_rx) = mpsc::channel::<Error>(jobs.len());
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let error_tx = error_tx.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            if let Err(error) = job.run() {
                warn!(%error, "stream job failed");
                // capacity reserves one slot per job, so the send cannot
                // block or lose a second reporter
                let _ = error_tx.try_send(error);
            }
        }));
    }
    drop(error_tx);

    let mut join_failure: Option<Error> = None;
    for result in future::join_all(handles).await {
        if let Err(join_error) = result
            && join_failure.is_none()
        {
            join_failure = Some(Error::Other(format!(
                "stream job task failed: {join_error}"
            )));
        }
    }

    if let Ok(error) = error_rx.try_recv() {
        return Err(error);
    }
    match join_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
