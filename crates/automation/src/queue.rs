//! FIFO batch-job queue with a single current job.
//!
//! Admission control, not an optimization: the controlled browser is
//! one shared resource, so at most one job may be current system-wide.
//! Jobs are never reordered. Removal only touches jobs still waiting —
//! the running job has already left the waiting list and reports
//! not-found.

use serde::Serialize;
use tokio::sync::{oneshot, Mutex};

use tilebot_core::job::{BatchJob, UploadVariant};
use tilebot_core::types::Timestamp;
use tilebot_core::{CoreError, FileOutcome};

/// A waiting job plus the channel its eventual outcome resolves on.
///
/// The completion sender mirrors the synchronous-ack / asynchronous-
/// outcome split: the HTTP caller is answered as soon as the job is
/// queued, and this channel carries the outcome list (or queue-level
/// failure) once the run finishes.
#[derive(Debug)]
pub struct QueuedJob {
    pub job: BatchJob,
    pub completion: oneshot::Sender<Result<Vec<FileOutcome>, CoreError>>,
}

/// Summary of the job currently draining.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentJobView {
    pub session_id: String,
    pub variant: UploadVariant,
    pub total_files: usize,
}

/// Summary of one waiting job.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedJobView {
    pub session_id: String,
    pub variant: UploadVariant,
    pub total_files: usize,
    pub enqueued_at: Timestamp,
}

/// Snapshot returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub is_processing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_job: Option<CurrentJobView>,
    pub queued_jobs: Vec<QueuedJobView>,
}

#[derive(Debug, Default)]
struct QueueInner {
    waiting: std::collections::VecDeque<QueuedJob>,
    current: Option<CurrentJobView>,
}

/// The process-wide job queue.
#[derive(Debug, Default)]
pub struct JobQueue {
    inner: Mutex<QueueInner>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job; returns its 1-based queue position.
    pub async fn push(&self, queued: QueuedJob) -> usize {
        let mut inner = self.inner.lock().await;
        inner.waiting.push_back(queued);
        inner.waiting.len()
    }

    /// Pop the next waiting job and mark it current.
    ///
    /// Returns `None` when the queue is empty (the drain loop goes
    /// back to sleep).
    pub async fn take_next(&self) -> Option<QueuedJob> {
        let mut inner = self.inner.lock().await;
        let queued = inner.waiting.pop_front()?;
        inner.current = Some(CurrentJobView {
            session_id: queued.job.session_id.clone(),
            variant: queued.job.variant,
            total_files: queued.job.total_files(),
        });
        Some(queued)
    }

    /// Clear the current-job marker once its run has finished.
    pub async fn clear_current(&self) {
        self.inner.lock().await.current = None;
    }

    /// Remove a waiting job by session id. The currently-running job
    /// is not waiting, so asking for it returns `false`.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let before = inner.waiting.len();
        inner.waiting.retain(|q| q.job.session_id != session_id);
        inner.waiting.len() < before
    }

    /// Snapshot for the status endpoint.
    pub async fn status(&self) -> QueueStatus {
        let inner = self.inner.lock().await;
        QueueStatus {
            queue_length: inner.waiting.len(),
            is_processing: inner.current.is_some(),
            current_job: inner.current.clone(),
            queued_jobs: inner
                .waiting
                .iter()
                .map(|q| QueuedJobView {
                    session_id: q.job.session_id.clone(),
                    variant: q.job.variant,
                    total_files: q.job.total_files(),
                    enqueued_at: q.job.enqueued_at,
                })
                .collect(),
        }
    }
}
