//! Process-scoped automation service.
//!
//! The one object that owns all mutable automation state: browser
//! surface slot, job queue, run registry, and progress channel. It is
//! created once at startup, wrapped in `Arc`, and injected into the
//! HTTP layer — never reached through ambient globals.
//!
//! Draining runs on a single background task woken by enqueue; waking
//! an already-draining task is a no-op, so a burst of enqueues never
//! starts a second drain loop.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{oneshot, Notify, RwLock};
use tokio_util::sync::CancellationToken;

use tilebot_browser::UiSurface;
use tilebot_core::job::{BatchJob, BatchMetadata, UploadVariant};
use tilebot_core::{CoreError, FileOutcome, ProgressEvent};

use crate::driver::PortalUploadDriver;
use crate::progress::{ProgressChannel, SubscriptionToken};
use crate::queue::{JobQueue, QueueStatus, QueuedJob};
use crate::registry::RunRegistry;
use crate::runner::run_batch;

/// Synchronous acknowledgment for an accepted batch.
///
/// `outcome` resolves once the run finishes; callers that only want
/// the ack (the HTTP layer reports outcomes via the progress stream)
/// may simply drop it.
#[derive(Debug)]
pub struct EnqueueReceipt {
    pub session_id: String,
    pub queue_position: usize,
    pub outcome: oneshot::Receiver<Result<Vec<FileOutcome>, CoreError>>,
}

/// Owns the queue, registry, progress channel, and browser slot.
pub struct AutomationService {
    queue: JobQueue,
    registry: RunRegistry,
    progress: ProgressChannel,
    surface: RwLock<Option<Arc<dyn UiSurface>>>,
    notify: Notify,
    cancel: CancellationToken,
}

impl AutomationService {
    /// Create the service and spawn its drain task.
    pub fn start() -> Arc<Self> {
        let service = Arc::new(Self {
            queue: JobQueue::new(),
            registry: RunRegistry::new(),
            progress: ProgressChannel::new(),
            surface: RwLock::new(None),
            notify: Notify::new(),
            cancel: CancellationToken::new(),
        });

        let drain = Arc::clone(&service);
        tokio::spawn(async move { drain.drain_loop().await });
        service
    }

    /// Stop the drain task. In-flight UI calls are not interrupted;
    /// the current job finishes naturally.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Install the controlled browser surface after a successful login.
    pub async fn install_surface(&self, surface: Arc<dyn UiSurface>) {
        *self.surface.write().await = Some(surface);
        tracing::info!("Browser surface installed");
    }

    /// Whether the shared browser resource is ready.
    pub async fn browser_ready(&self) -> bool {
        self.surface.read().await.is_some()
    }

    // -- boundary operations --------------------------------------------------

    /// Accept a batch into the queue.
    ///
    /// Admission is rejected before any job is created when the
    /// browser has not been initialized by a prior login.
    pub async fn enqueue_batch(
        &self,
        variant: UploadVariant,
        metadata: BatchMetadata,
        file_paths: Vec<PathBuf>,
        session_id: Option<String>,
    ) -> Result<EnqueueReceipt, CoreError> {
        if !self.browser_ready().await {
            return Err(CoreError::BrowserNotReady);
        }

        let job = BatchJob::new(variant, metadata, file_paths, session_id)?;
        let session_id = job.session_id.clone();
        let total_files = job.total_files();

        let (tx, rx) = oneshot::channel();
        let position = self
            .queue
            .push(QueuedJob {
                job,
                completion: tx,
            })
            .await;

        self.progress
            .publish(&session_id, ProgressEvent::queued(position))
            .await;

        tracing::info!(
            session_id,
            %variant,
            total_files,
            position,
            "Batch added to queue",
        );

        self.notify.notify_one();

        Ok(EnqueueReceipt {
            session_id,
            queue_position: position,
            outcome: rx,
        })
    }

    pub async fn queue_status(&self) -> QueueStatus {
        self.queue.status().await
    }

    /// Remove a waiting job. The running job reports not-found.
    pub async fn remove_queued(&self, session_id: &str) -> bool {
        let removed = self.queue.remove(session_id).await;
        if removed {
            tracing::info!(session_id, "Job removed from queue");
        }
        removed
    }

    /// Pause the session's run. `false` when it is not running.
    pub async fn pause(&self, session_id: &str) -> bool {
        match self.registry.get(session_id).await {
            Some(control) => {
                control.pause();
                self.progress
                    .publish(session_id, ProgressEvent::paused())
                    .await;
                tracing::info!(session_id, "Run paused");
                true
            }
            None => false,
        }
    }

    /// Resume a paused run. `false` when it is not running.
    pub async fn resume(&self, session_id: &str) -> bool {
        match self.registry.get(session_id).await {
            Some(control) => {
                control.resume();
                self.progress
                    .publish(session_id, ProgressEvent::resumed())
                    .await;
                tracing::info!(session_id, "Run resumed");
                true
            }
            None => false,
        }
    }

    /// Signal abort (one-way). `false` when the session is not running.
    pub async fn abort(&self, session_id: &str) -> bool {
        match self.registry.get(session_id).await {
            Some(control) => {
                control.abort();
                self.progress
                    .publish(session_id, ProgressEvent::aborted())
                    .await;
                tracing::info!(session_id, "Run abort signalled");
                true
            }
            None => false,
        }
    }

    /// Attach a progress observer for a session (replacing any other).
    pub async fn subscribe_progress(
        &self,
        session_id: &str,
    ) -> (
        SubscriptionToken,
        tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>,
    ) {
        self.progress.subscribe(session_id).await
    }

    /// Detach the session's progress observer, unless it has already
    /// been replaced by a newer one.
    pub async fn unsubscribe_progress(&self, session_id: &str, token: SubscriptionToken) {
        self.progress.unsubscribe(session_id, token).await;
    }

    // -- drain loop -----------------------------------------------------------

    async fn drain_loop(self: Arc<Self>) {
        tracing::info!("Queue drain task started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Queue drain task shutting down");
                    break;
                }
                _ = self.notify.notified() => {}
            }

            while let Some(queued) = self.queue.take_next().await {
                let session_id = queued.job.session_id.clone();
                tracing::info!(
                    session_id,
                    variant = %queued.job.variant,
                    "Processing job from queue",
                );

                self.progress
                    .publish(&session_id, ProgressEvent::queue_started())
                    .await;

                match self.execute(&queued.job).await {
                    Ok(results) => {
                        let _ = queued.completion.send(Ok(results));
                    }
                    Err(e) => {
                        tracing::error!(session_id, error = %e, "Job failed at queue level");
                        self.progress
                            .publish(&session_id, ProgressEvent::queue_error(&e))
                            .await;
                        let _ = queued.completion.send(Err(e));
                    }
                }

                self.queue.clear_current().await;
            }
        }
    }

    /// Run one job. Queue-level failure here (the browser vanished
    /// between enqueue and drain) surfaces as a `queue_error`;
    /// per-file failures are already absorbed by the run controller.
    async fn execute(&self, job: &BatchJob) -> Result<Vec<FileOutcome>, CoreError> {
        let surface = self
            .surface
            .read()
            .await
            .clone()
            .ok_or(CoreError::BrowserNotReady)?;

        let driver = PortalUploadDriver::new(surface, job.variant);
        Ok(run_batch(job, &self.registry, &driver, &self.progress).await)
    }
}
