//! The run controller: executes one batch job file by file.
//!
//! Partial-failure policy: only an abort stops the run early. Any
//! other per-file failure is recorded and iteration continues, so a
//! batch of 100 files with 3 failures still processes the other 97.

use tilebot_core::{BatchJob, FileOutcome, ProgressEvent};

use crate::driver::{DriverError, UploadDriver, UploadOutcome};
use crate::progress::ProgressChannel;
use crate::registry::RunRegistry;

/// Run one job to completion (or abort) and return its outcome list.
///
/// Registers the session's control flags for the duration of the run
/// and removes them on every exit path; pause/abort requests arriving
/// for a session with no registry entry are correctly rejected as
/// not-running.
pub async fn run_batch(
    job: &BatchJob,
    registry: &RunRegistry,
    driver: &dyn UploadDriver,
    progress: &ProgressChannel,
) -> Vec<FileOutcome> {
    let session_id = job.session_id.as_str();
    let total = job.total_files();
    let control = registry.begin(session_id).await;

    progress
        .publish(session_id, ProgressEvent::started(session_id, total))
        .await;

    let mut results = Vec::with_capacity(total);

    for (i, path) in job.file_paths.iter().enumerate() {
        let current = i + 1;
        let file_name = path.display().to_string();

        // Pause gate, then abort gate, before the file is touched.
        if control.checkpoint().await.is_err() {
            results.push(FileOutcome::aborted(&file_name));
            break;
        }

        progress
            .publish(
                session_id,
                ProgressEvent::processing(current, total, &file_name),
            )
            .await;

        match driver.upload_one(path, &job.metadata, &control).await {
            Ok(UploadOutcome::Completed) => {
                progress
                    .publish(
                        session_id,
                        ProgressEvent::success(current, total, &file_name),
                    )
                    .await;
                results.push(FileOutcome::success(&file_name));
            }
            Ok(UploadOutcome::Skipped(reason)) => {
                progress
                    .publish(
                        session_id,
                        ProgressEvent::skipped(current, total, &file_name),
                    )
                    .await;
                results.push(FileOutcome::skipped(&file_name, reason));
            }
            Err(DriverError::Aborted(_)) => {
                // Remaining files are never attempted.
                results.push(FileOutcome::aborted(&file_name));
                break;
            }
            Err(DriverError::Ui(message)) => {
                tracing::warn!(
                    session_id,
                    file = %file_name,
                    error = %message,
                    "File upload failed",
                );
                progress
                    .publish(
                        session_id,
                        ProgressEvent::error(current, total, &file_name, &message),
                    )
                    .await;
                results.push(FileOutcome::error(&file_name, message));
            }
        }
    }

    registry.finish(session_id).await;

    progress
        .publish(
            session_id,
            ProgressEvent::completed(total, results.clone()),
        )
        .await;

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use tilebot_core::job::{BatchMetadata, UploadVariant};
    use tilebot_core::{FileStatus, ProgressStatus};

    use crate::registry::RunControl;

    /// Scripted driver: one behaviour per file, in order.
    enum Script {
        Complete,
        Skip,
        Fail(&'static str),
        /// Abort the run just before this file's sequence, as a gate
        /// inside the driver would.
        AbortHere,
    }

    struct MockDriver {
        script: Mutex<std::collections::VecDeque<Script>>,
    }

    impl MockDriver {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl UploadDriver for MockDriver {
        async fn upload_one(
            &self,
            _file: &Path,
            _metadata: &BatchMetadata,
            control: &RunControl,
        ) -> Result<UploadOutcome, DriverError> {
            let step = self.script.lock().unwrap().pop_front().expect("script exhausted");
            match step {
                Script::Complete => Ok(UploadOutcome::Completed),
                Script::Skip => Ok(UploadOutcome::Skipped("Empty alamat".to_string())),
                Script::Fail(msg) => Err(DriverError::Ui(msg.to_string())),
                Script::AbortHere => {
                    control.abort();
                    control.checkpoint().await?;
                    unreachable!("checkpoint must observe the abort")
                }
            }
        }
    }

    fn job(files: &[&str]) -> BatchJob {
        BatchJob::new(
            UploadVariant::Mbtiles,
            BatchMetadata {
                resolution: "0.1".into(),
                accuracy: "0.3".into(),
                survey_year: "2024".into(),
                data_source_index: 1,
                phone_number: "0812".into(),
            },
            files.iter().map(PathBuf::from).collect(),
            Some("session_t".into()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn clean_run_yields_one_outcome_per_file_in_order() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();
        let driver = MockDriver::new(vec![Script::Complete, Script::Complete, Script::Complete]);

        let results = run_batch(&job(&["a", "b", "c"]), &registry, &driver, &progress).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].file, "a");
        assert_eq!(results[1].file, "b");
        assert_eq!(results[2].file, "c");
        assert!(results.iter().all(|r| r.status == FileStatus::Success));
        assert!(!registry.is_running("session_t").await);
    }

    #[tokio::test]
    async fn skip_and_error_do_not_stop_the_run() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();
        let driver = MockDriver::new(vec![
            Script::Complete,
            Script::Skip,
            Script::Fail("element not found"),
        ]);

        let results = run_batch(&job(&["a", "b", "c"]), &registry, &driver, &progress).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, FileStatus::Success);
        assert_eq!(results[1].status, FileStatus::Skipped);
        assert_eq!(results[1].reason.as_deref(), Some("Empty alamat"));
        assert_eq!(results[2].status, FileStatus::Error);
        assert_eq!(results[2].error.as_deref(), Some("element not found"));
    }

    #[tokio::test]
    async fn abort_mid_file_records_aborted_and_skips_the_rest() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();
        let driver = MockDriver::new(vec![Script::Complete, Script::AbortHere]);

        let results = run_batch(&job(&["a", "b", "c"]), &registry, &driver, &progress).await;

        // File b aborted in flight; c was never attempted.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, FileStatus::Success);
        assert_eq!(results[1].status, FileStatus::Aborted);
        assert!(!registry.is_running("session_t").await);
    }

    #[tokio::test]
    async fn events_are_emitted_in_processing_order() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();
        let (_token, mut rx) = progress.subscribe("session_t").await;
        let driver = MockDriver::new(vec![Script::Complete, Script::Skip]);

        run_batch(&job(&["a", "b"]), &registry, &driver, &progress).await;

        let statuses: Vec<ProgressStatus> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ProgressStatus::Started,
                ProgressStatus::Processing,
                ProgressStatus::Success,
                ProgressStatus::Processing,
                ProgressStatus::Skipped,
                ProgressStatus::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn completed_event_carries_the_full_outcome_list() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();
        let (_token, mut rx) = progress.subscribe("session_t").await;
        let driver = MockDriver::new(vec![Script::Complete, Script::Fail("boom")]);

        run_batch(&job(&["a", "b"]), &registry, &driver, &progress).await;

        let completed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|e| e.status == ProgressStatus::Completed)
            .unwrap();
        let results = completed.results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].status, FileStatus::Error);
    }

    #[tokio::test]
    async fn abort_between_files_is_caught_at_the_next_gate() {
        let registry = RunRegistry::new();
        let progress = ProgressChannel::new();

        // Completes file a but signals abort while doing so; the
        // runner's between-file gate must stop before file b.
        struct AbortAfterFirst;
        #[async_trait]
        impl UploadDriver for AbortAfterFirst {
            async fn upload_one(
                &self,
                file: &Path,
                _metadata: &BatchMetadata,
                control: &RunControl,
            ) -> Result<UploadOutcome, DriverError> {
                assert_eq!(file, Path::new("a"), "files after abort must not be attempted");
                control.abort();
                Ok(UploadOutcome::Completed)
            }
        }

        let results = run_batch(
            &job(&["a", "b", "c"]),
            &registry,
            &AbortAfterFirst,
            &progress,
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, FileStatus::Success);
        assert_eq!(results[1].status, FileStatus::Aborted);
        assert_eq!(results[1].file, "b");
        assert!(!registry.is_running("session_t").await);
    }
}
