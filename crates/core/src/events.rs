//! Progress events pushed to whichever observer is subscribed for a
//! session.
//!
//! Events are best-effort live telemetry: at-most-once per emission,
//! no buffering, no replay. Within one session they are emitted in the
//! exact order the run controller processes steps.

use serde::{Deserialize, Serialize};

use crate::outcome::FileOutcome;
use crate::types::SessionId;

/// Lifecycle stage an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Queued,
    QueueStarted,
    QueueError,
    Started,
    Processing,
    Skipped,
    Success,
    Error,
    Paused,
    Resumed,
    Aborted,
    Completed,
}

/// One status snapshot for a session.
///
/// Fields are populated per status; absent fields are omitted from the
/// serialized form. Use the constructors below rather than building
/// the struct by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<FileOutcome>>,
}

impl ProgressEvent {
    fn bare(status: ProgressStatus) -> Self {
        Self {
            status,
            total: None,
            current: None,
            file_name: None,
            message: None,
            session_id: None,
            position: None,
            results: None,
        }
    }

    /// The job was accepted into the queue at the given 1-based position.
    pub fn queued(position: usize) -> Self {
        Self {
            position: Some(position),
            message: Some(format!("Added to queue at position {position}")),
            ..Self::bare(ProgressStatus::Queued)
        }
    }

    /// The drain loop picked the job up.
    pub fn queue_started() -> Self {
        Self {
            message: Some("Job started from queue".to_string()),
            ..Self::bare(ProgressStatus::QueueStarted)
        }
    }

    /// The whole job failed before/outside the per-file loop.
    pub fn queue_error(error: impl std::fmt::Display) -> Self {
        Self {
            message: Some(format!("Job failed: {error}")),
            ..Self::bare(ProgressStatus::QueueError)
        }
    }

    /// The run began; carries the total file count.
    pub fn started(session_id: &str, total: usize) -> Self {
        Self {
            total: Some(total),
            current: Some(0),
            message: Some("Starting automation...".to_string()),
            session_id: Some(session_id.to_string()),
            ..Self::bare(ProgressStatus::Started)
        }
    }

    /// File `current` of `total` is being processed.
    pub fn processing(current: usize, total: usize, file_name: &str) -> Self {
        Self {
            total: Some(total),
            current: Some(current),
            file_name: Some(file_name.to_string()),
            message: Some(format!("Processing file {current} of {total}...")),
            ..Self::bare(ProgressStatus::Processing)
        }
    }

    /// The file's derived address field was blank; it was skipped.
    pub fn skipped(current: usize, total: usize, file_name: &str) -> Self {
        Self {
            total: Some(total),
            current: Some(current),
            file_name: Some(file_name.to_string()),
            message: Some(format!("Skipped file {current}: alamat is empty")),
            ..Self::bare(ProgressStatus::Skipped)
        }
    }

    /// The file was uploaded successfully.
    pub fn success(current: usize, total: usize, file_name: &str) -> Self {
        Self {
            total: Some(total),
            current: Some(current),
            file_name: Some(file_name.to_string()),
            message: Some(format!("File {current} uploaded successfully")),
            ..Self::bare(ProgressStatus::Success)
        }
    }

    /// The file failed with a UI-interaction fault.
    pub fn error(current: usize, total: usize, file_name: &str, error: &str) -> Self {
        Self {
            total: Some(total),
            current: Some(current),
            file_name: Some(file_name.to_string()),
            message: Some(format!("Error processing file {current}: {error}")),
            ..Self::bare(ProgressStatus::Error)
        }
    }

    pub fn paused() -> Self {
        Self {
            message: Some("Automation paused by user".to_string()),
            ..Self::bare(ProgressStatus::Paused)
        }
    }

    pub fn resumed() -> Self {
        Self {
            message: Some("Automation resumed".to_string()),
            ..Self::bare(ProgressStatus::Resumed)
        }
    }

    pub fn aborted() -> Self {
        Self {
            message: Some("Automation aborted by user".to_string()),
            ..Self::bare(ProgressStatus::Aborted)
        }
    }

    /// The run finished; carries the full outcome list.
    pub fn completed(total: usize, results: Vec<FileOutcome>) -> Self {
        Self {
            total: Some(total),
            current: Some(total),
            message: Some("All files processed".to_string()),
            results: Some(results),
            ..Self::bare(ProgressStatus::Completed)
        }
    }
}
