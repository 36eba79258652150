//! Per-file outcome classification.
//!
//! Every file a run attempts gets exactly one outcome. Files past an
//! abort point are never attempted and get no entry.

use serde::{Deserialize, Serialize};

/// Terminal classification of one file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Skipped,
    Error,
    Aborted,
}

/// Result of processing one file.
///
/// Use the constructors — they keep `reason`/`error` consistent with
/// the status (reason only for skips, error message only for errors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Path of the file as given in the batch.
    pub file: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn success(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Success,
            reason: None,
            error: None,
        }
    }

    pub fn skipped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Skipped,
            reason: Some(reason.into()),
            error: None,
        }
    }

    pub fn error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Error,
            reason: None,
            error: Some(message.into()),
        }
    }

    pub fn aborted(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Aborted,
            reason: None,
            error: None,
        }
    }
}
