//! Batch jobs: the unit of queued work.
//!
//! A batch is a list of tile files plus the metadata shared by every
//! file in it, tagged with the upload variant that selects which UI
//! sequence the interaction driver walks.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which upload flow a batch uses on the portal.
///
/// The two flows share an identical step shape and differ only in the
/// selectors and labels the driver clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadVariant {
    /// MBTiles drone-photo map upload.
    Mbtiles,
    /// XYZ DTM dataset upload.
    Xyz,
}

impl std::fmt::Display for UploadVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadVariant::Mbtiles => write!(f, "mbtiles"),
            UploadVariant::Xyz => write!(f, "xyz"),
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Metadata applied to every file in a batch.
///
/// These values are typed into the portal's registration form after
/// the file has been attached and its derived fields extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Spatial resolution as entered into the form.
    pub resolution: String,
    /// Positional accuracy as entered into the form.
    pub accuracy: String,
    /// Year the survey was conducted.
    pub survey_year: String,
    /// Zero-based index into the portal's data-source dropdown.
    pub data_source_index: u32,
    /// Contact phone number.
    pub phone_number: String,
}

impl BatchMetadata {
    /// Validate that every free-text field is non-empty after trimming.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("resolution", &self.resolution),
            ("accuracy", &self.accuracy),
            ("survey_year", &self.survey_year),
            ("phone_number", &self.phone_number),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Metadata field '{name}' must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Batch job
// ---------------------------------------------------------------------------

/// One queued unit of work: a file list plus shared metadata.
///
/// Created on enqueue, lives in the queue until drained, and is
/// discarded once its run finishes. File order is preserved and
/// defines processing order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchJob {
    pub session_id: SessionId,
    pub variant: UploadVariant,
    pub metadata: BatchMetadata,
    pub file_paths: Vec<PathBuf>,
    pub enqueued_at: Timestamp,
}

impl BatchJob {
    /// Build a job, validating the metadata and file list.
    ///
    /// A missing session id is synthesized from the current time, the
    /// same way the portal's desktop client does.
    pub fn new(
        variant: UploadVariant,
        metadata: BatchMetadata,
        file_paths: Vec<PathBuf>,
        session_id: Option<String>,
    ) -> Result<Self, CoreError> {
        metadata.validate()?;
        if file_paths.is_empty() {
            return Err(CoreError::Validation(
                "A batch must contain at least one file".to_string(),
            ));
        }

        Ok(Self {
            session_id: session_id.unwrap_or_else(synthesize_session_id),
            variant,
            metadata,
            file_paths,
            enqueued_at: chrono::Utc::now(),
        })
    }

    /// Number of files in the batch.
    pub fn total_files(&self) -> usize {
        self.file_paths.len()
    }
}

/// Synthesize a time-based session id (`session_{unix_millis}`).
///
/// Millisecond resolution is enough to avoid collisions between the
/// interactive enqueue requests this system serves.
pub fn synthesize_session_id() -> SessionId {
    format!("session_{}", chrono::Utc::now().timestamp_millis())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> BatchMetadata {
        BatchMetadata {
            resolution: "0.1".into(),
            accuracy: "0.25".into(),
            survey_year: "2024".into(),
            data_source_index: 2,
            phone_number: "081234567890".into(),
        }
    }

    #[test]
    fn job_keeps_file_order() {
        let job = BatchJob::new(
            UploadVariant::Mbtiles,
            metadata(),
            vec!["b.mbtiles".into(), "a.mbtiles".into()],
            Some("session_1".into()),
        )
        .unwrap();
        assert_eq!(job.file_paths[0], PathBuf::from("b.mbtiles"));
        assert_eq!(job.file_paths[1], PathBuf::from("a.mbtiles"));
        assert_eq!(job.total_files(), 2);
    }

    #[test]
    fn missing_session_id_is_synthesized() {
        let job = BatchJob::new(
            UploadVariant::Xyz,
            metadata(),
            vec!["a.zip".into()],
            None,
        )
        .unwrap();
        assert!(job.session_id.starts_with("session_"));
    }

    #[test]
    fn empty_file_list_rejected() {
        let err = BatchJob::new(UploadVariant::Xyz, metadata(), vec![], None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn blank_metadata_field_rejected() {
        let mut md = metadata();
        md.resolution = "   ".into();
        assert!(md.validate().is_err());
    }

    #[test]
    fn valid_metadata_accepted() {
        assert!(metadata().validate().is_ok());
    }

    #[test]
    fn synthesized_ids_are_time_prefixed() {
        let id = synthesize_session_id();
        let millis: i64 = id.strip_prefix("session_").unwrap().parse().unwrap();
        assert!(millis > 0);
    }
}
