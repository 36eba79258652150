//! The per-file upload sequence, abstracted over the controlled UI.
//!
//! [`UploadDriver`] is the contract the run controller drives; the
//! production implementation walks the portal's upload form through a
//! [`UiSurface`]. The two upload flows (MBTiles, XYZ) share one code
//! path and differ only in their [`selectors::VariantSelectors`].

pub mod portal;
pub mod selectors;

use std::path::Path;

use async_trait::async_trait;

use tilebot_core::job::BatchMetadata;
use tilebot_browser::BrowserError;

use crate::registry::{Aborted, RunControl};

pub use portal::PortalUploadDriver;

/// Terminal result of one file's upload sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was attached, registered, and submitted.
    Completed,
    /// The portal's derived address field was blank; the file was not
    /// submitted. A legitimate outcome, not a failure.
    Skipped(String),
}

/// Failure raised by the upload sequence.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A gate observed the user's abort signal.
    #[error(transparent)]
    Aborted(#[from] Aborted),

    /// The controlled UI failed: element not found, script fault,
    /// connection loss. Recorded per file by the run controller, never
    /// retried here.
    #[error("{0}")]
    Ui(String),
}

impl From<BrowserError> for DriverError {
    fn from(e: BrowserError) -> Self {
        DriverError::Ui(e.to_string())
    }
}

/// Perform one file's upload sequence against the controlled UI.
#[async_trait]
pub trait UploadDriver: Send + Sync {
    async fn upload_one(
        &self,
        file: &Path,
        metadata: &BatchMetadata,
        control: &RunControl,
    ) -> Result<UploadOutcome, DriverError>;
}
