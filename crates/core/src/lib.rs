//! Domain types for the tilebot upload automation platform.
//!
//! Pure data and validation only: batch jobs, per-file outcomes,
//! progress events, and the shared error taxonomy. No I/O and no
//! async — everything here is usable from both the automation engine
//! and the HTTP layer.

pub mod error;
pub mod events;
pub mod job;
pub mod outcome;
pub mod types;

pub use error::CoreError;
pub use events::{ProgressEvent, ProgressStatus};
pub use job::{synthesize_session_id, BatchJob, BatchMetadata, UploadVariant};
pub use outcome::{FileOutcome, FileStatus};
