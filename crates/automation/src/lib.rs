//! Automation engine: job queue, run state machine, and upload driver.
//!
//! One [`service::AutomationService`] per process owns all mutable
//! state: the FIFO batch queue (exactly one job drains at a time, the
//! browser is a single shared resource), the per-run pause/abort
//! registry, and the per-session progress channel. The HTTP layer is a
//! thin shell over this service.

pub mod driver;
pub mod progress;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod service;

pub use driver::{DriverError, PortalUploadDriver, UploadDriver, UploadOutcome};
pub use progress::{ProgressChannel, SubscriptionToken};
pub use queue::{JobQueue, QueueStatus, QueuedJob};
pub use registry::{Aborted, RunControl, RunRegistry};
pub use service::{AutomationService, EnqueueReceipt};
