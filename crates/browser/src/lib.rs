//! Chrome DevTools Protocol client for driving the portal UI.
//!
//! Launches a real Chrome with a persistent profile, connects to its
//! first page target over WebSocket, and exposes the small set of UI
//! operations the upload driver needs via the [`UiSurface`] trait.
//!
//! The browser session is a process-wide singleton resource: exactly
//! one automation run may interact with it at a time (enforced by the
//! automation engine, not here).

pub mod cdp;
pub mod error;
pub mod launcher;
pub mod page;
pub mod surface;

pub use error::BrowserError;
pub use launcher::{launch, Browser, BrowserConfig};
pub use page::PageHandle;
pub use surface::UiSurface;
