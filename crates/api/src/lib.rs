//! HTTP surface for the tilebot upload automation service.
//!
//! A thin axum shell over [`tilebot_automation::AutomationService`]:
//! login bootstrap, enqueue, queue inspection, run control, and the
//! SSE progress stream. No automation state lives here.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
