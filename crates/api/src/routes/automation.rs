//! Route definitions for upload automation.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{control, progress, queue};
use crate::state::AppState;

/// Routes mounted at `/automation`.
///
/// ```text
/// POST   /mbtiles                -> enqueue_mbtiles
/// POST   /xyz                    -> enqueue_xyz
/// GET    /queue/status           -> queue_status
/// DELETE /queue/{session_id}     -> remove_queued
/// POST   /pause/{session_id}     -> pause
/// POST   /resume/{session_id}    -> resume
/// POST   /abort/{session_id}     -> abort
/// GET    /progress/{session_id}  -> progress_stream (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mbtiles", post(queue::enqueue_mbtiles))
        .route("/xyz", post(queue::enqueue_xyz))
        .route("/queue/status", get(queue::queue_status))
        .route("/queue/{session_id}", delete(queue::remove_queued))
        .route("/pause/{session_id}", post(control::pause))
        .route("/resume/{session_id}", post(control::resume))
        .route("/abort/{session_id}", post(control::abort))
        .route("/progress/{session_id}", get(progress::progress_stream))
}
