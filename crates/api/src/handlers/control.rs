//! Handlers for run control: pause, resume, abort.
//!
//! Control flags apply to the running session only; a session that is
//! waiting in the queue or already finished reports 404.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use tilebot_core::CoreError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/automation/pause/{session_id}
pub async fn pause(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !state.automation.pause(&session_id).await {
        return Err(no_active_run(&session_id));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "session_id": session_id, "paused": true }),
    }))
}

/// POST /api/v1/automation/resume/{session_id}
pub async fn resume(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !state.automation.resume(&session_id).await {
        return Err(no_active_run(&session_id));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "session_id": session_id, "resumed": true }),
    }))
}

/// POST /api/v1/automation/abort/{session_id}
///
/// One-way: the run winds down at its next gate and cannot be resumed.
pub async fn abort(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !state.automation.abort(&session_id).await {
        return Err(no_active_run(&session_id));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "session_id": session_id, "aborted": true }),
    }))
}

fn no_active_run(session_id: &str) -> AppError {
    AppError::Core(CoreError::SessionNotFound(session_id.to_string()))
}
