//! Handlers for batch enqueue and queue inspection.
//!
//! Enqueue answers as soon as the job is queued; the run's outcome is
//! reported over the progress stream, so the completion receiver on
//! the receipt is intentionally dropped here.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use tilebot_core::job::{BatchMetadata, UploadVariant};
use tilebot_core::CoreError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for POST /automation/mbtiles and /automation/xyz.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(flatten)]
    pub metadata: BatchMetadata,
    pub file_paths: Vec<PathBuf>,
    /// Optional caller-chosen session id; synthesized when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response for a successful enqueue.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub session_id: String,
    pub queue_position: usize,
}

// ---------------------------------------------------------------------------
// Enqueue
// ---------------------------------------------------------------------------

/// POST /api/v1/automation/mbtiles
pub async fn enqueue_mbtiles(
    State(state): State<AppState>,
    Json(input): Json<EnqueueRequest>,
) -> AppResult<impl IntoResponse> {
    enqueue(state, UploadVariant::Mbtiles, input).await
}

/// POST /api/v1/automation/xyz
pub async fn enqueue_xyz(
    State(state): State<AppState>,
    Json(input): Json<EnqueueRequest>,
) -> AppResult<impl IntoResponse> {
    enqueue(state, UploadVariant::Xyz, input).await
}

async fn enqueue(
    state: AppState,
    variant: UploadVariant,
    input: EnqueueRequest,
) -> AppResult<Json<DataResponse<EnqueueResponse>>> {
    let receipt = state
        .automation
        .enqueue_batch(variant, input.metadata, input.file_paths, input.session_id)
        .await?;

    Ok(Json(DataResponse {
        data: EnqueueResponse {
            session_id: receipt.session_id,
            queue_position: receipt.queue_position,
        },
    }))
}

// ---------------------------------------------------------------------------
// Queue inspection
// ---------------------------------------------------------------------------

/// GET /api/v1/automation/queue/status
pub async fn queue_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let status = state.automation.queue_status().await;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /api/v1/automation/queue/{session_id}
///
/// Only waiting jobs can be removed; the running job reports 404.
pub async fn remove_queued(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !state.automation.remove_queued(&session_id).await {
        return Err(AppError::Core(CoreError::SessionNotFound(session_id)));
    }

    Ok(Json(DataResponse {
        data: serde_json::json!({ "session_id": session_id, "removed": true }),
    }))
}
