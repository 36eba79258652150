pub mod automation;
pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /login                              launch + connect the browser (POST)
///
/// /automation/mbtiles                 enqueue an MBTiles batch (POST)
/// /automation/xyz                     enqueue an XYZ DTM batch (POST)
/// /automation/queue/status            queue snapshot (GET)
/// /automation/queue/{session_id}      remove a waiting job (DELETE)
/// /automation/pause/{session_id}      pause the running session (POST)
/// /automation/resume/{session_id}     resume a paused session (POST)
/// /automation/abort/{session_id}      abort the running session (POST)
/// /automation/progress/{session_id}   SSE progress stream (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login::login))
        .nest("/automation", automation::router())
}
