//! SSE progress stream handler.
//!
//! One observer per session: subscribing replaces any earlier stream
//! for the same session id. Events are live-only; anything emitted
//! before the stream attaches is not replayed.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use tilebot_automation::{AutomationService, SubscriptionToken};

use crate::state::AppState;

/// Detaches the progress sink when the SSE stream is dropped, i.e.
/// when the client disconnects. Carries this stream's subscription
/// token so a guard outliving a reconnect cannot detach the newer
/// stream's sink.
struct StreamGuard {
    automation: Arc<AutomationService>,
    session_id: String,
    token: SubscriptionToken,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let automation = Arc::clone(&self.automation);
        let session_id = std::mem::take(&mut self.session_id);
        let token = self.token;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                automation.unsubscribe_progress(&session_id, token).await;
                tracing::debug!(session_id, "Progress stream detached");
            });
        }
    }
}

/// GET /api/v1/automation/progress/{session_id}
///
/// Streams `ProgressEvent` JSON for the session until the client
/// disconnects or the sink is replaced by a newer subscriber.
pub async fn progress_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (token, rx) = state.automation.subscribe_progress(&session_id).await;
    tracing::info!(session_id, "Progress stream attached");

    let guard = StreamGuard {
        automation: Arc::clone(&state.automation),
        session_id,
        token,
    };

    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        // The guard lives inside the stream; dropping the stream
        // detaches the sink.
        let _ = &guard;
        Event::default().json_data(&event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
