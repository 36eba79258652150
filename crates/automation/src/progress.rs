//! Per-session progress publishing.
//!
//! At most one sink per session; subscribing again replaces the old
//! sink (the newest observer wins). Publishing with no sink is a
//! no-op — this is live telemetry, not a durable log, so nothing is
//! buffered or replayed.
//!
//! Each subscription carries a token, and detaching requires it:
//! observers get replaced and torn down concurrently, so a stale
//! observer's cleanup must not remove the sink that replaced it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};

use tilebot_core::ProgressEvent;

/// Identifies one subscription. Required on unsubscribe so only the
/// holder of the currently attached sink can detach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionToken(u64);

#[derive(Debug)]
struct Sink {
    token: SubscriptionToken,
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

/// Fire-and-forget event fan-out, one sink per session.
#[derive(Debug, Default)]
pub struct ProgressChannel {
    sinks: RwLock<HashMap<String, Sink>>,
    next_token: AtomicU64,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer for a session, replacing any previous one.
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> (SubscriptionToken, mpsc::UnboundedReceiver<ProgressEvent>) {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.sinks
            .write()
            .await
            .insert(session_id.to_string(), Sink { token, tx });
        (token, rx)
    }

    /// Detach the session's observer, but only if it is still the one
    /// the token was issued for. A stale token (the sink has since
    /// been replaced) is a no-op.
    pub async fn unsubscribe(&self, session_id: &str, token: SubscriptionToken) {
        let mut sinks = self.sinks.write().await;
        if sinks.get(session_id).is_some_and(|s| s.token == token) {
            sinks.remove(session_id);
        }
    }

    /// Push an event to the session's sink. Dropped silently when no
    /// observer is attached; a sink whose receiver is gone is removed.
    pub async fn publish(&self, session_id: &str, event: ProgressEvent) {
        let disconnected = {
            let sinks = self.sinks.read().await;
            match sinks.get(session_id) {
                Some(sink) => sink.tx.send(event).is_err(),
                None => false,
            }
        };

        if disconnected {
            self.sinks.write().await.remove(session_id);
            tracing::debug!(session_id, "Removed disconnected progress sink");
        }
    }

    /// Number of attached observers (all sessions).
    pub async fn sink_count(&self) -> usize {
        self.sinks.read().await.len()
    }
}
