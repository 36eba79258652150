//! DevTools protocol transport: id-correlated commands over WebSocket.
//!
//! [`CdpConnection`] serializes each command as `{"id", "method",
//! "params"}`, parks a oneshot sender in a pending map, and a reader
//! task routes the matching response back by id. Protocol events
//! (frames with a `method` field) are logged at trace level — the
//! driver works by polling evaluate calls, not by event subscription.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::BrowserError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<serde_json::Value, BrowserError>>>>>;

/// A live DevTools connection to one page target.
pub struct CdpConnection {
    writer: Mutex<WsSink>,
    pending: PendingMap,
    next_id: AtomicU64,
}

impl CdpConnection {
    /// Connect to a target's `webSocketDebuggerUrl` and start the
    /// response reader task.
    pub async fn connect(ws_url: &str) -> Result<Arc<Self>, BrowserError> {
        let (ws_stream, _response) = connect_async(ws_url)
            .await
            .map_err(|e| BrowserError::Connection(format!("connect to {ws_url}: {e}")))?;

        let (writer, reader) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(read_responses(reader, Arc::clone(&pending)));

        Ok(Arc::new(Self {
            writer: Mutex::new(writer),
            pending,
            next_id: AtomicU64::new(1),
        }))
    }

    /// Issue one DevTools command and await its response payload.
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, BrowserError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let frame = serde_json::json!({
            "id": id,
            "method": method,
            "params": params,
        });

        let send_result = self
            .writer
            .lock()
            .await
            .send(Message::Text(frame.to_string().into()))
            .await;

        if let Err(e) = send_result {
            self.pending.lock().await.remove(&id);
            return Err(BrowserError::Connection(format!("send {method}: {e}")));
        }

        match rx.await {
            Ok(result) => result.map_err(|e| match e {
                BrowserError::Protocol { message, .. } => BrowserError::Protocol {
                    method: method.to_string(),
                    message,
                },
                other => other,
            }),
            Err(_) => Err(BrowserError::Connection(format!(
                "connection closed while awaiting {method}"
            ))),
        }
    }
}

/// Read frames until the socket closes, routing responses by id.
async fn read_responses(mut reader: WsSource, pending: PendingMap) {
    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                route_frame(&text, &pending).await;
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_)) => {}
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "DevTools WebSocket closed");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "DevTools WebSocket receive error");
                break;
            }
        }
    }

    // Fail every caller still waiting so they do not hang forever.
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(BrowserError::Connection(
            "DevTools connection closed".to_string(),
        )));
    }
}

async fn route_frame(text: &str, pending: &PendingMap) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, raw = %text, "Unparseable DevTools frame");
            return;
        }
    };

    let Some(id) = value.get("id").and_then(|v| v.as_u64()) else {
        // Not a command response but a protocol event.
        if let Some(method) = value.get("method").and_then(|v| v.as_str()) {
            tracing::trace!(method, "DevTools event");
        }
        return;
    };

    let Some(tx) = pending.lock().await.remove(&id) else {
        tracing::warn!(id, "DevTools response with no pending command");
        return;
    };

    let outcome = if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown protocol error")
            .to_string();
        Err(BrowserError::Protocol {
            method: String::new(),
            message,
        })
    } else {
        Ok(value.get("result").cloned().unwrap_or(serde_json::Value::Null))
    };

    let _ = tx.send(outcome);
}
