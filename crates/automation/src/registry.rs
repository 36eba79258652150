//! Per-run control flags and the in-memory run registry.
//!
//! A [`RunControl`] exists exactly while a run for its session is
//! executing: the run controller creates it on start and removes it on
//! end, whether the run succeeded, errored, or aborted. Control
//! endpoints race against the run loop, so the flags are atomics read
//! at well-defined gates rather than locks held across UI calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

/// How often a paused run re-checks its flags. A periodic check, not a
/// spin-wait: the task is suspended between ticks.
const GATE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Distinct cancellation signal observed at a gate.
///
/// Carried as a typed error instead of a magic message string so the
/// run controller can tell a user abort from a genuine fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Automation aborted by user")]
pub struct Aborted;

/// Control flags for one in-flight run.
#[derive(Debug, Default)]
pub struct RunControl {
    paused: AtomicBool,
    aborted: AtomicBool,
}

impl RunControl {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// One-way: once set, abort is never cleared.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// The gate: wait out a pause (abort stays observable while
    /// waiting), then report an abort if one was signalled.
    pub async fn checkpoint(&self) -> Result<(), Aborted> {
        while self.is_paused() {
            if self.is_aborted() {
                return Err(Aborted);
            }
            tokio::time::sleep(GATE_POLL_INTERVAL).await;
        }
        if self.is_aborted() {
            return Err(Aborted);
        }
        Ok(())
    }
}

/// In-memory table of active runs, keyed by session id.
///
/// Invariant: an entry exists if and only if a run for that session is
/// currently executing.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: RwLock<HashMap<String, Arc<RunControl>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh control entry at run start.
    pub async fn begin(&self, session_id: &str) -> Arc<RunControl> {
        let control = Arc::new(RunControl::default());
        self.runs
            .write()
            .await
            .insert(session_id.to_string(), Arc::clone(&control));
        control
    }

    /// Remove the entry at run end (any terminal path).
    pub async fn finish(&self, session_id: &str) {
        self.runs.write().await.remove(session_id);
    }

    /// Look up the control flags for a running session.
    pub async fn get(&self, session_id: &str) -> Option<Arc<RunControl>> {
        self.runs.read().await.get(session_id).cloned()
    }

    /// Whether a run for this session is currently executing.
    pub async fn is_running(&self, session_id: &str) -> bool {
        self.runs.read().await.contains_key(session_id)
    }
}
