// src/status.rs

//! The free-text "current status" line.
//!
//! Workers write it while a batch runs; outside readers ask for it through
//! the request/response channel returned by [`spawn_status_server`].

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<String>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        debug!(status = %text, "status updated");
        *self.lock() = text;
    }

    pub fn get(&self) -> String {
        self.lock().clone()
    }

    /// Clear the status, but only if it still mentions `marker`. A status
    /// written by a newer batch stays.
    pub fn clear_if_contains(&self, marker: &str) -> bool {
        let mut guard = self.lock();
        if guard.contains(marker) {
            guard.clear();
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A request for the current status text.
#[derive(Debug)]
pub struct StatusRequest {
    pub respond: oneshot::Sender<String>,
}

/// Answer status requests until every sender is dropped.
pub fn spawn_status_server(board: StatusBoard) -> mpsc::Sender<StatusRequest> {
    let (tx, mut rx) = mpsc::channel::<StatusRequest>(16);

    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            // The reader may have gone away; nothing to do then.
            let _ = request.respond.send(board.get());
        }
        debug!("status server finished");
    });

    tx
}

/// Ask a status server for the current text.
pub async fn query_status(server: &mpsc::Sender<StatusRequest>) -> Option<String> {
    let (respond, answer) = oneshot::channel();
    server.send(StatusRequest { respond }).await.ok()?;
    answer.await.ok()
}
