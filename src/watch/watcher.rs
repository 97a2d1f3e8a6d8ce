// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::DaemonEvent;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl WatcherHandle {
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish()
    }
}

/// Watch each of `dirs` (non-recursively) and forward every changed path
/// as `DaemonEvent::FileChanged`.
///
/// Deciding whether a path matters is left to the core; only access and
/// removal events are dropped here.
pub fn spawn_watcher(dirs: &[PathBuf], runtime_tx: mpsc::Sender<DaemonEvent>) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("postdeploy: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("postdeploy: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    let mut watched = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => watched.push(dir.clone()),
            Err(err) => warn!(dir = ?dir, error = %err, "directory cannot be watched"),
        }
    }
    info!(dirs = watched.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_) | EventKind::Remove(_)) {
                continue;
            }
            debug!(?event, "received notify event");
            for path in event.paths {
                if runtime_tx
                    .send(DaemonEvent::FileChanged { path })
                    .await
                    .is_err()
                {
                    debug!("runtime gone, stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        dirs: watched,
    })
}
