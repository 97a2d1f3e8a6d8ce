// src/engine/mod.rs

//! Orchestration engine for postdeploy.
//!
//! This module ties together:
//! - the batch pipeline ([`orchestrator`]): manifest → scene expansion →
//!   classify/plan → conflicts → execute → report
//! - the instance registry and the debounced update coalescer
//! - the main runtime event loop that reacts to:
//!   - build requests
//!   - file-watch events
//!   - debounce timers
//!   - finished batches
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{InvocationConfig, Settings};
use crate::model::Batch;
use crate::normalize::NormalizedPath;

/// Options used by both the core and the async shell.
#[derive(Debug, Clone)]
pub struct CoreOptions {
    /// If true, exit once no batch is running and nothing is pending
    /// (used for `--once`).
    pub exit_when_idle: bool,
    /// Watch deployed sources after a batch.
    pub monitor_files: bool,
    /// Delay between the last change notification and the update flush.
    pub debounce: Duration,
    /// Paths containing this are editor temp files and never trigger.
    pub temp_file_marker: String,
}

impl CoreOptions {
    pub fn from_settings(settings: &Settings, exit_when_idle: bool) -> Self {
        Self {
            exit_when_idle,
            monitor_files: settings.watch.monitor_files,
            debounce: Duration::from_millis(settings.watch.debounce_ms),
            temp_file_marker: settings.watch.temp_file_marker.clone(),
        }
    }
}

/// Events flowing into the runtime from the CLI, watchers, timers and
/// workers.
#[derive(Debug)]
pub enum DaemonEvent {
    /// A build event for one instance.
    BuildRequested(Arc<InvocationConfig>),
    /// A watched path changed on disk.
    FileChanged { path: PathBuf },
    /// A debounce timer fired.
    FlushDue {
        instance: NormalizedPath,
        ticket: u64,
    },
    /// A worker finished a batch.
    BatchFinished(Box<Batch>),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod coalescer;
pub mod core;
pub mod event_handlers;
pub mod orchestrator;
pub mod phase;
pub mod registry;
pub mod report;
pub mod runtime;

pub use coalescer::UpdateCoalescer;
pub use self::core::DaemonCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use orchestrator::{InputFile, Orchestrator};
pub use phase::BatchPhase;
pub use registry::{InstanceRegistry, PendingFile};
pub use report::BatchReport;
pub use runtime::{BatchBackend, Runtime, WorkerBackend};
