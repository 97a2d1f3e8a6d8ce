// src/engine/event_handlers.rs

//! Event handling logic for the daemon core.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::InvocationConfig;
use crate::engine::coalescer::UpdateCoalescer;
use crate::engine::orchestrator::project_name;
use crate::engine::registry::{InstanceRegistry, PendingFile};
use crate::engine::report::BatchReport;
use crate::engine::CoreOptions;
use crate::model::Batch;
use crate::normalize::{normalize, NormalizedPath};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Run a full build batch on a worker.
    RunBuild(Arc<InvocationConfig>),
    /// Run an update batch for these files on a worker.
    RunUpdate {
        config: Arc<InvocationConfig>,
        files: Vec<PendingFile>,
    },
    /// Deliver `FlushDue { instance, ticket }` after `delay`.
    ScheduleFlush {
        instance: NormalizedPath,
        ticket: u64,
        delay: Duration,
    },
    /// Replace the watched directories of an instance.
    Watch {
        instance: NormalizedPath,
        dirs: Vec<PathBuf>,
    },
    /// Show a batch report.
    Report(BatchReport),
    /// Clear the status line shortly, if it still mentions `marker`.
    ClearStatus { marker: String },
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `DaemonEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// A new build event: register the instance and start its build batch.
pub fn handle_build_requested(
    registry: &mut InstanceRegistry,
    in_flight: &mut usize,
    config: Arc<InvocationConfig>,
) -> CoreStep {
    let instance = registry.register(Arc::clone(&config));
    debug!(instance = %instance, "build requested");
    *in_flight += 1;
    CoreStep::continue_with(vec![CoreCommand::RunBuild(config)])
}

/// A watched path changed on disk.
///
/// Temp files are ignored. Everything the registry maps the path to is
/// enqueued; a flush is scheduled for every instance that got something new.
pub fn handle_file_changed(
    registry: &InstanceRegistry,
    coalescer: &mut UpdateCoalescer,
    options: &CoreOptions,
    path: &Path,
) -> CoreStep {
    if path.to_string_lossy().contains(options.temp_file_marker.as_str()) {
        debug!(path = ?path, "temp file change ignored");
        return CoreStep::continue_with(Vec::new());
    }

    let key = normalize(path);
    let mut commands = Vec::new();
    for (instance, files) in registry.lookup(&key) {
        if let Some(ticket) = coalescer.notify(&instance, files) {
            commands.push(CoreCommand::ScheduleFlush {
                instance,
                ticket,
                delay: options.debounce,
            });
        }
    }
    CoreStep::continue_with(commands)
}

/// A debounce timer fired.
pub fn handle_flush_due(
    registry: &InstanceRegistry,
    coalescer: &mut UpdateCoalescer,
    in_flight: &mut usize,
    instance: &NormalizedPath,
    ticket: u64,
) -> CoreStep {
    let mut commands = Vec::new();
    for (instance, files) in coalescer.on_timer(instance, ticket) {
        let Some(config) = registry.config(&instance) else {
            debug!(instance = %instance, "pending files of unknown instance dropped");
            continue;
        };
        *in_flight += 1;
        commands.push(CoreCommand::RunUpdate { config, files });
    }
    CoreStep::continue_with(commands)
}

/// A worker finished a batch: fold it into the registry and report it.
pub fn handle_batch_finished(
    registry: &mut InstanceRegistry,
    coalescer: &UpdateCoalescer,
    options: &CoreOptions,
    in_flight: &mut usize,
    batch: &Batch,
) -> CoreStep {
    *in_flight = in_flight.saturating_sub(1);
    registry.apply_batch(batch);

    let mut commands = vec![CoreCommand::Report(BatchReport::from_batch(batch))];

    if options.monitor_files && !options.exit_when_idle {
        commands.push(CoreCommand::Watch {
            instance: batch.instance.clone(),
            dirs: registry.watch_dirs(&batch.instance),
        });
    }
    if let Some(config) = registry.config(&batch.instance) {
        commands.push(CoreCommand::ClearStatus {
            marker: project_name(&config),
        });
    }

    if options.exit_when_idle && *in_flight == 0 && coalescer.is_empty() {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::continue_with(commands)
}
