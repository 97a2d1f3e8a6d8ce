// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::InvocationConfig;
use crate::errors::{DeployError, Result};
use crate::model::{Batch, MessageKind};
use crate::normalize::NormalizedPath;
use crate::status::StatusBoard;
use crate::types::EventKind;
use crate::watch::{spawn_watcher, WatcherHandle};

use super::core::DaemonCore;
use super::orchestrator::Orchestrator;
use super::registry::PendingFile;
use super::report::BatchReport;
use super::{CoreCommand, DaemonEvent};

/// How long a finished batch's status line stays visible.
const STATUS_CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Trait abstracting where batches run.
///
/// Implementations report every finished batch back as
/// `DaemonEvent::BatchFinished`, exactly once per call.
pub trait BatchBackend: Send {
    fn run_build(
        &mut self,
        config: Arc<InvocationConfig>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    fn run_update(
        &mut self,
        config: Arc<InvocationConfig>,
        files: Vec<PendingFile>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs every batch on a blocking worker thread.
///
/// A panicking worker still produces a batch, carrying one fatal message.
pub struct WorkerBackend {
    orchestrator: Orchestrator,
    runtime_tx: mpsc::Sender<DaemonEvent>,
}

impl WorkerBackend {
    pub fn new(orchestrator: Orchestrator, runtime_tx: mpsc::Sender<DaemonEvent>) -> Self {
        Self {
            orchestrator,
            runtime_tx,
        }
    }

    fn dispatch<F>(&self, kind: EventKind, instance: NormalizedPath, work: F)
    where
        F: FnOnce(&Orchestrator) -> Batch + Send + 'static,
    {
        let orchestrator = self.orchestrator.clone();
        let tx = self.runtime_tx.clone();

        tokio::spawn(async move {
            let joined = tokio::task::spawn_blocking(move || work(&orchestrator)).await;
            let batch = match joined {
                Ok(batch) => batch,
                Err(err) => {
                    error!(instance = %instance, error = %err, "batch worker failed");
                    Batch::fatal(kind, instance, format!("The {kind} worker failed: {err}"))
                }
            };
            if tx.send(DaemonEvent::BatchFinished(Box::new(batch))).await.is_err() {
                debug!("runtime gone before batch finished");
            }
        });
    }
}

impl BatchBackend for WorkerBackend {
    fn run_build(
        &mut self,
        config: Arc<InvocationConfig>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let instance = config.identity();
        self.dispatch(EventKind::Build, instance, move |o| o.run_build(&config));
        Box::pin(async { Ok::<(), DeployError>(()) })
    }

    fn run_update(
        &mut self,
        config: Arc<InvocationConfig>,
        files: Vec<PendingFile>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let instance = config.identity();
        self.dispatch(EventKind::Update, instance, move |o| {
            o.run_update(&config, &files)
        });
        Box::pin(async { Ok::<(), DeployError>(()) })
    }
}

/// Drives the [`DaemonCore`] in response to `DaemonEvent`s and delegates
/// batches to a [`BatchBackend`].
///
/// This is a pure IO shell: timers, watchers, printing and the status
/// line. All decisions are made by the core.
pub struct Runtime<B: BatchBackend> {
    core: DaemonCore,
    event_rx: mpsc::Receiver<DaemonEvent>,
    event_tx: mpsc::Sender<DaemonEvent>,
    backend: B,
    status: StatusBoard,
    watchers: HashMap<NormalizedPath, WatcherHandle>,
    report_tx: Option<mpsc::UnboundedSender<BatchReport>>,
}

impl<B: BatchBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("watchers", &self.watchers.len())
            .finish_non_exhaustive()
    }
}

impl<B: BatchBackend> Runtime<B> {
    pub fn new(
        core: DaemonCore,
        event_rx: mpsc::Receiver<DaemonEvent>,
        event_tx: mpsc::Sender<DaemonEvent>,
        backend: B,
        status: StatusBoard,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            backend,
            status,
            watchers: HashMap::new(),
            report_tx: None,
        }
    }

    /// Also send every report to `tx`.
    pub fn with_report_sink(mut self, tx: mpsc::UnboundedSender<BatchReport>) -> Self {
        self.report_tx = Some(tx);
        self
    }

    /// Main event loop.
    ///
    /// - Consumes `DaemonEvent`s from `event_rx`.
    /// - Feeds them into the core.
    /// - Executes the commands the core returns.
    pub async fn run(mut self) -> Result<()> {
        info!("postdeploy runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::RunBuild(config) => {
                self.backend.run_build(config).await?;
            }
            CoreCommand::RunUpdate { config, files } => {
                debug!(files = files.len(), "dispatching update batch");
                self.backend.run_update(config, files).await?;
            }
            CoreCommand::ScheduleFlush {
                instance,
                ticket,
                delay,
            } => {
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(DaemonEvent::FlushDue { instance, ticket }).await;
                });
            }
            CoreCommand::Watch { instance, dirs } => {
                self.rewatch(instance, dirs);
            }
            CoreCommand::Report(report) => {
                print_report(&report);
                if let Some(tx) = &self.report_tx {
                    // The sink may be gone; reporting goes on regardless.
                    let _ = tx.send(report);
                }
            }
            CoreCommand::ClearStatus { marker } => {
                let status = self.status.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(STATUS_CLEAR_DELAY).await;
                    status.clear_if_contains(&marker);
                });
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    /// Replace the watcher of `instance`. A watcher that cannot be created
    /// only costs live updates, so it is logged and the runtime goes on.
    fn rewatch(&mut self, instance: NormalizedPath, dirs: Vec<PathBuf>) {
        if let Some(current) = self.watchers.get(&instance) {
            if current.dirs() == dirs.as_slice() {
                return;
            }
        }
        self.watchers.remove(&instance);
        if dirs.is_empty() {
            return;
        }

        match spawn_watcher(&dirs, self.event_tx.clone()) {
            Ok(handle) => {
                debug!(instance = %instance, dirs = dirs.len(), "watching deployed sources");
                self.watchers.insert(instance, handle);
            }
            Err(err) => warn!(instance = %instance, error = %err, "could not watch deployed sources"),
        }
    }
}

fn print_report(report: &BatchReport) {
    match report.kind {
        MessageKind::Error => error!(instance = %report.instance, "{}", report.text),
        MessageKind::Warning => warn!(instance = %report.instance, "{}", report.text),
        MessageKind::Success | MessageKind::Information => {
            info!(instance = %report.instance, "{}", report.text)
        }
    }
    for line in &report.emergency {
        warn!(instance = %report.instance, "{line}");
    }

    println!("{report}");
    for line in &report.details {
        println!("  {line}");
    }
}
