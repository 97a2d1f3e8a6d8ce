// src/lib.rs

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod plan;
pub mod status;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::classify::BuiltinImporter;
use crate::cli::CliArgs;
use crate::config::{load_settings, InvocationConfig};
use crate::engine::{
    CoreOptions, DaemonCore, DaemonEvent, Orchestrator, Runtime, WorkerBackend,
};
use crate::exec::GlslangCompiler;
use crate::fs::RealFileSystem;
use crate::model::Batch;
use crate::status::{spawn_status_server, StatusBoard};
use crate::types::EventKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings and invocation parsing
/// - the orchestrator and its worker backend
/// - the daemon core / runtime
/// - the status server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = Arc::new(load_settings(args.settings.as_deref())?);
    let config = Arc::new(args.invocation_config()?);
    info!(instance = %config.identity(), "invocation accepted");

    let status = StatusBoard::new();
    let compiler = GlslangCompiler::from_settings(&settings.tools, Handle::current());
    let orchestrator = Orchestrator::new(
        Arc::clone(&settings),
        Arc::new(RealFileSystem),
        Arc::new(BuiltinImporter),
        Arc::new(compiler),
        status.clone(),
    );

    if args.dry_run {
        print_dry_run(&orchestrator, &config);
        return Ok(());
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<DaemonEvent>(64);

    let backend = WorkerBackend::new(orchestrator, rt_tx.clone());
    let _status_server = spawn_status_server(status.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(DaemonEvent::ShutdownRequested).await;
        });
    }

    rt_tx.send(DaemonEvent::BuildRequested(config)).await?;

    // Without watching there is nothing left to do after the build.
    let exit_when_idle = args.once || !settings.watch.monitor_files;
    let core = DaemonCore::new(CoreOptions::from_settings(&settings, exit_when_idle));

    let runtime = Runtime::new(core, rt_rx, rt_tx, backend, status);
    runtime.run().await?;
    Ok(())
}

/// Dry-run output: every file the build would look at, with its filter.
fn print_dry_run(orchestrator: &Orchestrator, config: &InvocationConfig) {
    println!("postdeploy dry-run");
    println!("  instance = {}", config.identity());
    println!("  target api = {:?}", config.target_api);
    println!("  configuration = {:?}", config.configuration);
    println!("  output = {}", config.output_path.display());
    println!();

    let mut batch = Batch::new(EventKind::Build, config.identity());
    if let Some(inputs) = orchestrator.collect_inputs(&mut batch, config) {
        println!("files ({}):", inputs.len());
        for input in &inputs {
            println!("  - {}", input.path.display());
            println!("      filter: {}", input.filter);
        }
    }

    if !batch.messages.is_empty() {
        println!();
        println!("messages ({}):", batch.messages.len());
        for message in &batch.messages {
            println!("  {message}");
        }
    }

    debug!("dry-run complete (nothing deployed)");
}
