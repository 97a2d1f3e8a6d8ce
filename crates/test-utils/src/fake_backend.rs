use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use postdeploy::config::InvocationConfig;
use postdeploy::engine::{BatchBackend, DaemonEvent, PendingFile};
use postdeploy::errors::{Error, Result};
use postdeploy::model::{Batch, DeployedFile, FileKind};
use postdeploy::plan::{DeploymentPlan, PlanKind};
use postdeploy::types::EventKind;

/// What the fake backend was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Build(PathBuf),
    Update(Vec<PathBuf>),
}

/// A fake backend that:
/// - records which batches were "run"
/// - immediately reports `BatchFinished` for each of them.
///
/// A build batch deploys `build_files` (input, filter) as plain copies; an
/// update batch redeploys exactly the files it was given.
pub struct FakeBatchBackend {
    runtime_tx: tokio::sync::mpsc::Sender<DaemonEvent>,
    build_files: Vec<(PathBuf, String)>,
    pub calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl FakeBatchBackend {
    pub fn new(
        runtime_tx: tokio::sync::mpsc::Sender<DaemonEvent>,
        calls: Arc<Mutex<Vec<BackendCall>>>,
    ) -> Self {
        Self {
            runtime_tx,
            build_files: Vec::new(),
            calls,
        }
    }

    pub fn with_build_file(mut self, input: impl Into<PathBuf>, filter: &str) -> Self {
        self.build_files.push((input.into(), filter.to_string()));
        self
    }
}

fn copy_plan(config: &InvocationConfig, input: &PathBuf, filter: &str) -> DeploymentPlan {
    let output = config
        .output_path
        .join(filter)
        .join(input.file_name().unwrap_or_default());
    let mut plan = DeploymentPlan::new(
        input.clone(),
        filter,
        output.clone(),
        PlanKind::Copy {
            kind: FileKind::Generic,
        },
    );
    plan.produced
        .push(DeployedFile::new(input.clone(), output, filter, FileKind::Generic));
    plan
}

impl BatchBackend for FakeBatchBackend {
    fn run_build(
        &mut self,
        config: Arc<InvocationConfig>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let calls = Arc::clone(&self.calls);
        let files = self.build_files.clone();

        Box::pin(async move {
            calls
                .lock()
                .unwrap()
                .push(BackendCall::Build(config.executable_path.clone()));

            let mut batch = Batch::new(EventKind::Build, config.identity());
            for (input, filter) in &files {
                batch.accept(copy_plan(&config, input, filter), false);
            }

            tx.send(DaemonEvent::BatchFinished(Box::new(batch)))
                .await
                .map_err(|e| Error::msg(e.to_string()))?;
            Ok(())
        })
    }

    fn run_update(
        &mut self,
        config: Arc<InvocationConfig>,
        files: Vec<PendingFile>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let calls = Arc::clone(&self.calls);

        Box::pin(async move {
            calls.lock().unwrap().push(BackendCall::Update(
                files.iter().map(|f| f.input_path.clone()).collect(),
            ));

            let mut batch = Batch::new(EventKind::Update, config.identity());
            for file in &files {
                batch.accept(copy_plan(&config, &file.input_path, &file.filter_path), false);
            }

            tx.send(DaemonEvent::BatchFinished(Box::new(batch)))
                .await
                .map_err(|e| Error::msg(e.to_string()))?;
            Ok(())
        })
    }
}
