// src/engine/orchestrator.rs

//! Runs one build or update batch from start to report.
//!
//! A build batch reads the filter manifest, expands scene references, runs
//! every declared file through classify → plan → resolve conflicts →
//! execute, and finally sweeps the external dependency directories. An
//! update batch does the same for a list of already known files.
//!
//! Nothing in here fails the batch as a whole except an unreadable or
//! invalid manifest. Per-file failures become messages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::classify::manifest::{check_namespaces, parse_manifest};
use crate::classify::scene::{
    is_scene_file, reference_filter, reference_path, scene_references, ReferenceGraph,
};
use crate::classify::{designated_output, Classifier, ModelImporter};
use crate::config::{InvocationConfig, Settings};
use crate::engine::phase::BatchPhase;
use crate::engine::registry::PendingFile;
use crate::errors::is_permission_denied;
use crate::exec::{Deployer, ShaderCompiler};
use crate::fs::FileSystem;
use crate::model::{Batch, Message};
use crate::plan::{kick_out_shared, resolve_against, DeploymentPlan, PlanKind};
use crate::status::StatusBoard;
use crate::types::{BuildConfiguration, EventKind};
use crate::watch::hash::is_unchanged;

/// Filter path given to every file found by the external sweep.
pub const EXTERNAL_FILTER: &str = ".";

/// One input file of a batch, with the filter it is deployed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub filter: String,
}

/// Where a file handed to the pipeline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Manifest,
    Update,
    External { skip_existing: bool },
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    settings: Arc<Settings>,
    fs: Arc<dyn FileSystem>,
    importer: Arc<dyn ModelImporter>,
    compiler: Arc<dyn ShaderCompiler>,
    status: StatusBoard,
}

impl Orchestrator {
    pub fn new(
        settings: Arc<Settings>,
        fs: Arc<dyn FileSystem>,
        importer: Arc<dyn ModelImporter>,
        compiler: Arc<dyn ShaderCompiler>,
        status: StatusBoard,
    ) -> Self {
        Self {
            settings,
            fs,
            importer,
            compiler,
            status,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Full build batch for one build event.
    pub fn run_build(&self, config: &InvocationConfig) -> Batch {
        let mut batch = Batch::new(EventKind::Build, config.identity());
        let project = project_name(config);
        info!(instance = %batch.instance, project = %project, "build batch started");
        self.status
            .set(format!("Analyzing files to deploy from '{project}'..."));

        let Some(inputs) = self.collect_inputs(&mut batch, config) else {
            batch.record_phase(BatchPhase::Reporting);
            return batch;
        };

        let classifier = match Classifier::new(self.fs.as_ref(), self.importer.as_ref()) {
            Ok(c) => c,
            Err(err) => {
                batch.messages.push(Message::error(format!("{err:#}")));
                batch.record_phase(BatchPhase::Reporting);
                return batch;
            }
        };

        for input in &inputs {
            self.handle_file(
                &mut batch,
                &classifier,
                config,
                &input.path,
                &input.filter,
                Origin::Manifest,
            );
        }

        self.sweep_externals(&mut batch, &classifier, config);

        batch.record_phase(BatchPhase::Reporting);
        info!(
            instance = %batch.instance,
            deployed = batch.deployed_count(),
            "build batch finished"
        );
        batch
    }

    /// Update batch for files whose sources changed.
    pub fn run_update(&self, config: &InvocationConfig, files: &[PendingFile]) -> Batch {
        let mut batch = Batch::new(EventKind::Update, config.identity());
        info!(instance = %batch.instance, files = files.len(), "update batch started");

        let classifier = match Classifier::new(self.fs.as_ref(), self.importer.as_ref()) {
            Ok(c) => c,
            Err(err) => {
                batch.messages.push(Message::error(format!("{err:#}")));
                batch.record_phase(BatchPhase::Reporting);
                return batch;
            }
        };

        for file in files {
            if self.settings.deploy.use_hash
                && is_unchanged(
                    self.fs.as_ref(),
                    &file.input_path,
                    file.content_hash.as_deref(),
                )
            {
                debug!(file = ?file.input_path, "content unchanged, not redeploying");
                continue;
            }
            self.handle_file(
                &mut batch,
                &classifier,
                config,
                &file.input_path,
                &file.filter_path,
                Origin::Update,
            );
        }

        batch.record_phase(BatchPhase::Reporting);
        batch
    }

    /// Parse the manifest and expand scene references.
    ///
    /// Returns `None` after recording a fatal message if the manifest cannot
    /// be used at all.
    pub fn collect_inputs(
        &self,
        batch: &mut Batch,
        config: &InvocationConfig,
    ) -> Option<Vec<InputFile>> {
        batch.record_phase(BatchPhase::ParsingManifest);
        let entries = match self.read_manifest(config) {
            Ok(entries) => entries,
            Err(err) => {
                error!(manifest = ?config.filters_path, error = %err, "manifest rejected");
                batch.messages.push(Message::error(format!("{err:#}")));
                return None;
            }
        };

        batch.record_phase(BatchPhase::ExpandingReferences);
        let mut graph = ReferenceGraph::new();
        let mut inputs = Vec::with_capacity(entries.len());
        for entry in entries {
            self.expand_into(batch, &mut graph, entry, &mut inputs);
        }
        debug!(count = inputs.len(), "input files collected");
        Some(inputs)
    }

    fn read_manifest(&self, config: &InvocationConfig) -> Result<Vec<InputFile>> {
        let text = self
            .fs
            .read_to_string(&config.filters_path)
            .with_context(|| {
                format!(
                    "Could not read filter manifest '{}'",
                    config.filters_path.display()
                )
            })?;
        let entries = parse_manifest(&text)?;
        check_namespaces(&entries)?;

        let dir = config.project_dir();
        Ok(entries
            .into_iter()
            .map(|entry| InputFile {
                path: entry.input_path(dir),
                filter: entry.filter,
            })
            .collect())
    }

    /// Push `input`, then (for scenes) everything it references right after
    /// it, recursively.
    fn expand_into(
        &self,
        batch: &mut Batch,
        graph: &mut ReferenceGraph,
        input: InputFile,
        out: &mut Vec<InputFile>,
    ) {
        let scene = input.path.clone();
        let filter = input.filter.clone();
        out.push(input);

        if !is_scene_file(&scene) || !self.fs.is_file(&scene) {
            return;
        }

        let references = match self
            .fs
            .read_to_string(&scene)
            .and_then(|json| scene_references(&json))
        {
            Ok(references) => references,
            Err(err) => {
                warn!(scene = ?scene, error = %err, "scene references not readable");
                batch.messages.push(
                    Message::warning(format!(
                        "Could not read the references of scene '{}': {err:#}",
                        scene.display()
                    ))
                    .at(&scene, None),
                );
                return;
            }
        };

        for reference in references {
            let path = reference_path(&scene, &reference);
            if !graph.add_reference(&scene, &path) {
                batch.messages.push(
                    Message::warning(format!(
                        "Scene '{}' references '{}' cyclically. The reference is ignored.",
                        scene.display(),
                        path.display()
                    ))
                    .at(&scene, None),
                );
                continue;
            }
            let referenced = InputFile {
                path,
                filter: reference_filter(&filter, &reference),
            };
            self.expand_into(batch, graph, referenced, out);
        }
    }

    /// Deploy every file below the external dependency roots.
    fn sweep_externals(&self, batch: &mut Batch, classifier: &Classifier<'_>, config: &InvocationConfig) {
        let sub_path = self.external_sub_path(config.configuration);
        let skip_existing = !self.settings.deploy.overwrite_existing_externals;

        for root in &config.external_paths {
            let dir = root
                .join(sub_path)
                .join("bin")
                .join(config.platform.as_path_part());

            if !self.fs.is_dir(&dir) {
                batch.messages.push(Message::error(format!(
                    "Path to framework's externals does not exist?! This one => '{}'",
                    dir.display()
                )));
                continue;
            }

            let files = match self.fs.walk_files(&dir) {
                Ok(files) => files,
                Err(err) => {
                    batch.messages.push(Message::error(format!("{err:#}")).at(&dir, None));
                    continue;
                }
            };
            debug!(dir = ?dir, files = files.len(), "sweeping external dependencies");

            for file in files {
                self.handle_file(
                    batch,
                    classifier,
                    config,
                    &file,
                    EXTERNAL_FILTER,
                    Origin::External { skip_existing },
                );
            }
        }
    }

    fn external_sub_path(&self, configuration: BuildConfiguration) -> &str {
        let externals = &self.settings.externals;
        if externals.always_deploy_release {
            return &externals.release_sub_path;
        }
        match configuration {
            BuildConfiguration::Debug => &externals.debug_sub_path,
            BuildConfiguration::Release | BuildConfiguration::Publish => {
                &externals.release_sub_path
            }
        }
    }

    /// Classify, plan, resolve and execute a single input file.
    fn handle_file(
        &self,
        batch: &mut Batch,
        classifier: &Classifier<'_>,
        config: &InvocationConfig,
        input: &Path,
        filter: &str,
        origin: Origin,
    ) {
        self.status.set(format!(
            "Deploying files from '{}' (currently working on '{}')...",
            project_name(config),
            file_name(input)
        ));

        if let Origin::External { skip_existing: true } = origin {
            if self.fs.exists(&designated_output(config, input, filter)) {
                debug!(file = ?input, "already deployed, skipping");
                return;
            }
        }

        batch.record_phase(BatchPhase::ClassifyingAndPlanning);
        let mut plan = match classifier.prepare(config, input, filter) {
            Ok(Some(plan)) => plan,
            Ok(None) => return,
            Err(err) => {
                warn!(file = ?input, error = %err, "file could not be planned");
                batch
                    .messages
                    .push(Message::error(format!("{err:#}")).at(input, None));
                return;
            }
        };

        batch.record_phase(BatchPhase::ResolvingConflicts);
        match resolve_against(&mut plan, &batch.plans) {
            Ok(outcome) => {
                for idx in outcome.unresolved {
                    let text = format!(
                        "File '{}' has an unresolvable conflict with file '{}'.",
                        plan.input_path.display(),
                        batch.plans[idx].input_path.display()
                    );
                    batch.messages.push(Message::warning(text));
                }
            }
            Err(err) => {
                batch
                    .messages
                    .push(Message::error(format!("{err:#}")).at(input, None));
                return;
            }
        }
        kick_out_shared(&mut plan, &batch.plans);

        batch.record_phase(BatchPhase::Executing);
        let deployer = Deployer::new(
            &self.settings,
            config,
            self.fs.as_ref(),
            self.compiler.as_ref(),
        );
        if let Err(err) = deployer.execute(&mut plan) {
            if plan.produced.is_empty() {
                error!(file = ?input, error = %err, "deployment failed");
                batch
                    .messages
                    .push(Message::error(format!("{err:#}")).at(input, None));
                return;
            }
            self.attach_failure(&mut plan, &err, origin);
        }

        let notify = self.notify_for(&plan.kind);
        batch.accept(plan, notify);
    }

    /// Record a failed execution on the last file the plan produced.
    fn attach_failure(&self, plan: &mut DeploymentPlan, err: &anyhow::Error, origin: Origin) {
        let downgrade = self.settings.deploy.hide_access_denied_errors_for_dlls
            && matches!(origin, Origin::External { .. })
            && is_permission_denied(err);

        let Some(last) = plan.produced.last_mut() else {
            return;
        };

        if downgrade && is_dll_like(&last.input_path, err) {
            info!(file = ?last.input_path, "access denied on a library, probably still in use");
            let text = format!(
                "Could not deploy '{}' because access was denied; it is probably still in use: {err:#}",
                last.input_path.display()
            );
            let location = last.input_path.clone();
            last.messages.push(Message::info(text).at(location, None));
        } else {
            error!(file = ?last.input_path, error = %err, "deployment failed");
            let location = last.input_path.clone();
            last.messages
                .push(Message::error(format!("{err:#}")).at(location, None));
        }
    }

    fn notify_for(&self, kind: &PlanKind) -> bool {
        let notify = &self.settings.notify;
        match kind {
            PlanKind::VkShader { .. } => notify.vk_shader,
            PlanKind::GlShader { .. } => notify.gl_shader,
            PlanKind::Model(_) => notify.model,
            PlanKind::Copy { .. } => false,
        }
    }
}

/// File name of the project file, used in status texts.
pub fn project_name(config: &InvocationConfig) -> String {
    file_name(&config.project_path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_dll_like(path: &Path, err: &anyhow::Error) -> bool {
    let by_extension = path.extension().is_some_and(|ext| {
        ["dll", "so", "dylib"]
            .iter()
            .any(|lib| ext.eq_ignore_ascii_case(lib))
    });
    by_extension || format!("{err:#}").to_lowercase().contains(".dll")
}
