// src/engine/registry.rs

//! What every build instance deployed, and which files to watch for it.
//!
//! Owned by the [`DaemonCore`](crate::engine::core::DaemonCore) and only
//! mutated from its event loop.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::InvocationConfig;
use crate::model::{Batch, DeploymentMechanism};
use crate::normalize::{normalize, NormalizedPath};
use crate::plan::DeploymentPlan;
use crate::types::EventKind;

/// A top-level input waiting to be redeployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub input_path: PathBuf,
    pub filter_path: String,
    /// Hash recorded at the last deployment, if hashing is on.
    pub content_hash: Option<String>,
}

/// A deployed input that is watched for changes.
#[derive(Debug, Clone)]
pub struct WatchedFile {
    pub path: PathBuf,
    /// What to redeploy when `path` changes. For child artifacts this is the
    /// owning top-level file.
    pub target: PendingFile,
    pub mechanism: DeploymentMechanism,
}

/// A file other inputs depend on without being deployed itself.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub path: PathBuf,
    pub dependees: Vec<PendingFile>,
}

#[derive(Debug)]
pub struct Instance {
    pub config: Arc<InvocationConfig>,
    pub watched: HashMap<NormalizedPath, WatchedFile>,
    pub dependencies: HashMap<NormalizedPath, Dependency>,
}

impl Instance {
    fn new(config: Arc<InvocationConfig>) -> Self {
        Self {
            config,
            watched: HashMap::new(),
            dependencies: HashMap::new(),
        }
    }
}

/// Build instances keyed by the normalized executable path.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<NormalizedPath, Instance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) an instance for a new build event.
    ///
    /// The configuration is replaced; what was deployed before stays until
    /// the build batch arrives.
    pub fn register(&mut self, config: Arc<InvocationConfig>) -> NormalizedPath {
        let key = config.identity();
        match self.instances.get_mut(&key) {
            Some(instance) => instance.config = config,
            None => {
                self.instances.insert(key.clone(), Instance::new(config));
            }
        }
        key
    }

    pub fn get(&self, instance: &NormalizedPath) -> Option<&Instance> {
        self.instances.get(instance)
    }

    pub fn config(&self, instance: &NormalizedPath) -> Option<Arc<InvocationConfig>> {
        self.instances.get(instance).map(|i| Arc::clone(&i.config))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Fold a finished batch into its instance.
    ///
    /// Build batches replace the watched files and dependency map; update
    /// batches only add to them. Symlinked files are not watched, the link
    /// already reflects every change.
    pub fn apply_batch(&mut self, batch: &Batch) {
        let Some(instance) = self.instances.get_mut(&batch.instance) else {
            debug!(instance = %batch.instance, "batch for unknown instance ignored");
            return;
        };

        if batch.kind == EventKind::Build {
            instance.watched.clear();
            instance.dependencies.clear();
        }

        for plan in &batch.plans {
            let target = plan_target(batch, plan);
            for id in &plan.deployed {
                let Some(file) = batch.file(*id) else {
                    continue;
                };
                let key = normalize(&file.input_path);

                if file.is_dependency() {
                    let dependency =
                        instance
                            .dependencies
                            .entry(key)
                            .or_insert_with(|| Dependency {
                                path: file.input_path.clone(),
                                dependees: Vec::new(),
                            });
                    let known = dependency
                        .dependees
                        .iter()
                        .any(|d| normalize(&d.input_path) == normalize(&target.input_path));
                    // The dependee itself is unchanged when only its
                    // dependency changed, so its hash must not be compared.
                    if !known {
                        dependency.dependees.push(PendingFile {
                            content_hash: None,
                            ..target.clone()
                        });
                    }
                    continue;
                }

                if file.mechanism == DeploymentMechanism::Symlink {
                    instance.watched.remove(&key);
                    continue;
                }

                // A child's change must always redeploy its parent, so it
                // carries no hash that could mark the parent as unchanged.
                let target = if file.parent.is_some() {
                    PendingFile {
                        content_hash: None,
                        ..target.clone()
                    }
                } else {
                    target.clone()
                };

                instance.watched.insert(
                    key,
                    WatchedFile {
                        path: file.input_path.clone(),
                        target,
                        mechanism: file.mechanism,
                    },
                );
            }
        }

        debug!(
            instance = %batch.instance,
            watched = instance.watched.len(),
            dependencies = instance.dependencies.len(),
            "registry updated"
        );
    }

    /// Everything that must be redeployed because `path` changed, per
    /// instance.
    ///
    /// A dependency fans out to all of its dependees; a watched file maps to
    /// its own target.
    pub fn lookup(&self, path: &NormalizedPath) -> Vec<(NormalizedPath, Vec<PendingFile>)> {
        let mut out = Vec::new();
        for (key, instance) in &self.instances {
            if let Some(dependency) = instance.dependencies.get(path) {
                out.push((key.clone(), dependency.dependees.clone()));
            } else if let Some(watched) = instance.watched.get(path) {
                out.push((key.clone(), vec![watched.target.clone()]));
            }
        }
        out
    }

    /// Directories holding the watched files and dependencies of `instance`.
    pub fn watch_dirs(&self, instance: &NormalizedPath) -> Vec<PathBuf> {
        let Some(instance) = self.instances.get(instance) else {
            return Vec::new();
        };

        let files = instance
            .watched
            .values()
            .map(|w| w.path.as_path())
            .chain(instance.dependencies.values().map(|d| d.path.as_path()));

        let dirs: BTreeSet<PathBuf> = files
            .filter_map(Path::parent)
            .map(Path::to_path_buf)
            .collect();
        dirs.into_iter().collect()
    }
}

fn plan_target(batch: &Batch, plan: &DeploymentPlan) -> PendingFile {
    let content_hash = plan
        .deployed
        .iter()
        .filter_map(|id| batch.file(*id))
        .find(|f| !f.is_dependency() && f.parent.is_none())
        .and_then(|f| f.content_hash.clone());

    PendingFile {
        input_path: plan.input_path.clone(),
        filter_path: plan.filter_path.clone(),
        content_hash,
    }
}
