// src/classify/mod.rs

//! Asset classification.
//!
//! Decides what an input file is and how it is deployed:
//!
//! 1. Files whose filter is not below `assets` or `shaders`, and that do not
//!    live under an external dependency root, are skipped.
//! 2. Files below `shaders` are shaders; the target API picks the flavour.
//! 3. `.fscene` files are scene descriptions (copied as-is; their references
//!    are expanded before planning).
//! 4. Files the [`ModelImporter`] accepts are models.
//! 5. Everything else is a generic file.

pub mod importer;
pub mod manifest;
pub mod obj;
pub mod scene;
pub mod shader;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::InvocationConfig;
use crate::fs::FileSystem;
use crate::model::FileKind;
use crate::normalize::{absolute_path, native_path, normalize};
use crate::plan::{DeploymentPlan, PlanKind};
use crate::types::TargetApi;

pub use importer::{BuiltinImporter, ImportedModel, ModelImporter};

/// Outcome of classifying one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not deployable; not an error.
    Skip,
    Shader { includes: Vec<String> },
    Model {
        textures: Vec<String>,
        materials: Option<String>,
    },
    Scene,
    Generic,
}

/// Classifies input files and turns them into deployment plans.
#[derive(Debug)]
pub struct Classifier<'a> {
    fs: &'a dyn FileSystem,
    importer: &'a dyn ModelImporter,
    assets_root: Regex,
    shaders_root: Regex,
}

impl<'a> Classifier<'a> {
    pub fn new(fs: &'a dyn FileSystem, importer: &'a dyn ModelImporter) -> Result<Self> {
        Ok(Self {
            fs,
            importer,
            assets_root: Regex::new(r"(?i)^assets([\\/].+)*$")?,
            shaders_root: Regex::new(r"(?i)^shaders([\\/].+)*$")?,
        })
    }

    /// True if `input` lives under one of the configured external roots.
    pub fn is_external(&self, config: &InvocationConfig, input: &Path) -> bool {
        let input = normalize(input);
        config
            .external_paths
            .iter()
            .any(|root| input.contains(&normalize(root)))
    }

    pub fn classify(
        &self,
        config: &InvocationConfig,
        input: &Path,
        filter: &str,
    ) -> Result<Classification> {
        if !self.fs.is_file(input) {
            bail!("File '{}' does not exist", input.display());
        }

        let is_asset = self.assets_root.is_match(filter);
        let is_shader = self.shaders_root.is_match(filter);
        if !is_asset && !is_shader && !self.is_external(config, input) {
            debug!(
                file = ?input,
                filter,
                "skipping: neither in 'assets/' nor in 'shaders/' nor an external dependency"
            );
            return Ok(Classification::Skip);
        }

        if is_shader {
            let source = self.fs.read_to_string(input)?;
            return Ok(Classification::Shader {
                includes: shader::scan_includes(&source)?,
            });
        }

        if scene::is_scene_file(input) {
            return Ok(Classification::Scene);
        }

        match self.importer.import(self.fs, input) {
            Ok(Some(model)) => {
                let materials = if has_extension(input, "obj") {
                    obj::find_mtllib(&self.fs.read_to_string(input)?)
                } else {
                    None
                };
                Ok(Classification::Model {
                    textures: model.textures,
                    materials,
                })
            }
            Ok(None) => Ok(Classification::Generic),
            Err(err) => {
                // Maybe it is no model after all.
                warn!(file = ?input, error = %err, "model import failed, deploying as plain file");
                Ok(Classification::Generic)
            }
        }
    }

    /// Classify `input` and build its plan. `None` for skipped files.
    pub fn prepare(
        &self,
        config: &InvocationConfig,
        input: &Path,
        filter: &str,
    ) -> Result<Option<DeploymentPlan>> {
        let classification = self.classify(config, input, filter)?;
        Ok(plan_for(config, input, filter, classification))
    }
}

/// Designated output path: `<output>/<filter>/<file name>`.
pub fn designated_output(config: &InvocationConfig, input: &Path, filter: &str) -> PathBuf {
    let name = input.file_name().unwrap_or_default();
    absolute_path(config.output_path.join(native_path(filter)).join(name))
}

/// Turn a classification into a plan.
pub fn plan_for(
    config: &InvocationConfig,
    input: &Path,
    filter: &str,
    classification: Classification,
) -> Option<DeploymentPlan> {
    let output = designated_output(config, input, filter);
    let input = absolute_path(input);

    let plan = match classification {
        Classification::Skip => return None,
        Classification::Shader { includes } => match config.target_api {
            TargetApi::Vulkan => {
                let mut spv = output.into_os_string();
                spv.push(".spv");
                DeploymentPlan::new(input, filter, spv, PlanKind::VkShader { includes })
            }
            TargetApi::OpenGl => {
                DeploymentPlan::new(input, filter, output, PlanKind::GlShader { includes })
            }
        },
        Classification::Model {
            textures,
            materials,
        } => DeploymentPlan::model(input, filter, output, textures, materials),
        Classification::Scene => DeploymentPlan::new(
            input,
            filter,
            output,
            PlanKind::Copy {
                kind: FileKind::Scene,
            },
        ),
        Classification::Generic => DeploymentPlan::new(
            input,
            filter,
            output,
            PlanKind::Copy {
                kind: FileKind::Generic,
            },
        ),
    };
    Some(plan)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
