// src/plan/mod.rs

//! Deployment plans: one per top-level input file of a batch.
//!
//! A plan knows where its input goes and, for models, which textures come
//! along. Conflict detection and the two ways of resolving it (relocating a
//! model one directory deeper, dropping textures another model already
//! deploys) live here; the batch-level loop is in [`conflict`].

pub mod conflict;
pub mod textures;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

use crate::model::{DeployedFile, FileId, FileKind};
use crate::normalize::{normalize, normalize_partial};
use crate::plan::textures::{build_records, find_output, TextureRecord};

pub use conflict::{kick_out_shared, resolve_against, ConflictOutcome};

/// What the deployer will do with the plan's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanKind {
    /// Plain copy (or symlink). `kind` is `Generic` or `Scene`.
    Copy { kind: FileKind },
    Model(ModelPlan),
    /// GLSL rewritten for the rasterizer API.
    GlShader { includes: Vec<String> },
    /// GLSL compiled to SPIR-V for the explicit API.
    VkShader { includes: Vec<String> },
}

/// Texture bookkeeping of a model plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelPlan {
    /// Texture references, relative to the model's directory, in the order
    /// the importer reported them.
    pub textures: Vec<String>,
    /// Normalized output/input pairs, deduplicated by output path.
    pub records: Vec<TextureRecord>,
    /// Materials library of an `.obj` model, relative to its directory.
    pub materials: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub filter_path: String,
    pub input_path: PathBuf,
    /// Designated primary output path.
    pub output_path: PathBuf,
    pub kind: PlanKind,
    /// Files written while executing; parent ids are local to this list.
    pub produced: Vec<DeployedFile>,
    /// Ids in the batch arena, filled in when the batch accepts the plan.
    pub deployed: Vec<FileId>,
}

impl DeploymentPlan {
    pub fn new(
        input_path: impl Into<PathBuf>,
        filter_path: impl Into<String>,
        output_path: impl Into<PathBuf>,
        kind: PlanKind,
    ) -> Self {
        let mut plan = Self {
            filter_path: filter_path.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            kind,
            produced: Vec::new(),
            deployed: Vec::new(),
        };
        plan.rebuild_records();
        plan
    }

    /// Convenience constructor for a model plan.
    pub fn model(
        input_path: impl Into<PathBuf>,
        filter_path: impl Into<String>,
        output_path: impl Into<PathBuf>,
        textures: Vec<String>,
        materials: Option<String>,
    ) -> Self {
        Self::new(
            input_path,
            filter_path,
            output_path,
            PlanKind::Model(ModelPlan {
                textures,
                records: Vec::new(),
                materials,
            }),
        )
    }

    pub fn is_model(&self) -> bool {
        matches!(self.kind, PlanKind::Model(_))
    }

    pub fn model_plan(&self) -> Option<&ModelPlan> {
        match &self.kind {
            PlanKind::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn input_dir(&self) -> &Path {
        self.input_path.parent().unwrap_or_else(|| Path::new("/"))
    }

    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Two plans conflict when they write the same output from different
    /// inputs. Between models, texture outputs are compared as well.
    pub fn has_conflict_with(&self, other: &DeploymentPlan) -> bool {
        if let (PlanKind::Model(mine), PlanKind::Model(theirs)) = (&self.kind, &other.kind) {
            for record in &mine.records {
                if let Some(existing) = find_output(&theirs.records, &record.output) {
                    if existing.input != record.input {
                        return true;
                    }
                }
            }
        }

        normalize(&self.output_path) == normalize(&other.output_path)
            && normalize(&self.input_path) != normalize(&other.input_path)
    }

    /// Move the output one directory deeper, into a directory named after the
    /// file, and recompute texture outputs.
    ///
    /// Fails if the output already sits in a directory of its own name.
    pub fn resolve_conflict_by_relocating(&mut self) -> Result<()> {
        let Some(name) = self.output_path.file_name().map(|n| n.to_os_string()) else {
            bail!("output path {:?} has no file name", self.output_path);
        };
        let dir = self.output_dir().to_path_buf();
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if normalize_partial(&dir_name) == normalize_partial(&name.to_string_lossy()) {
            bail!(
                "It looks like this model has already been moved into a subfolder: current output path = '{}'",
                self.output_path.display()
            );
        }

        self.output_path = dir.join(&name).join(&name);
        debug!(output = ?self.output_path, "relocated plan output");
        self.rebuild_records();
        Ok(())
    }

    /// Drop every texture whose output another model plan already claims.
    pub fn kick_out_shared_textures(&mut self, other: &DeploymentPlan) {
        let Some(theirs) = other.model_plan() else {
            return;
        };
        let claimed: Vec<_> = theirs.records.iter().map(|r| r.output.clone()).collect();
        let output_dir = self.output_dir().to_path_buf();

        if let PlanKind::Model(mine) = &mut self.kind {
            let before = mine.textures.len();
            mine.textures.retain(|relative| {
                let output = normalize(textures::texture_output_path(&output_dir, relative));
                !claimed.contains(&output)
            });
            if mine.textures.len() != before {
                debug!(
                    removed = before - mine.textures.len(),
                    "dropped textures deployed by another model"
                );
            }
        }
        self.rebuild_records();
    }

    /// Recompute the normalized texture records from the texture list.
    pub fn rebuild_records(&mut self) {
        let input_dir = self.input_dir().to_path_buf();
        let output_dir = self.output_dir().to_path_buf();
        if let PlanKind::Model(model) = &mut self.kind {
            model.records = build_records(&model.textures, &input_dir, &output_dir);
        }
    }
}
