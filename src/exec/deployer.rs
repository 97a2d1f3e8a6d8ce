// src/exec/deployer.rs

//! Executes a [`DeploymentPlan`]: writes files and records what happened.
//!
//! Every artifact is pushed onto `plan.produced` *before* it is written, so
//! when a write fails the caller still sees what had been attempted and can
//! attach the error to the right file.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::{InvocationConfig, Settings};
use crate::exec::compiler::ShaderCompiler;
use crate::exec::glsl::transform_vk_to_gl;
use crate::exec::transcript::interpret;
use crate::fs::FileSystem;
use crate::model::{DeployedFile, DeploymentMechanism, FileId, FileKind, Message};
use crate::normalize::{absolute_path, is_same_or_subdirectory_of, native_path};
use crate::plan::textures::{texture_input_path, texture_output_path};
use crate::plan::{DeploymentPlan, ModelPlan, PlanKind};
use crate::types::BuildConfiguration;
use crate::watch::hash::compute_file_hash;

pub struct Deployer<'a> {
    settings: &'a Settings,
    config: &'a InvocationConfig,
    fs: &'a dyn FileSystem,
    compiler: &'a dyn ShaderCompiler,
}

impl<'a> Deployer<'a> {
    pub fn new(
        settings: &'a Settings,
        config: &'a InvocationConfig,
        fs: &'a dyn FileSystem,
        compiler: &'a dyn ShaderCompiler,
    ) -> Self {
        Self {
            settings,
            config,
            fs,
            compiler,
        }
    }

    pub fn execute(&self, plan: &mut DeploymentPlan) -> Result<()> {
        debug!(input = ?plan.input_path, output = ?plan.output_path, "executing plan");

        match plan.kind.clone() {
            PlanKind::Copy { kind } => self.deploy_generic(plan, kind),
            PlanKind::Model(model) => self.deploy_model(plan, &model),
            PlanKind::GlShader { includes } => self.deploy_gl_shader(plan, &includes),
            PlanKind::VkShader { includes } => self.deploy_vk_shader(plan, &includes),
        }
    }

    fn deploy_generic(&self, plan: &mut DeploymentPlan, kind: FileKind) -> Result<()> {
        self.ensure_parent(&plan.output_path)?;
        let file = DeployedFile::new(&plan.input_path, &plan.output_path, &plan.filter_path, kind);
        let id = push(plan, file);
        self.deploy_file(&mut plan.produced[id.0])
    }

    fn deploy_model(&self, plan: &mut DeploymentPlan, model: &ModelPlan) -> Result<()> {
        let model_dir = plan.input_dir().to_path_buf();
        let output_dir = plan.output_dir().to_path_buf();
        let model_name = file_name(&plan.input_path);

        self.fs.create_dir_all(&output_dir)?;
        let model_file = DeployedFile::new(
            &plan.input_path,
            &plan.output_path,
            &plan.filter_path,
            FileKind::Model3d,
        );
        let model_id = push(plan, model_file);
        self.deploy_file(&mut plan.produced[model_id.0])?;

        for relative in &model.textures {
            let input = texture_input_path(&model_dir, relative);
            let input_dir = input.parent().unwrap_or_else(|| Path::new("/"));

            // A dependent resource must not escape its model's directory.
            if !is_same_or_subdirectory_of(input_dir, &model_dir) {
                plan.produced[model_id.0].messages.push(Message::warning(format!(
                    "The texture '{}' is not located in the same directory or a subdirectory of {}. It will not be deployed.",
                    input.display(),
                    plan.input_path.display()
                )));
                continue;
            }
            if !self.fs.is_file(&input) {
                plan.produced[model_id.0].messages.push(Message::warning(format!(
                    "The texture '{}' (referenced in '{}') does not exist at that path.",
                    input.display(),
                    model_name
                )));
                continue;
            }

            let output = texture_output_path(&output_dir, relative);
            self.ensure_parent(&output)?;
            let texture = DeployedFile::new(&input, &output, &plan.filter_path, FileKind::Generic)
                .with_parent(model_id);
            let id = push(plan, texture);
            self.deploy_file(&mut plan.produced[id.0])?;
        }

        let model_out = plan.output_path.display().to_string();
        plan.produced[model_id.0].messages.push(Message::success(format!(
            "Copied model '{}', and {} dependent material textures.",
            model_out,
            model.textures.len()
        )));

        if let Some(materials) = &model.materials {
            self.deploy_materials(plan, model_id, &model_dir, &output_dir, materials)?;
        }

        Ok(())
    }

    fn deploy_materials(
        &self,
        plan: &mut DeploymentPlan,
        model_id: FileId,
        model_dir: &Path,
        output_dir: &Path,
        materials: &str,
    ) -> Result<()> {
        let input = absolute_path(model_dir.join(native_path(materials)));
        let input_dir = input.parent().unwrap_or_else(|| Path::new("/"));
        let model_name = file_name(&plan.input_path);

        let mut failed = false;
        if !is_same_or_subdirectory_of(input_dir, model_dir) {
            plan.produced[model_id.0].messages.push(Message::warning(format!(
                "The material file '{}' is not located in the same directory or a subdirectory of {}. It will not be deployed.",
                input.display(),
                plan.input_path.display()
            )));
            failed = true;
        }
        if !self.fs.is_file(&input) {
            plan.produced[model_id.0].messages.push(Message::warning(format!(
                "The material file '{}' (referenced in '{}') does not exist at that path.",
                input.display(),
                model_name
            )));
            failed = true;
        }
        if failed {
            return Ok(());
        }

        let output = absolute_path(output_dir.join(native_path(materials)));
        self.ensure_parent(&output)?;
        let file = DeployedFile::new(&input, &output, &plan.filter_path, FileKind::ObjMaterials)
            .with_parent(model_id);
        let id = push(plan, file);
        self.deploy_file(&mut plan.produced[id.0])?;

        let text = format!(
            "Added materials file '{}', of .obj model '{}'",
            output.display(),
            plan.output_path.display()
        );
        plan.produced[id.0].messages.push(Message::success(text));
        Ok(())
    }

    fn deploy_gl_shader(&self, plan: &mut DeploymentPlan, includes: &[String]) -> Result<()> {
        self.push_dependencies(plan, includes);

        let mut file = DeployedFile::new(
            &plan.input_path,
            &plan.output_path,
            &plan.filter_path,
            FileKind::ShaderForRasterizerApi,
        );
        file.mechanism = DeploymentMechanism::TransformedCopy;
        let id = push(plan, file);

        let source = self.fs.read_to_string(&plan.input_path)?;
        // An earlier symlink here would route the write into the source.
        if self.fs.is_file(&plan.output_path) {
            self.fs.remove_file(&plan.output_path)?;
        }
        self.fs.write(&plan.output_path, transform_vk_to_gl(&source)?.as_bytes())?;
        self.stamp_hash(&mut plan.produced[id.0]);

        let text = format!(
            "Copied (Vk->Gl morphed) GLSL file to '{}'",
            plan.output_path.display()
        );
        plan.produced[id.0].messages.push(Message::success(text));
        Ok(())
    }

    fn deploy_vk_shader(&self, plan: &mut DeploymentPlan, includes: &[String]) -> Result<()> {
        self.push_dependencies(plan, includes);
        self.ensure_parent(&plan.output_path)?;

        let mut file = DeployedFile::new(
            &plan.input_path,
            &plan.output_path,
            &plan.filter_path,
            FileKind::ShaderForExplicitApi,
        );
        file.mechanism = DeploymentMechanism::TransformedCopy;
        let id = push(plan, file);

        let transcript = self.compiler.compile(&plan.input_path, &plan.output_path)?;
        let messages = interpret(&transcript, &plan.input_path)?;
        let file = &mut plan.produced[id.0];
        file.messages.extend(messages);
        self.stamp_hash(file);
        Ok(())
    }

    /// One dependency marker per include, resolved against the shader's
    /// directory.
    fn push_dependencies(&self, plan: &mut DeploymentPlan, includes: &[String]) {
        let dir = plan.input_dir().to_path_buf();
        for include in includes {
            let input = absolute_path(dir.join(native_path(include)));
            let marker = DeployedFile::dependency(input, &plan.filter_path);
            push(plan, marker);
        }
    }

    /// Copy or symlink one file and record the mechanism used.
    ///
    /// Symlinks are tried unless copying is forced or this is a publish
    /// build. A symlink counts as created only if the output is a link
    /// afterwards; otherwise (a leftover directory, say) the file is copied.
    fn deploy_file(&self, file: &mut DeployedFile) -> Result<()> {
        let Some(output) = file.output_path.clone() else {
            return Ok(());
        };

        let force_copy = self.settings.deploy.always_copy_never_symlink
            || self.config.configuration == BuildConfiguration::Publish;

        if force_copy {
            self.copy_over(&file.input_path, &output)?;
            file.mechanism = DeploymentMechanism::Copy;
        } else {
            if self.fs.is_file(&output) || self.fs.is_symlink(&output) {
                self.fs.remove_file(&output)?;
            }
            if let Err(err) = self.fs.symlink_file(&file.input_path, &output) {
                debug!(output = ?output, error = %err, "symlink failed, falling back to copy");
            }
            if self.fs.is_symlink(&output) {
                file.mechanism = DeploymentMechanism::Symlink;
            } else {
                self.copy_over(&file.input_path, &output)?;
                file.mechanism = DeploymentMechanism::Copy;
            }
        }

        self.stamp_hash(file);
        Ok(())
    }

    /// Replace whatever is at `to` (the target can be a directory after a
    /// model was relocated) with a byte copy of `from`.
    fn copy_over(&self, from: &Path, to: &Path) -> Result<()> {
        if self.fs.is_dir(to) {
            self.fs.remove_dir_all(to)?;
        }
        if self.fs.exists(to) || self.fs.is_symlink(to) {
            self.fs.remove_file(to)?;
        }
        self.fs.copy(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) => self.fs.create_dir_all(parent),
            None => Ok(()),
        }
    }

    fn stamp_hash(&self, file: &mut DeployedFile) {
        if !self.settings.deploy.use_hash {
            return;
        }
        match compute_file_hash(self.fs, &file.input_path) {
            Ok(hash) => file.content_hash = Some(hash),
            Err(err) => warn!(file = ?file.input_path, error = %err, "could not hash deployed input"),
        }
    }
}

fn push(plan: &mut DeploymentPlan, file: DeployedFile) -> FileId {
    plan.produced.push(file);
    FileId(plan.produced.len() - 1)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
