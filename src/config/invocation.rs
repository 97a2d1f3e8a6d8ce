// src/config/invocation.rs

//! Per-build-event parameters.
//!
//! An [`InvocationConfig`] is created once per invocation and never mutated.
//! The executable path identifies the build instance it belongs to.

use std::path::{Path, PathBuf};

use crate::errors::{DeployError, Result};
use crate::normalize::{absolute_path, native_path, normalize, NormalizedPath};
use crate::types::{BuildConfiguration, BuildPlatform, TargetApi};

/// Raw tokens as handed over by the launcher, before any validation.
#[derive(Debug, Clone, Default)]
pub struct InvocationTokens {
    pub framework: String,
    pub externals: Vec<String>,
    pub configuration: String,
    pub platform: String,
    pub project: String,
    pub filters: String,
    pub output: String,
    pub executable: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub framework_path: PathBuf,
    pub external_paths: Vec<PathBuf>,
    pub target_api: TargetApi,
    pub configuration: BuildConfiguration,
    pub platform: BuildPlatform,
    pub project_path: PathBuf,
    pub filters_path: PathBuf,
    pub output_path: PathBuf,
    pub executable_path: PathBuf,
}

impl InvocationConfig {
    /// Validate raw tokens. Fails on the first malformed or missing one.
    pub fn from_tokens(tokens: InvocationTokens) -> Result<Self> {
        let framework_path = required_path("framework path", &tokens.framework)?;

        let external_paths = tokens
            .externals
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| absolute_path(native_path(e.trim())))
            .collect::<Vec<_>>();
        if external_paths.is_empty() {
            return Err(DeployError::InvocationError(
                "at least one external dependency path is required".to_string(),
            ));
        }

        let target_api = TargetApi::from_token(&tokens.configuration).ok_or_else(|| {
            DeployError::InvocationError(format!(
                "configuration \"{}\" names no target API (expected it to contain 'gl' or 'vulkan')",
                tokens.configuration
            ))
        })?;

        let configuration =
            BuildConfiguration::from_token(&tokens.configuration).ok_or_else(|| {
                DeployError::InvocationError(format!(
                    "configuration \"{}\" does not contain 'debug', 'release' or 'publish'",
                    tokens.configuration
                ))
            })?;

        let platform = tokens
            .platform
            .parse::<BuildPlatform>()
            .map_err(DeployError::InvocationError)?;

        Ok(Self {
            framework_path,
            external_paths,
            target_api,
            configuration,
            platform,
            project_path: required_path("project file path", &tokens.project)?,
            filters_path: required_path("filter manifest path", &tokens.filters)?,
            output_path: required_path("output directory", &tokens.output)?,
            executable_path: required_path("executable path", &tokens.executable)?,
        })
    }

    /// Identity of the build instance this configuration belongs to.
    pub fn identity(&self) -> NormalizedPath {
        normalize(&self.executable_path)
    }

    /// Directory holding the filter manifest; manifest `Include`s are
    /// relative to it.
    pub fn project_dir(&self) -> &Path {
        self.filters_path.parent().unwrap_or_else(|| Path::new("/"))
    }
}

fn required_path(what: &str, raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DeployError::InvocationError(format!("{what} is missing")));
    }
    Ok(absolute_path(native_path(raw)))
}
