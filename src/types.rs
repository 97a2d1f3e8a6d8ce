// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Rendering API the build targets.
///
/// Decides how files under the `shaders` filter are deployed:
/// - `OpenGl`: GLSL is rewritten lexically into the GL dialect.
/// - `Vulkan`: GLSL is compiled to SPIR-V by the external compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetApi {
    OpenGl,
    Vulkan,
}

impl TargetApi {
    /// Extract the target API out of a configuration token such as
    /// `"Debug_Vulkan"` or `"publish_gl"`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        if token.contains("gl") {
            Some(TargetApi::OpenGl)
        } else if token.contains("vulkan") {
            Some(TargetApi::Vulkan)
        } else {
            None
        }
    }
}

/// Build configuration of the invoking project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildConfiguration {
    Debug,
    Release,
    /// Publish builds never use symlinks; every file is copied.
    Publish,
}

impl BuildConfiguration {
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        if token.contains("debug") {
            Some(BuildConfiguration::Debug)
        } else if token.contains("release") {
            Some(BuildConfiguration::Release)
        } else if token.contains("publish") {
            Some(BuildConfiguration::Publish)
        } else {
            None
        }
    }
}

/// Target platform. Only x64 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPlatform {
    X64,
}

impl BuildPlatform {
    /// Directory name used for this platform inside external dependency trees.
    pub fn as_path_part(&self) -> &'static str {
        match self {
            BuildPlatform::X64 => "x64",
        }
    }
}

impl FromStr for BuildPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x64" => Ok(BuildPlatform::X64),
            other => Err(format!(
                "target platform does not seem to be 'x64' (got \"{other}\")"
            )),
        }
    }
}

/// What kind of event produced a batch.
///
/// `Build` batches replace everything known about an instance; `Update`
/// batches only append to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Build,
    Update,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Build => f.write_str("build"),
            EventKind::Update => f.write_str("update"),
        }
    }
}
