// src/model/deployed.rs

use std::fmt;
use std::path::PathBuf;

use crate::model::message::{Message, MessageKind, MessageList};

/// Index of a [`DeployedFile`] inside the arena that owns it.
///
/// While a plan executes, ids are local to the plan. Once the batch accepts
/// the plan they are rebased onto the batch arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Generic,
    Model3d,
    ObjMaterials,
    Scene,
    ShaderForRasterizerApi,
    ShaderForExplicitApi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMechanism {
    Copy,
    TransformedCopy,
    Symlink,
    /// Marker only; nothing was written.
    DependencyOnly,
}

impl fmt::Display for DeploymentMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentMechanism::Copy => "copy",
            DeploymentMechanism::TransformedCopy => "transformed-copy",
            DeploymentMechanism::Symlink => "symlink",
            DeploymentMechanism::DependencyOnly => "dependency",
        };
        f.write_str(s)
    }
}

/// One deployed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedFile {
    pub input_path: PathBuf,
    /// blake3 hex digest of the input at deployment time (if hashing is on).
    pub content_hash: Option<String>,
    /// `None` for dependency markers.
    pub output_path: Option<PathBuf>,
    pub filter_path: String,
    pub kind: FileKind,
    pub mechanism: DeploymentMechanism,
    pub messages: Vec<Message>,
    pub parent: Option<FileId>,
}

impl DeployedFile {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        filter_path: impl Into<String>,
        kind: FileKind,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            content_hash: None,
            output_path: Some(output_path.into()),
            filter_path: filter_path.into(),
            kind,
            // Overwritten once the file is actually written.
            mechanism: DeploymentMechanism::Copy,
            messages: Vec::new(),
            parent: None,
        }
    }

    /// A marker recording that the plan's files depend on `input_path`.
    pub fn dependency(input_path: impl Into<PathBuf>, filter_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            content_hash: None,
            output_path: None,
            filter_path: filter_path.into(),
            kind: FileKind::Generic,
            mechanism: DeploymentMechanism::DependencyOnly,
            messages: Vec::new(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: FileId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_dependency(&self) -> bool {
        self.mechanism == DeploymentMechanism::DependencyOnly
    }

    pub fn has_errors(&self) -> bool {
        self.messages.has_kind(MessageKind::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.has_kind(MessageKind::Warning)
    }
}
