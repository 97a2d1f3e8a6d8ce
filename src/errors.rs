// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invocation error: {0}")]
    InvocationError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("External tool error: {0}")]
    ToolError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DeployError>;

/// True if anywhere in the error chain there is an IO error of kind
/// `PermissionDenied`.
pub fn is_permission_denied(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied)
            || cause
                .downcast_ref::<DeployError>()
                .is_some_and(|de| match de {
                    DeployError::IoError(io) => {
                        io.kind() == std::io::ErrorKind::PermissionDenied
                    }
                    _ => false,
                })
    })
}
