// src/config/mod.rs

//! Configuration for postdeploy.
//!
//! Responsibilities:
//! - Per-event invocation parameters (`invocation.rs`).
//! - The TOML-backed operator settings model (`model.rs`).
//! - Load settings from disk (`loader.rs`).
//! - Validate settings invariants (`validate.rs`).

pub mod invocation;
pub mod loader;
pub mod model;
pub mod validate;

pub use invocation::{InvocationConfig, InvocationTokens};
pub use loader::{load_and_validate, load_from_path, load_settings};
pub use model::{
    DeploySection, ExternalsSection, NotifySection, RawSettingsFile, Settings, ToolsSection,
    WatchSection,
};
pub use validate::validate_settings;
