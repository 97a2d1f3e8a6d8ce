// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::Result;

/// Load a settings file from a given path and return the raw `RawSettingsFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let settings: RawSettingsFile = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load a settings file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    let settings = Settings::try_from(raw)?;
    Ok(settings)
}

/// Resolve the settings for this run.
///
/// - An explicit path must exist and be valid.
/// - Without one, [`default_settings_path`] is used if it exists.
/// - Otherwise the built-in defaults apply.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let fallback = default_settings_path();
    if fallback.is_file() {
        debug!(path = ?fallback, "loading default settings file");
        load_and_validate(&fallback)
    } else {
        debug!("no settings file, using built-in defaults");
        Ok(Settings::default())
    }
}

/// `PostDeploy.toml` in the current working directory.
pub fn default_settings_path() -> PathBuf {
    PathBuf::from("PostDeploy.toml")
}
