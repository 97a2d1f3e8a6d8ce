// src/config/validate.rs

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::{DeployError, Result};

impl TryFrom<RawSettingsFile> for Settings {
    type Error = crate::errors::DeployError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_settings(&raw)?;
        Ok(Settings::new_unchecked(raw))
    }
}

pub fn validate_settings(raw: &RawSettingsFile) -> Result<()> {
    validate_watch(raw)?;
    validate_externals(raw)?;
    validate_tools(raw)?;
    Ok(())
}

fn validate_watch(raw: &RawSettingsFile) -> Result<()> {
    if raw.watch.debounce_ms == 0 {
        return Err(DeployError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if raw.watch.temp_file_marker.is_empty() {
        return Err(DeployError::ConfigError(
            "[watch].temp_file_marker must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_externals(raw: &RawSettingsFile) -> Result<()> {
    for (key, value) in [
        ("debug_sub_path", &raw.externals.debug_sub_path),
        ("release_sub_path", &raw.externals.release_sub_path),
    ] {
        if value.trim().is_empty() {
            return Err(DeployError::ConfigError(format!(
                "[externals].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_tools(raw: &RawSettingsFile) -> Result<()> {
    if raw.tools.target_env.trim().is_empty() {
        return Err(DeployError::ConfigError(
            "[tools].target_env must not be empty".to_string(),
        ));
    }
    if let Some(path) = &raw.tools.shader_compiler {
        if path.as_os_str().is_empty() {
            return Err(DeployError::ConfigError(
                "[tools].shader_compiler must not be an empty path".to_string(),
            ));
        }
    }
    Ok(())
}
