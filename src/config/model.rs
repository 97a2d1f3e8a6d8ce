// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Operator settings as read from a TOML file.
///
/// ```toml
/// [deploy]
/// always_copy_never_symlink = false
/// hide_access_denied_errors_for_dlls = true
///
/// [externals]
/// always_deploy_release = false
/// debug_sub_path = "debug"
/// release_sub_path = "release"
///
/// [watch]
/// monitor_files = true
/// debounce_ms = 200
///
/// [notify]
/// vk_shader = true
/// model = false
///
/// [tools]
/// target_env = "vulkan1.3"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub deploy: DeploySection,

    #[serde(default)]
    pub externals: ExternalsSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub notify: NotifySection,

    #[serde(default)]
    pub tools: ToolsSection,
}

/// Validated settings. Only constructible via `TryFrom<RawSettingsFile>`
/// (or [`Settings::default`]).
#[derive(Debug, Clone)]
pub struct Settings {
    pub deploy: DeploySection,
    pub externals: ExternalsSection,
    pub watch: WatchSection,
    pub notify: NotifySection,
    pub tools: ToolsSection,
}

impl Settings {
    pub(crate) fn new_unchecked(raw: RawSettingsFile) -> Self {
        Self {
            deploy: raw.deploy,
            externals: raw.externals,
            watch: raw.watch,
            notify: raw.notify,
            tools: raw.tools,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new_unchecked(RawSettingsFile::default())
    }
}

/// `[deploy]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeploySection {
    /// Never try a symlink, always byte-copy.
    #[serde(default)]
    pub always_copy_never_symlink: bool,

    /// Report permission-denied failures on DLL-like files as information
    /// instead of errors (a previous instance of the app still holds them).
    #[serde(default)]
    pub hide_access_denied_errors_for_dlls: bool,

    /// Redeploy external dependency files even if they already exist in the
    /// output directory.
    #[serde(default)]
    pub overwrite_existing_externals: bool,

    /// Hash deployed inputs; update cycles skip files whose content did not
    /// change since they were last deployed.
    #[serde(default)]
    pub use_hash: bool,
}

/// `[externals]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalsSection {
    /// Use the release binaries of external dependencies for every build
    /// configuration.
    #[serde(default)]
    pub always_deploy_release: bool,

    #[serde(default = "default_debug_sub_path")]
    pub debug_sub_path: String,

    #[serde(default = "default_release_sub_path")]
    pub release_sub_path: String,
}

fn default_debug_sub_path() -> String {
    "debug".to_string()
}

fn default_release_sub_path() -> String {
    "release".to_string()
}

impl Default for ExternalsSection {
    fn default() -> Self {
        Self {
            always_deploy_release: false,
            debug_sub_path: default_debug_sub_path(),
            release_sub_path: default_release_sub_path(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Watch deployed inputs after a build and redeploy on change.
    #[serde(default = "default_true")]
    pub monitor_files: bool,

    /// Quiet period before a burst of change notifications is flushed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Paths containing this substring are editor temp files and ignored.
    #[serde(default = "default_temp_file_marker")]
    pub temp_file_marker: String,
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_temp_file_marker() -> String {
    "~".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            monitor_files: true,
            debounce_ms: default_debounce_ms(),
            temp_file_marker: default_temp_file_marker(),
        }
    }
}

/// `[notify]` section.
///
/// Per file kind: whether files of that kind with errors or warnings are
/// put on the batch's emergency list.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    #[serde(default = "default_true")]
    pub vk_shader: bool,

    #[serde(default = "default_true")]
    pub gl_shader: bool,

    #[serde(default)]
    pub model: bool,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            vk_shader: true,
            gl_shader: true,
            model: false,
        }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    /// Explicit shader compiler path. If unset, it is looked up below
    /// `$VULKAN_SDK`.
    #[serde(default)]
    pub shader_compiler: Option<PathBuf>,

    #[serde(default = "default_target_env")]
    pub target_env: String,
}

fn default_target_env() -> String {
    "vulkan1.3".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            shader_compiler: None,
            target_env: default_target_env(),
        }
    }
}
