#![allow(dead_code)]

use std::path::{Path, PathBuf};

use postdeploy::config::{InvocationConfig, InvocationTokens, RawSettingsFile, Settings};

/// Builder for `InvocationConfig` rooted in one (usually temporary) directory.
///
/// Layout:
/// - `<root>/framework`
/// - `<root>/externals` (one external root)
/// - `<root>/project/Game.vcxproj` and `Game.vcxproj.filters`
/// - `<root>/out` with `<root>/out/Game.exe`
pub struct InvocationConfigBuilder {
    tokens: InvocationTokens,
}

impl InvocationConfigBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let s = |p: PathBuf| p.to_string_lossy().into_owned();
        Self {
            tokens: InvocationTokens {
                framework: s(root.join("framework")),
                externals: vec![s(root.join("externals"))],
                configuration: "Debug_Vulkan".to_string(),
                platform: "x64".to_string(),
                project: s(root.join("project").join("Game.vcxproj")),
                filters: s(root.join("project").join("Game.vcxproj.filters")),
                output: s(root.join("out")),
                executable: s(root.join("out").join("Game.exe")),
            },
        }
    }

    pub fn configuration(mut self, token: &str) -> Self {
        self.tokens.configuration = token.to_string();
        self
    }

    pub fn platform(mut self, token: &str) -> Self {
        self.tokens.platform = token.to_string();
        self
    }

    pub fn externals(mut self, roots: &[&Path]) -> Self {
        self.tokens.externals = roots
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        self
    }

    pub fn executable(mut self, path: impl AsRef<Path>) -> Self {
        self.tokens.executable = path.as_ref().to_string_lossy().into_owned();
        self
    }

    pub fn tokens(self) -> InvocationTokens {
        self.tokens
    }

    pub fn build(self) -> InvocationConfig {
        InvocationConfig::from_tokens(self.tokens).expect("valid invocation tokens")
    }
}

/// Builder for validated `Settings`.
#[derive(Default)]
pub struct SettingsBuilder {
    raw: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always_copy(mut self, val: bool) -> Self {
        self.raw.deploy.always_copy_never_symlink = val;
        self
    }

    pub fn hide_access_denied_for_dlls(mut self, val: bool) -> Self {
        self.raw.deploy.hide_access_denied_errors_for_dlls = val;
        self
    }

    pub fn overwrite_existing_externals(mut self, val: bool) -> Self {
        self.raw.deploy.overwrite_existing_externals = val;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.raw.deploy.use_hash = val;
        self
    }

    pub fn always_deploy_release(mut self, val: bool) -> Self {
        self.raw.externals.always_deploy_release = val;
        self
    }

    pub fn monitor_files(mut self, val: bool) -> Self {
        self.raw.watch.monitor_files = val;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.raw.watch.debounce_ms = ms;
        self
    }

    pub fn notify_model(mut self, val: bool) -> Self {
        self.raw.notify.model = val;
        self
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}
