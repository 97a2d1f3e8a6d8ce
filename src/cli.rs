// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The flags mirror what a post-build step passes for one build event. The
//! raw strings are turned into an [`InvocationConfig`] by
//! [`CliArgs::invocation_config`], which fails fast on malformed tokens.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::invocation::{InvocationConfig, InvocationTokens};
use crate::errors::Result;

/// Command-line arguments for `postdeploy`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "postdeploy",
    version,
    about = "Deploy assets and shaders of a build into its output directory, then keep them in sync.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the framework root.
    #[arg(long, value_name = "PATH")]
    pub framework: String,

    /// External dependency root; may be given multiple times.
    #[arg(long = "external", value_name = "PATH", required = true)]
    pub externals: Vec<String>,

    /// Build configuration token, e.g. `Debug_Vulkan` or `Publish_GL`.
    #[arg(long, value_name = "TOKEN")]
    pub configuration: String,

    /// Target platform (must be `x64`).
    #[arg(long, value_name = "TOKEN")]
    pub platform: String,

    /// Path to the project file.
    #[arg(long, value_name = "PATH")]
    pub vcxproj: String,

    /// Path to the filter manifest (`.vcxproj.filters`).
    #[arg(long, value_name = "PATH")]
    pub filters: String,

    /// Output directory that files are deployed into.
    #[arg(long, value_name = "PATH")]
    pub output: String,

    /// Path to the built executable; identifies the build instance.
    #[arg(long, value_name = "PATH")]
    pub executable: String,

    /// Operator settings (TOML). Defaults to `PostDeploy.toml` if present.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Deploy once and exit; do not watch deployed sources.
    #[arg(long)]
    pub once: bool,

    /// Parse the manifest and print the files that would be deployed.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POSTDEPLOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Validate the invocation tokens and build the per-event configuration.
    pub fn invocation_config(&self) -> Result<InvocationConfig> {
        InvocationConfig::from_tokens(InvocationTokens {
            framework: self.framework.clone(),
            externals: self.externals.clone(),
            configuration: self.configuration.clone(),
            platform: self.platform.clone(),
            project: self.vcxproj.clone(),
            filters: self.filters.clone(),
            output: self.output.clone(),
            executable: self.executable.clone(),
        })
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
