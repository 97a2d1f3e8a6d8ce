// src/exec/compiler.rs

//! External shader compiler.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::ToolsSection;
use crate::errors::DeployError;
use crate::exec::transcript::CompilerTranscript;

/// Compiles one GLSL file to SPIR-V.
///
/// Implementations block until the compiler exited and its output streams
/// are fully drained.
pub trait ShaderCompiler: Send + Sync + Debug {
    fn compile(&self, input: &Path, output: &Path) -> Result<CompilerTranscript>;
}

/// `glslangValidator` from the Vulkan SDK.
#[derive(Debug, Clone)]
pub struct GlslangCompiler {
    program: Option<PathBuf>,
    target_env: String,
    handle: Handle,
}

impl GlslangCompiler {
    /// Resolve the compiler from `[tools]`, falling back to `$VULKAN_SDK`.
    ///
    /// A missing SDK is not an error here; it only fails once a shader
    /// actually needs compiling.
    pub fn from_settings(tools: &ToolsSection, handle: Handle) -> Self {
        let program = tools.shader_compiler.clone().or_else(|| {
            std::env::var_os("VULKAN_SDK").map(|sdk| locate_in_sdk(Path::new(&sdk)))
        });
        debug!(program = ?program, "shader compiler resolved");
        Self {
            program,
            target_env: tools.target_env.clone(),
            handle,
        }
    }

    async fn run(&self, program: &Path, input: &Path, output: &Path) -> Result<CompilerTranscript> {
        info!(?input, ?output, "compiling shader");

        let mut child = Command::new(program)
            .arg("--target-env")
            .arg(&self.target_env)
            .arg("-o")
            .arg(output)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning shader compiler {:?}", program))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out_lines, err_lines) = tokio::join!(read_lines(stdout), read_lines(stderr));

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for shader compiler {:?}", program))?;

        let mut lines = out_lines?;
        lines.extend(err_lines?);
        debug!(?input, exit_code = ?status.code(), lines = lines.len(), "shader compiler exited");

        Ok(CompilerTranscript {
            lines,
            exit_code: status.code(),
        })
    }
}

impl ShaderCompiler for GlslangCompiler {
    fn compile(&self, input: &Path, output: &Path) -> Result<CompilerTranscript> {
        let Some(program) = &self.program else {
            return Err(DeployError::ToolError(
                "no shader compiler configured and VULKAN_SDK is not set".to_string(),
            )
            .into());
        };
        // Called from a blocking worker thread, never from inside the runtime.
        self.handle.block_on(self.run(program, input, output))
    }
}

fn locate_in_sdk(sdk: &Path) -> PathBuf {
    let exe = if cfg!(windows) {
        "glslangValidator.exe"
    } else {
        "glslangValidator"
    };
    let upper = sdk.join("Bin").join(exe);
    if upper.is_file() {
        upper
    } else {
        sdk.join("bin").join(exe)
    }
}

async fn read_lines<R>(stream: Option<R>) -> Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut out = Vec::new();
    if let Some(stream) = stream {
        let mut lines = BufReader::new(stream).lines();
        while let Some(line) = lines.next_line().await? {
            out.push(line);
        }
    }
    Ok(out)
}
