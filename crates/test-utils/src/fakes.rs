use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use postdeploy::classify::{ImportedModel, ModelImporter};
use postdeploy::exec::{CompilerTranscript, ShaderCompiler};
use postdeploy::fs::FileSystem;

/// A model importer that knows a fixed set of models.
///
/// Any path registered through [`FakeImporter::model`] is a model with the
/// given texture references; everything else is not a model.
#[derive(Debug, Default, Clone)]
pub struct FakeImporter {
    models: HashMap<PathBuf, Vec<String>>,
}

impl FakeImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, path: impl Into<PathBuf>, textures: &[&str]) -> Self {
        self.models.insert(
            path.into(),
            textures.iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

impl ModelImporter for FakeImporter {
    fn import(&self, _fs: &dyn FileSystem, path: &Path) -> Result<Option<ImportedModel>> {
        Ok(self.models.get(path).map(|textures| ImportedModel {
            textures: textures.clone(),
        }))
    }
}

/// A shader compiler that:
/// - records every (input, output) pair it was asked to compile
/// - answers with scripted transcript lines per input file name
/// - writes a placeholder output so the output exists afterwards.
#[derive(Debug, Default, Clone)]
pub struct FakeCompiler {
    scripts: HashMap<String, Vec<String>>,
    fs: Option<Arc<dyn FileSystem>>,
    pub compiled: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write outputs into `fs`.
    pub fn writing_to(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Transcript lines printed when compiling a file named `file_name`.
    pub fn script(mut self, file_name: &str, lines: &[&str]) -> Self {
        self.scripts.insert(
            file_name.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn compiled(&self) -> Vec<(PathBuf, PathBuf)> {
        self.compiled.lock().unwrap().clone()
    }
}

impl ShaderCompiler for FakeCompiler {
    fn compile(&self, input: &Path, output: &Path) -> Result<CompilerTranscript> {
        self.compiled
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));

        if let Some(fs) = &self.fs {
            fs.write(output, b"SPIR-V")?;
        }

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lines = self.scripts.get(&name).cloned().unwrap_or_default();
        Ok(CompilerTranscript::from_lines(lines))
    }
}
