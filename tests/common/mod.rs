#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use postdeploy_test_utils::builders;
pub use postdeploy_test_utils::fakes;
pub use postdeploy_test_utils::{init_tracing, with_timeout};

use postdeploy::classify::ModelImporter;
use postdeploy::config::Settings;
use postdeploy::engine::Orchestrator;
use postdeploy::exec::ShaderCompiler;
use postdeploy::fs::FileSystem;
use postdeploy::status::StatusBoard;

/// A `<None Include=...><Filter>...</Filter></None>` manifest for the given
/// (include, filter) pairs.
pub fn manifest(entries: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Project ToolsVersion=\"4.0\">\n  <ItemGroup>\n",
    );
    for (include, filter) in entries {
        xml.push_str(&format!(
            "    <None Include=\"{include}\">\n      <Filter>{filter}</Filter>\n    </None>\n"
        ));
    }
    xml.push_str("  </ItemGroup>\n</Project>\n");
    xml
}

/// Write a file, creating its parent directories.
pub fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
    path.to_path_buf()
}

pub fn orchestrator(
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    importer: Arc<dyn ModelImporter>,
    compiler: Arc<dyn ShaderCompiler>,
) -> Orchestrator {
    Orchestrator::new(Arc::new(settings), fs, importer, compiler, StatusBoard::new())
}
