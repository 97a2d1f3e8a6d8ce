// tests/orchestrator_build.rs

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::builders::{InvocationConfigBuilder, SettingsBuilder};
use common::fakes::{FakeCompiler, FakeImporter};
use common::{manifest, orchestrator};
use postdeploy::config::{InvocationConfig, Settings};
use postdeploy::engine::{BatchPhase, BatchReport, InstanceRegistry, Orchestrator, PendingFile};
use postdeploy::fs::mock::MockFileSystem;
use postdeploy::model::{Batch, DeploymentMechanism, FileId, FileKind, MessageKind, MessageList};
use postdeploy::normalize::normalize;
use postdeploy::watch::compute_file_hash;

const FILTERS: &str = "/p/project/Game.vcxproj.filters";
const EXTERNALS: &str = "/p/externals/debug/bin/x64";

/// Mock tree with an (empty) external dependency directory in place.
fn tree(entries: &[(&str, &str)]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir(EXTERNALS);
    fs.add_file(FILTERS, manifest(entries));
    fs
}

fn config() -> InvocationConfig {
    InvocationConfigBuilder::new("/p").build()
}

fn build_with(
    settings: Settings,
    fs: &MockFileSystem,
    importer: FakeImporter,
    compiler: FakeCompiler,
    config: &InvocationConfig,
) -> Batch {
    let orchestrator: Orchestrator = orchestrator(
        settings,
        Arc::new(fs.clone()),
        Arc::new(importer),
        Arc::new(compiler),
    );
    orchestrator.run_build(config)
}

fn build(fs: &MockFileSystem) -> Batch {
    build_with(
        SettingsBuilder::new().build(),
        fs,
        FakeImporter::new(),
        FakeCompiler::new(),
        &config(),
    )
}

fn inputs(batch: &Batch) -> Vec<PathBuf> {
    batch.files.iter().map(|f| f.input_path.clone()).collect()
}

#[test]
fn filter_named_like_its_file_aborts_the_batch() {
    let fs = tree(&[("x.txt", "assets"), ("y.txt", "assets\\x.txt")]);
    fs.add_file("/p/project/x.txt", "x");
    fs.add_file("/p/project/y.txt", "y");

    let batch = build(&fs);

    assert_eq!(batch.messages.len(), 1);
    assert_eq!(batch.messages[0].kind, MessageKind::Error);
    assert!(batch.files.is_empty());
    assert_eq!(
        batch.phases,
        vec![BatchPhase::ParsingManifest, BatchPhase::Reporting]
    );
}

#[test]
fn unreadable_manifest_is_fatal() {
    let fs = MockFileSystem::new();
    fs.add_dir(EXTERNALS);

    let batch = build(&fs);

    assert_eq!(batch.messages.count_kind(MessageKind::Error), 1);
    assert!(batch.messages[0].text.contains("Could not read filter manifest"));
    assert_eq!(BatchReport::from_batch(&batch).kind, MessageKind::Error);
}

#[test]
fn files_outside_assets_and_shaders_are_skipped() {
    let fs = tree(&[("src/main.cpp", "src"), ("assets/a.txt", "assets")]);
    fs.add_file("/p/project/src/main.cpp", "int main() {}");
    fs.add_file("/p/project/assets/a.txt", "a");

    let batch = build(&fs);

    assert_eq!(inputs(&batch), vec![PathBuf::from("/p/project/assets/a.txt")]);
    let report = BatchReport::from_batch(&batch);
    assert_eq!(report.kind, MessageKind::Success);
    assert_eq!(report.text, "Deployed 1 files.");
}

#[test]
fn missing_declared_file_is_an_error_on_that_file() {
    let fs = tree(&[("assets/gone.txt", "assets")]);

    let batch = build(&fs);

    assert!(batch.files.is_empty());
    assert_eq!(batch.messages.count_kind(MessageKind::Error), 1);
    let location = batch.messages[0].location.as_ref().unwrap();
    assert_eq!(location.file, PathBuf::from("/p/project/assets/gone.txt"));
}

#[test]
fn shared_texture_is_deployed_once_under_the_first_model() {
    let fs = tree(&[("assets/a.fbx", "assets"), ("assets/b.fbx", "assets")]);
    fs.add_file("/p/project/assets/a.fbx", "fbx");
    fs.add_file("/p/project/assets/b.fbx", "fbx");
    fs.add_file("/p/project/assets/shared.png", "png");
    let importer = FakeImporter::new()
        .model("/p/project/assets/a.fbx", &["shared.png"])
        .model("/p/project/assets/b.fbx", &["shared.png"]);

    let batch = build_with(
        SettingsBuilder::new().build(),
        &fs,
        importer,
        FakeCompiler::new(),
        &config(),
    );

    let shared: Vec<_> = batch
        .files
        .iter()
        .enumerate()
        .filter(|(_, f)| f.input_path.ends_with("shared.png"))
        .collect();
    assert_eq!(shared.len(), 1);
    let (id, texture) = shared[0];
    assert_eq!(texture.parent, Some(FileId(0)));
    assert_eq!(batch.root_of(FileId(id)), FileId(0));
    assert_eq!(batch.files[0].input_path, PathBuf::from("/p/project/assets/a.fbx"));
    assert_eq!(batch.deployed_count(), 3);
}

#[test]
fn colliding_models_are_relocated() {
    let fs = tree(&[("a/box.fbx", "assets"), ("b/box.fbx", "assets")]);
    fs.add_file("/p/project/a/box.fbx", "one");
    fs.add_file("/p/project/b/box.fbx", "two");
    let importer = FakeImporter::new()
        .model("/p/project/a/box.fbx", &[])
        .model("/p/project/b/box.fbx", &[]);

    let batch = build_with(
        SettingsBuilder::new().build(),
        &fs,
        importer,
        FakeCompiler::new(),
        &config(),
    );

    let outputs: Vec<_> = batch
        .files
        .iter()
        .filter_map(|f| f.output_path.clone())
        .collect();
    assert_eq!(
        outputs,
        vec![
            PathBuf::from("/p/out/assets/box.fbx"),
            PathBuf::from("/p/out/assets/box.fbx/box.fbx"),
        ]
    );
    assert!(!batch.has_kind(MessageKind::Warning));
}

#[test]
fn texture_escaping_its_model_directory_is_reported() {
    let fs = tree(&[("assets/m/M.fbx", "assets/m")]);
    fs.add_file("/p/project/assets/m/M.fbx", "fbx");
    fs.add_file("/p/project/assets/escape.png", "png");
    let importer = FakeImporter::new().model("/p/project/assets/m/M.fbx", &["../escape.png"]);

    let batch = build_with(
        SettingsBuilder::new().notify_model(true).build(),
        &fs,
        importer,
        FakeCompiler::new(),
        &config(),
    );

    assert_eq!(batch.deployed_count(), 1);
    assert!(batch.files[0].has_warnings());
    assert_eq!(batch.emergency, vec![FileId(0)]);

    let report = BatchReport::from_batch(&batch);
    assert_eq!(report.kind, MessageKind::Warning);
    assert_eq!(report.text, "Deployed 1 files with WARNINGS.");
    assert!(report.emergency.iter().any(|line| line.contains("escape.png")));
}

#[test]
fn vulkan_shader_errors_are_collected() {
    let fs = tree(&[("shaders/lit.frag", "shaders")]);
    fs.add_file("/p/project/shaders/lit.frag", "void main() {}");
    let compiler = FakeCompiler::new().script(
        "lit.frag",
        &[
            "ERROR: /p/project/shaders/lit.frag:3: 'a' : undeclared identifier",
            "ERROR: /p/project/shaders/lit.frag:4: 'b' : undeclared identifier",
        ],
    );

    let batch = build_with(
        SettingsBuilder::new().build(),
        &fs,
        FakeImporter::new(),
        compiler.clone(),
        &config(),
    );

    assert_eq!(
        compiler.compiled(),
        vec![(
            PathBuf::from("/p/project/shaders/lit.frag"),
            PathBuf::from("/p/out/shaders/lit.frag.spv"),
        )]
    );
    let shader = &batch.files[0];
    assert_eq!(shader.kind, FileKind::ShaderForExplicitApi);
    assert_eq!(shader.messages.count_kind(MessageKind::Error), 2);
    assert_eq!(shader.messages.count_kind(MessageKind::Information), 1);
    assert_eq!(batch.emergency, vec![FileId(0)]);
    assert_eq!(BatchReport::from_batch(&batch).kind, MessageKind::Error);
}

#[test]
fn opengl_shader_is_rewritten_not_compiled() {
    let fs = tree(&[("shaders/lit.frag", "shaders")]);
    fs.add_file(
        "/p/project/shaders/lit.frag",
        "layout(set = 1, binding = 0) uniform sampler2D t;",
    );
    let compiler = FakeCompiler::new();
    let config = InvocationConfigBuilder::new("/p")
        .configuration("Debug_GL")
        .build();

    let batch = build_with(
        SettingsBuilder::new().build(),
        &fs,
        FakeImporter::new(),
        compiler.clone(),
        &config,
    );

    assert!(compiler.compiled().is_empty());
    let shader = &batch.files[0];
    assert_eq!(shader.mechanism, DeploymentMechanism::TransformedCopy);
    assert_eq!(
        fs.contents("/p/out/shaders/lit.frag"),
        Some(b"layout(binding = 0) uniform sampler2D t;".to_vec())
    );
    assert!(batch.emergency.is_empty());
}

#[test]
fn scene_references_follow_the_scene() {
    let fs = tree(&[("assets/level.fscene", "assets"), ("assets/after.txt", "assets")]);
    fs.add_file(
        "/p/project/assets/level.fscene",
        r#"{ "models": [ { "file": "props/crate.txt" } ], "user_defined": { "sky_box": "sky.txt" } }"#,
    );
    fs.add_file("/p/project/assets/props/crate.txt", "c");
    fs.add_file("/p/project/assets/sky.txt", "s");
    fs.add_file("/p/project/assets/after.txt", "a");

    let batch = build(&fs);

    assert_eq!(
        inputs(&batch),
        vec![
            PathBuf::from("/p/project/assets/level.fscene"),
            PathBuf::from("/p/project/assets/props/crate.txt"),
            PathBuf::from("/p/project/assets/sky.txt"),
            PathBuf::from("/p/project/assets/after.txt"),
        ]
    );
    assert_eq!(batch.files[0].kind, FileKind::Scene);
    assert_eq!(
        batch.files[1].output_path.as_deref(),
        Some(Path::new("/p/out/assets/props/crate.txt"))
    );
}

#[test]
fn cyclic_scene_references_are_ignored_with_a_warning() {
    let fs = tree(&[("assets/a.fscene", "assets")]);
    fs.add_file(
        "/p/project/assets/a.fscene",
        r#"{ "models": [ { "file": "b.fscene" } ] }"#,
    );
    fs.add_file(
        "/p/project/assets/b.fscene",
        r#"{ "models": [ { "file": "a.fscene" } ] }"#,
    );

    let batch = build(&fs);

    assert_eq!(batch.deployed_count(), 2);
    assert_eq!(batch.messages.count_kind(MessageKind::Warning), 1);
    assert!(batch.messages[0].text.contains("cyclically"));
}

#[test]
fn externals_sweep_skips_existing_outputs() {
    let fs = tree(&[]);
    fs.add_file(format!("{EXTERNALS}/lib.dll"), "new dll");
    fs.add_file(format!("{EXTERNALS}/data/table.bin"), "bin");
    fs.add_file("/p/out/lib.dll", "old dll");

    let batch = build(&fs);

    assert_eq!(
        inputs(&batch),
        vec![PathBuf::from(format!("{EXTERNALS}/data/table.bin"))]
    );
    assert_eq!(fs.contents("/p/out/lib.dll"), Some(b"old dll".to_vec()));
    assert_eq!(batch.files[0].filter_path, ".");
}

#[test]
fn release_binaries_can_be_forced() {
    let fs = tree(&[]);
    fs.add_file("/p/externals/release/bin/x64/lib.dll", "release");

    let batch = build_with(
        SettingsBuilder::new().always_deploy_release(true).build(),
        &fs,
        FakeImporter::new(),
        FakeCompiler::new(),
        &config(),
    );

    assert_eq!(
        inputs(&batch),
        vec![PathBuf::from("/p/externals/release/bin/x64/lib.dll")]
    );
    assert!(batch.messages.is_empty());
}

#[test]
fn locked_dll_is_downgraded_to_information() {
    let fs = tree(&[]);
    fs.add_file(format!("{EXTERNALS}/lib.dll"), "new dll");
    fs.add_file("/p/out/lib.dll", "old dll");
    fs.deny("/p/out/lib.dll");

    let batch = build_with(
        SettingsBuilder::new()
            .overwrite_existing_externals(true)
            .hide_access_denied_for_dlls(true)
            .build(),
        &fs,
        FakeImporter::new(),
        FakeCompiler::new(),
        &config(),
    );

    assert!(!batch.has_kind(MessageKind::Error));
    let dll = &batch.files[0];
    assert_eq!(dll.messages.count_kind(MessageKind::Information), 1);
    assert!(dll.messages[0].text.contains("access was denied"));
    assert_eq!(BatchReport::from_batch(&batch).kind, MessageKind::Information);
}

#[test]
fn locked_dll_is_an_error_unless_hidden() {
    let fs = tree(&[]);
    fs.add_file(format!("{EXTERNALS}/lib.dll"), "new dll");
    fs.add_file("/p/out/lib.dll", "old dll");
    fs.deny("/p/out/lib.dll");

    let batch = build_with(
        SettingsBuilder::new().overwrite_existing_externals(true).build(),
        &fs,
        FakeImporter::new(),
        FakeCompiler::new(),
        &config(),
    );

    assert_eq!(batch.files[0].messages.count_kind(MessageKind::Error), 1);
}

#[test]
fn missing_externals_directory_is_an_error() {
    let fs = MockFileSystem::new();
    fs.add_file(FILTERS, manifest(&[]));

    let batch = build(&fs);

    assert_eq!(batch.messages.count_kind(MessageKind::Error), 1);
    assert!(batch.messages[0]
        .text
        .contains("Path to framework's externals does not exist?!"));
}

#[test]
fn build_reports_progress_on_the_status_board() {
    let fs = tree(&[("assets/a.txt", "assets")]);
    fs.add_file("/p/project/assets/a.txt", "a");
    let orchestrator = orchestrator(
        SettingsBuilder::new().build(),
        Arc::new(fs.clone()),
        Arc::new(FakeImporter::new()),
        Arc::new(FakeCompiler::new()),
    );

    orchestrator.run_build(&config());

    let status = orchestrator.status().get();
    assert!(status.contains("Game.vcxproj"));
    assert!(status.contains("a.txt"));
}

#[test]
fn unchanged_files_are_not_redeployed_when_hashing() {
    let fs = tree(&[]);
    fs.add_file("/p/project/assets/a.txt", "same");
    fs.add_file("/p/project/assets/b.txt", "changed");
    let orchestrator = orchestrator(
        SettingsBuilder::new().use_hash(true).build(),
        Arc::new(fs.clone()),
        Arc::new(FakeImporter::new()),
        Arc::new(FakeCompiler::new()),
    );
    let hash = compute_file_hash(&fs, Path::new("/p/project/assets/a.txt")).unwrap();

    let files = vec![
        PendingFile {
            input_path: PathBuf::from("/p/project/assets/a.txt"),
            filter_path: "assets".to_string(),
            content_hash: Some(hash),
        },
        PendingFile {
            input_path: PathBuf::from("/p/project/assets/b.txt"),
            filter_path: "assets".to_string(),
            content_hash: Some("stale".to_string()),
        },
    ];
    let batch = orchestrator.run_update(&config(), &files);

    assert_eq!(inputs(&batch), vec![PathBuf::from("/p/project/assets/b.txt")]);
    assert!(batch.files[0].content_hash.is_some());
}

#[test]
fn changed_include_redeploys_its_shader_when_hashing() {
    let fs = tree(&[("shaders/lit.frag", "shaders")]);
    fs.add_file(
        "/p/project/shaders/lit.frag",
        "#include \"common.glsl\"\nvoid main() {}",
    );
    fs.add_file("/p/project/shaders/common.glsl", "float k = 1.0;");
    let config = Arc::new(
        InvocationConfigBuilder::new("/p")
            .configuration("Debug_GL")
            .build(),
    );
    let orchestrator = orchestrator(
        SettingsBuilder::new().use_hash(true).build(),
        Arc::new(fs.clone()),
        Arc::new(FakeImporter::new()),
        Arc::new(FakeCompiler::new()),
    );

    let built = orchestrator.run_build(&config);
    let mut registry = InstanceRegistry::new();
    registry.register(Arc::clone(&config));
    registry.apply_batch(&built);

    fs.add_file("/p/project/shaders/common.glsl", "float k = 2.0;");
    let hits = registry.lookup(&normalize("/p/project/shaders/common.glsl"));
    assert_eq!(hits.len(), 1);

    let update = orchestrator.run_update(&config, &hits[0].1);

    let shader = update
        .files
        .iter()
        .find(|f| !f.is_dependency())
        .expect("shader redeployed");
    assert_eq!(shader.input_path, PathBuf::from("/p/project/shaders/lit.frag"));
    assert_eq!(shader.mechanism, DeploymentMechanism::TransformedCopy);
}
