// tests/classification.rs

mod common;
use crate::common::builders::InvocationConfigBuilder;

use std::path::{Path, PathBuf};

use postdeploy::classify::obj::{find_mtllib, mtl_textures};
use postdeploy::classify::shader::scan_includes;
use postdeploy::classify::{
    designated_output, BuiltinImporter, Classification, Classifier, ModelImporter,
};
use postdeploy::config::InvocationConfig;
use postdeploy::fs::mock::MockFileSystem;
use postdeploy::plan::PlanKind;

fn config(api: &str) -> InvocationConfig {
    InvocationConfigBuilder::new("/p")
        .configuration(&format!("Debug_{api}"))
        .build()
}

#[test]
fn shader_filter_wins_and_collects_includes() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/p/project/shaders/lit.frag",
        "#version 450\n#include \"common/light.glsl\"\n  # INCLUDE \"brdf.glsl\"\nvoid main() {}\n",
    );
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("Vulkan"), Path::new("/p/project/shaders/lit.frag"), "shaders")
        .unwrap();
    assert_eq!(
        result,
        Classification::Shader {
            includes: vec!["common/light.glsl".to_string(), "brdf.glsl".to_string()],
        }
    );
}

#[test]
fn files_outside_known_filters_are_skipped() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/project/src/main.cpp", "int main() {}");
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let cfg = config("Vulkan");
    let path = Path::new("/p/project/src/main.cpp");
    assert_eq!(classifier.classify(&cfg, path, "src").unwrap(), Classification::Skip);
    assert!(classifier.prepare(&cfg, path, "src").unwrap().is_none());
}

#[test]
fn filter_must_start_with_the_root_name() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/project/myassets/a.txt", "x");
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("GL"), Path::new("/p/project/myassets/a.txt"), "myassets")
        .unwrap();
    assert_eq!(result, Classification::Skip);
}

#[test]
fn external_files_are_deployed_whatever_their_filter() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/externals/debug/bin/x64/lib.dll", "MZ");
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("GL"), Path::new("/p/externals/debug/bin/x64/lib.dll"), ".")
        .unwrap();
    assert_eq!(result, Classification::Generic);
}

#[test]
fn obj_model_brings_textures_and_materials() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/p/project/assets/box/box.obj",
        "mtllib old.mtl\nv 0 0 0\nmtllib mat/box.mtl\n",
    );
    fs.add_file(
        "/p/project/assets/box/mat/box.mtl",
        "newmtl m\nmap_Kd diffuse.png\nbump -bm 0.5 normal.png\nmap_Kd diffuse.png\n",
    );
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("GL"), Path::new("/p/project/assets/box/box.obj"), "assets\\box")
        .unwrap();
    assert_eq!(
        result,
        Classification::Model {
            textures: vec!["mat/diffuse.png".to_string(), "mat/normal.png".to_string()],
            materials: Some("mat/box.mtl".to_string()),
        }
    );
}

#[test]
fn gltf_skips_embedded_images() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/p/project/assets/duck.gltf",
        r#"{"asset":{"version":"2.0"},"images":[{"uri":"duck.png"},{"uri":"data:image/png;base64,AAAA"},{"uri":"duck.png"}]}"#,
    );
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("GL"), Path::new("/p/project/assets/duck.gltf"), "assets")
        .unwrap();
    assert_eq!(
        result,
        Classification::Model {
            textures: vec!["duck.png".to_string()],
            materials: None,
        }
    );
}

#[test]
fn broken_model_falls_back_to_generic() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/project/assets/broken.gltf", r#"{"images":[]}"#);
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let result = classifier
        .classify(&config("GL"), Path::new("/p/project/assets/broken.gltf"), "assets")
        .unwrap();
    assert_eq!(result, Classification::Generic);
}

#[test]
fn scenes_and_plain_files() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/project/assets/level.fscene", "{}");
    fs.add_file("/p/project/assets/readme.txt", "hello");
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();
    let cfg = config("GL");

    assert_eq!(
        classifier
            .classify(&cfg, Path::new("/p/project/assets/level.fscene"), "assets")
            .unwrap(),
        Classification::Scene
    );
    assert_eq!(
        classifier
            .classify(&cfg, Path::new("/p/project/assets/readme.txt"), "assets")
            .unwrap(),
        Classification::Generic
    );
}

#[test]
fn missing_input_is_an_error() {
    let fs = MockFileSystem::new();
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();

    let err = classifier
        .classify(&config("GL"), Path::new("/p/project/assets/gone.png"), "assets")
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn vulkan_shader_output_gets_spv_suffix() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/project/shaders/post/blur.comp", "void main() {}");
    let classifier = Classifier::new(&fs, &BuiltinImporter).unwrap();
    let input = Path::new("/p/project/shaders/post/blur.comp");

    let vk = classifier
        .prepare(&config("Vulkan"), input, "shaders\\post")
        .unwrap()
        .unwrap();
    assert_eq!(vk.output_path, PathBuf::from("/p/out/shaders/post/blur.comp.spv"));
    assert!(matches!(vk.kind, PlanKind::VkShader { .. }));

    let gl = classifier
        .prepare(&config("GL"), input, "shaders\\post")
        .unwrap()
        .unwrap();
    assert_eq!(gl.output_path, PathBuf::from("/p/out/shaders/post/blur.comp"));
    assert!(matches!(gl.kind, PlanKind::GlShader { .. }));
}

#[test]
fn designated_output_follows_the_filter_not_the_include() {
    let out = designated_output(
        &config("GL"),
        Path::new("/p/project/content/raw/a.png"),
        "assets\\textures",
    );
    assert_eq!(out, PathBuf::from("/p/out/assets/textures/a.png"));
}

#[test]
fn ascii_fbx_lists_relative_filenames() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/m/ship.fbx",
        "; FBX 7.4.0 project file\nFBXHeaderExtension:  {\n}\nTexture: {\n RelativeFilename: \"tex\\hull.png\"\n}\nVideo: {\n RelativeFilename: \"tex\\hull.png\"\n}\n",
    );
    fs.add_file("/m/binary.fbx", b"Kaydara FBX Binary  \x00\x1a\x00".to_vec());
    fs.add_file("/m/junk.fbx", "hello");

    let importer = BuiltinImporter;
    let ship = importer.import(&fs, Path::new("/m/ship.fbx")).unwrap().unwrap();
    assert_eq!(ship.textures, vec!["tex\\hull.png".to_string()]);

    let binary = importer.import(&fs, Path::new("/m/binary.fbx")).unwrap().unwrap();
    assert!(binary.textures.is_empty());

    assert!(importer.import(&fs, Path::new("/m/junk.fbx")).is_err());
}

#[test]
fn collada_images_come_from_init_from() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/m/tree.dae",
        "<COLLADA><library_images><image><init_from>bark.jpg</init_from></image>\
         <image><init_from>\n  leaves.png\n</init_from></image></library_images></COLLADA>",
    );

    let model = BuiltinImporter
        .import(&fs, Path::new("/m/tree.dae"))
        .unwrap()
        .unwrap();
    assert_eq!(model.textures, vec!["bark.jpg".to_string(), "leaves.png".to_string()]);
}

#[test]
fn non_model_extensions_are_not_imported() {
    let fs = MockFileSystem::new();
    fs.add_file("/m/a.png", "png");
    assert!(BuiltinImporter.import(&fs, Path::new("/m/a.png")).unwrap().is_none());
}

#[test]
fn last_mtllib_wins() {
    assert_eq!(
        find_mtllib("mtllib a.mtl\n  mtllib b.mtl\nmtllib\n"),
        Some("b.mtl".to_string())
    );
    assert_eq!(find_mtllib("v 1 2 3\n"), None);
}

#[test]
fn mtl_texture_statements_take_the_last_token() {
    let textures = mtl_textures("map_Ks -clamp on spec.png\nnorm n.png\nKd 1 1 1\ndecal d.png\n");
    assert_eq!(textures, vec!["spec.png", "n.png", "d.png"]);
}

#[test]
fn include_directives_need_quotes_and_line_start() {
    let includes = scan_includes(
        "#include <system.glsl>\n// #include \"commented.glsl\"\n#include \"a.glsl\"\n",
    )
    .unwrap();
    assert_eq!(includes, vec!["a.glsl".to_string()]);
}
