// tests/manifest_parsing.rs

mod common;
use crate::common::manifest;

use std::path::Path;

use postdeploy::classify::manifest::{check_namespaces, parse_manifest, ManifestEntry};
use postdeploy::errors::DeployError;

#[test]
fn entries_come_out_in_document_order() {
    let text = manifest(&[
        ("assets\\models\\box.obj", "assets\\models"),
        ("shaders\\basic.vert", "shaders"),
    ]);

    let entries = parse_manifest(&text).unwrap();
    assert_eq!(
        entries,
        vec![
            ManifestEntry {
                include: "assets\\models\\box.obj".to_string(),
                filter: "assets\\models".to_string(),
            },
            ManifestEntry {
                include: "shaders\\basic.vert".to_string(),
                filter: "shaders".to_string(),
            },
        ]
    );
}

#[test]
fn all_three_element_names_and_free_whitespace_are_accepted() {
    let text = r#"
<ItemGroup>
  <Object   Include="assets/a.fbx"  ><Filter>assets</Filter></Object>
  <Image Include="assets/b.png">
        <Filter>  assets/textures</Filter>
  </Image>
  <ClCompile Include="src/main.cpp"><Filter>src</Filter></ClCompile>
</ItemGroup>"#;

    let entries = parse_manifest(text).unwrap();
    let includes: Vec<_> = entries.iter().map(|e| e.include.as_str()).collect();
    assert_eq!(includes, ["assets/a.fbx", "assets/b.png"]);
}

#[test]
fn mismatched_closing_element_is_not_an_entry() {
    let text = r#"<None Include="a.txt"><Filter>assets</Filter></Image>"#;
    assert!(parse_manifest(text).unwrap().is_empty());
}

#[test]
fn include_resolves_against_the_manifest_directory() {
    let entry = ManifestEntry {
        include: "assets\\models\\..\\box.obj".to_string(),
        filter: "assets".to_string(),
    };
    assert_eq!(
        entry.input_path(Path::new("/proj")),
        Path::new("/proj/assets/box.obj")
    );
}

#[test]
fn filter_named_like_one_of_its_files_aborts() {
    let text = manifest(&[
        ("assets\\box.obj", "assets"),
        ("assets\\tex\\a.png", "assets\\BOX.OBJ"),
    ]);
    let entries = parse_manifest(&text).unwrap();

    let err = check_namespaces(&entries).unwrap_err();
    assert!(matches!(err, DeployError::ManifestError(_)));
    assert!(err.to_string().contains("must not have the same name"));
}

#[test]
fn disjoint_namespaces_pass() {
    let text = manifest(&[
        ("assets\\box.obj", "assets"),
        ("assets\\box\\a.png", "assets\\box"),
    ]);
    let entries = parse_manifest(&text).unwrap();

    assert!(check_namespaces(&entries).is_ok());
}
