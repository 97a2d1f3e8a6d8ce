// tests/invocation_parsing.rs

mod common;
use crate::common::builders::InvocationConfigBuilder;

use postdeploy::config::InvocationConfig;
use postdeploy::errors::DeployError;
use postdeploy::types::{BuildConfiguration, BuildPlatform, TargetApi};

#[test]
fn valid_tokens_produce_a_config() {
    let root = tempfile::tempdir().unwrap();
    let config = InvocationConfigBuilder::new(root.path())
        .configuration("Release_Vulkan")
        .build();

    assert_eq!(config.target_api, TargetApi::Vulkan);
    assert_eq!(config.configuration, BuildConfiguration::Release);
    assert_eq!(config.platform, BuildPlatform::X64);
    assert_eq!(config.external_paths.len(), 1);
    assert_eq!(config.project_dir(), root.path().join("project"));
}

#[test]
fn gl_and_publish_tokens_are_case_insensitive() {
    let root = tempfile::tempdir().unwrap();
    let config = InvocationConfigBuilder::new(root.path())
        .configuration("PUBLISH_GL")
        .build();

    assert_eq!(config.target_api, TargetApi::OpenGl);
    assert_eq!(config.configuration, BuildConfiguration::Publish);
}

#[test]
fn identity_ignores_case_of_the_executable_path() {
    let root = tempfile::tempdir().unwrap();
    let a = InvocationConfigBuilder::new(root.path())
        .executable(root.path().join("out").join("Game.exe"))
        .build();
    let b = InvocationConfigBuilder::new(root.path())
        .executable(root.path().join("out").join("GAME.EXE"))
        .build();

    assert_eq!(a.identity(), b.identity());
}

#[test]
fn unknown_target_api_fails_fast() {
    let root = tempfile::tempdir().unwrap();
    let tokens = InvocationConfigBuilder::new(root.path())
        .configuration("Debug_DirectX")
        .tokens();

    let err = InvocationConfig::from_tokens(tokens).unwrap_err();
    assert!(matches!(err, DeployError::InvocationError(_)));
    assert!(err.to_string().contains("target API"));
}

#[test]
fn missing_build_configuration_fails_fast() {
    let root = tempfile::tempdir().unwrap();
    let tokens = InvocationConfigBuilder::new(root.path())
        .configuration("Vulkan")
        .tokens();

    assert!(matches!(
        InvocationConfig::from_tokens(tokens),
        Err(DeployError::InvocationError(_))
    ));
}

#[test]
fn only_x64_is_accepted() {
    let root = tempfile::tempdir().unwrap();
    let tokens = InvocationConfigBuilder::new(root.path())
        .platform("Win32")
        .tokens();

    let err = InvocationConfig::from_tokens(tokens).unwrap_err();
    assert!(err.to_string().contains("x64"));
}

#[test]
fn at_least_one_external_root_is_required() {
    let root = tempfile::tempdir().unwrap();
    let tokens = InvocationConfigBuilder::new(root.path()).externals(&[]).tokens();

    let err = InvocationConfig::from_tokens(tokens).unwrap_err();
    assert!(err.to_string().contains("external"));
}

#[test]
fn empty_output_path_is_missing() {
    let root = tempfile::tempdir().unwrap();
    let mut tokens = InvocationConfigBuilder::new(root.path()).tokens();
    tokens.output = "   ".to_string();

    let err = InvocationConfig::from_tokens(tokens).unwrap_err();
    assert!(err.to_string().contains("output directory is missing"));
}
