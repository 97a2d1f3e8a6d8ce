// tests/plan_conflicts.rs

use std::path::PathBuf;

use postdeploy::model::FileKind;
use postdeploy::normalize::normalize;
use postdeploy::plan::{kick_out_shared, resolve_against, DeploymentPlan, PlanKind};

fn generic(input: &str, output: &str) -> DeploymentPlan {
    DeploymentPlan::new(
        input,
        "assets",
        output,
        PlanKind::Copy {
            kind: FileKind::Generic,
        },
    )
}

fn model(input: &str, output: &str, textures: &[&str]) -> DeploymentPlan {
    DeploymentPlan::model(
        input,
        "assets",
        output,
        textures.iter().map(|t| t.to_string()).collect(),
        None,
    )
}

#[test]
fn same_output_from_same_input_is_no_conflict() {
    let a = generic("/src/a.png", "/out/a.png");
    let b = generic("/SRC/A.PNG", "/out/A.png/");
    assert!(!a.has_conflict_with(&b));
}

#[test]
fn same_output_from_different_inputs_conflicts() {
    let a = generic("/src/one/a.png", "/out/a.png");
    let b = generic("/src/two/a.png", "/out/a.png");
    assert!(a.has_conflict_with(&b));
    assert!(b.has_conflict_with(&a));
}

#[test]
fn models_conflict_through_their_textures() {
    // Different model outputs, but both write out/tex/wood.png from
    // different sources.
    let a = model("/src/a/chair.obj", "/out/chair.obj", &["tex/wood.png"]);
    let b = model("/src/b/table.obj", "/out/table.obj", &["tex/wood.png"]);
    assert!(a.has_conflict_with(&b));

    // Same texture source: no conflict.
    let c = model("/src/a/stool.obj", "/out/stool.obj", &["tex/wood.png"]);
    assert!(!a.has_conflict_with(&c));
}

#[test]
fn relocation_nests_output_and_texture_paths() {
    let mut plan = model("/src/b/chair.obj", "/out/chair.obj", &["tex/wood.png"]);
    plan.resolve_conflict_by_relocating().unwrap();

    assert_eq!(plan.output_path, PathBuf::from("/out/chair.obj/chair.obj"));
    let records = &plan.model_plan().unwrap().records;
    assert_eq!(records[0].output, normalize("/out/chair.obj/tex/wood.png"));
}

#[test]
fn relocating_twice_is_an_error() {
    let mut plan = model("/src/b/chair.obj", "/out/chair.obj", &[]);
    plan.resolve_conflict_by_relocating().unwrap();

    let err = plan.resolve_conflict_by_relocating().unwrap_err();
    assert!(err.to_string().contains("already been moved into a subfolder"));
    assert_eq!(plan.output_path, PathBuf::from("/out/chair.obj/chair.obj"));
}

#[test]
fn later_model_is_relocated_first_one_keeps_its_spot() {
    let first = model("/src/a/chair.obj", "/out/chair.obj", &[]);
    let mut second = model("/src/b/chair.obj", "/out/chair.obj", &[]);

    let outcome = resolve_against(&mut second, std::slice::from_ref(&first)).unwrap();
    assert_eq!(outcome.relocations, 1);
    assert!(outcome.unresolved.is_empty());
    assert_eq!(first.output_path, PathBuf::from("/out/chair.obj"));
    assert_eq!(second.output_path, PathBuf::from("/out/chair.obj/chair.obj"));
}

#[test]
fn relocation_rescans_from_the_top() {
    // After moving into chair.obj/, the second model collides with an
    // already relocated third one and cannot move again.
    let accepted = vec![
        model("/src/a/chair.obj", "/out/chair.obj", &[]),
        model("/src/c/chair.obj", "/out/chair.obj/chair.obj", &[]),
    ];
    let mut plan = model("/src/b/chair.obj", "/out/chair.obj", &[]);

    assert!(resolve_against(&mut plan, &accepted).is_err());
}

#[test]
fn model_versus_plain_file_is_only_reported() {
    let accepted = vec![generic("/src/x/chair.obj", "/out/chair.obj")];
    let mut plan = model("/src/a/chair.obj", "/out/chair.obj", &[]);

    let outcome = resolve_against(&mut plan, &accepted).unwrap();
    assert_eq!(outcome.relocations, 0);
    assert_eq!(outcome.unresolved.into_iter().collect::<Vec<_>>(), vec![0]);
    assert_eq!(plan.output_path, PathBuf::from("/out/chair.obj"));
}

#[test]
fn shared_textures_are_kicked_out() {
    let first = model(
        "/src/m/a.fbx",
        "/out/a.fbx",
        &["shared.png", "a_only.png"],
    );
    let mut second = model(
        "/src/m/b.fbx",
        "/out/b.fbx",
        &["shared.png", "./SHARED.png", "b_only.png"],
    );

    kick_out_shared(&mut second, std::slice::from_ref(&first));

    let remaining = &second.model_plan().unwrap().textures;
    assert_eq!(remaining, &vec!["b_only.png".to_string()]);

    let first_outputs: Vec<_> = first
        .model_plan()
        .unwrap()
        .records
        .iter()
        .map(|r| r.output.clone())
        .collect();
    for record in &second.model_plan().unwrap().records {
        assert!(!first_outputs.contains(&record.output));
    }
}

#[test]
fn kick_out_ignores_plain_files() {
    let accepted = vec![generic("/src/m/shared.png", "/out/shared.png")];
    let mut plan = model("/src/m/a.fbx", "/out/a.fbx", &["shared.png"]);

    kick_out_shared(&mut plan, &accepted);
    assert_eq!(plan.model_plan().unwrap().textures.len(), 1);
}
