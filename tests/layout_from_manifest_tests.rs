//! Tests for running the configuration pass over manifest fixtures.

use buildtree::{
    ir::{BuildLayout, ConfigError, CycleError, PassOptions},
    manifest,
};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::rstest;

fn layout_for(path: &str, options: &PassOptions) -> Result<BuildLayout, ConfigError> {
    let manifest = manifest::from_path(path).expect("load");
    BuildLayout::from_manifest(&manifest, options)
}

fn dir_of<'a>(layout: &'a BuildLayout, name: &str) -> Option<&'a str> {
    layout.build_dir_of(name).map(Utf8Path::as_str)
}

#[rstest]
fn android_tree_relocates_outside_the_source_tree() {
    let layout = layout_for("tests/data/android.yml", &PassOptions::new("/repo")).expect("layout");
    assert_eq!(layout.root.project_dir.as_str(), "/repo/android");
    assert_eq!(layout.root_build_dir().as_str(), "/repo/build");
    for name in ["app", "camera_android_camerax", "path_provider_android"] {
        assert_eq!(
            dir_of(&layout, name),
            Some(format!("/repo/build/{name}").as_str())
        );
    }
    let camera = layout.project("camera_android_camerax").expect("camera");
    assert_eq!(
        camera.project_dir.as_str(),
        "/repo/plugins/camera_android_camerax/android"
    );
}

#[rstest]
fn android_tree_evaluates_app_first() {
    let layout = layout_for("tests/data/android.yml", &PassOptions::new("/repo")).expect("layout");
    assert_eq!(
        layout.evaluation_order,
        ["app", "camera_android_camerax", "path_provider_android"]
    );
    let keys: Vec<&str> = layout.subprojects.keys().map(String::as_str).collect();
    assert_eq!(keys, layout.evaluation_order);
}

#[rstest]
fn android_properties_reach_every_subproject() {
    let layout = layout_for("tests/data/android.yml", &PassOptions::new("/repo")).expect("layout");
    for project in layout.subprojects.values() {
        assert_eq!(
            project
                .properties
                .get("androidx.lifecycle.version")
                .map(String::as_str),
            Some("2.6.1"),
            "{}",
            project.name
        );
    }
}

#[rstest]
#[case::absolute("/out", "/out")]
#[case::relative_to_conventional("../../shared", "/repo/shared")]
fn override_replaces_manifest_relocation(#[case] relocate: &str, #[case] root: &str) {
    let options = PassOptions::new("/repo").with_relocate(relocate);
    let layout = layout_for("tests/data/android.yml", &options).expect("layout");
    assert_eq!(layout.root_build_dir().as_str(), root);
    assert_eq!(
        dir_of(&layout, "app"),
        Some(Utf8PathBuf::from(root).join("app").as_str())
    );
}

#[rstest]
fn nested_tree_inherits_properties_and_orders_constraints() {
    let layout = layout_for("tests/data/nested.yml", &PassOptions::new("/repo")).expect("layout");
    assert_eq!(layout.evaluation_order, ["features", "scanner", "app"]);
    assert_eq!(dir_of(&layout, "scanner"), Some("/repo/build/scanner"));

    let scanner = layout.project("scanner").expect("scanner");
    assert_eq!(scanner.parent.as_deref(), Some("features"));
    assert_eq!(scanner.project_dir.as_str(), "/repo/features/scanner");
    assert_eq!(scanner.properties.get("channel").map(String::as_str), Some("beta"));
    assert_eq!(scanner.properties.get("sdk").map(String::as_str), Some("33"));

    let app = layout.project("app").expect("app");
    assert_eq!(app.properties.get("channel").map(String::as_str), Some("stable"));
    assert_eq!(app.properties.get("sdk").map(String::as_str), Some("34"));
}

#[rstest]
#[case(
    "tests/data/ordering_cycle.yml",
    ConfigError::Cycle(CycleError {
        cycle: vec!["app".into(), "lib".into(), "core".into(), "app".into()],
    })
)]
#[case(
    "tests/data/duplicate_outputs.yml",
    ConfigError::DuplicateOutput {
        path: Utf8PathBuf::from("/repo/out/app"),
        projects: vec!["app".into(), "tools".into()],
    }
)]
#[case(
    "tests/data/unknown_parent.yml",
    ConfigError::UnknownParent {
        project: "app".into(),
        parent: "ghost".into(),
    }
)]
fn manifest_error_cases(#[case] manifest_path: &str, #[case] expected: ConfigError) {
    let err = layout_for(manifest_path, &PassOptions::new("/repo")).expect_err("error");
    assert_eq!(err, expected);
}

#[rstest]
fn cycle_error_names_the_path() {
    let err = layout_for("tests/data/ordering_cycle.yml", &PassOptions::new("/repo"))
        .expect_err("cycle");
    assert_eq!(
        err.to_string(),
        "evaluation order contains a cycle: app -> lib -> core -> app"
    );
}
