//! Tests for rendering resolved layouts.

use buildtree::{
    ir::{BuildLayout, PassOptions},
    layout_gen, manifest,
};
use rstest::{fixture, rstest};
use test_support::manifest_yaml;

#[fixture]
fn layout() -> BuildLayout {
    let yaml = manifest_yaml(
        "\
root:
  name: workspace
  relocate: /out
subprojects:
  - name: zeta
  - name: camera
  - name: app
evaluation_order:
  - dependent: \"*\"
    dependency: app
",
    );
    let manifest = manifest::from_str(&yaml).expect("parse");
    BuildLayout::from_manifest(&manifest, &PassOptions::new("/repo")).expect("layout")
}

#[rstest]
fn text_lists_root_then_evaluation_order(layout: BuildLayout) {
    assert_eq!(
        layout_gen::text(&layout),
        "workspace\t/out\napp\t/out/app\nzeta\t/out/zeta\ncamera\t/out/camera\n"
    );
}

#[rstest]
fn order_lists_one_name_per_line(layout: BuildLayout) {
    assert_eq!(layout_gen::order(&layout), "app\nzeta\ncamera\n");
}

#[rstest]
fn dot_sorts_nodes_and_edges(layout: BuildLayout) {
    let expected = "\
digraph buildtree {
  \"app\";
  \"camera\";
  \"zeta\";
  \"camera\" -> \"app\";
  \"zeta\" -> \"app\";
}
";
    assert_eq!(layout_gen::dot(&layout), expected);
}

#[rstest]
fn json_preserves_declaration_order(layout: BuildLayout) {
    let json = layout_gen::json(&layout).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["root"]["build_dir"], "/out");
    assert_eq!(value["root"]["parent"], serde_json::Value::Null);
    let keys: Vec<&str> = value["subprojects"]
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["app", "zeta", "camera"]);
    assert_eq!(value["constraints"][0]["dependent"], "zeta");
    assert_eq!(value["constraints"][0]["dependency"], "app");
}

#[rstest]
fn rendering_is_deterministic(layout: BuildLayout) {
    let again = layout.clone();
    assert_eq!(layout_gen::dot(&layout), layout_gen::dot(&again));
    assert_eq!(
        layout_gen::json(&layout).expect("json"),
        layout_gen::json(&again).expect("json")
    );
}
