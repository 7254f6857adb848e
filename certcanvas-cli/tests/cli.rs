//! Integration tests for the certcanvas command-line tool.
//!
//! Commands run in-process against templates in a temporary directory.

use std::fs;
use std::path::Path;

use certcanvas_cli::{read_template, run, CliArgs};
use certcanvas_core::{EditorConfig, ElementKind};
use clap::Parser;

fn exec(args: &[&str]) -> anyhow::Result<String> {
    let args = CliArgs::try_parse_from(std::iter::once("certcanvas").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    run(args, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

// ==========================================================================
// new / validate
// ==========================================================================

#[test]
fn test_new_writes_empty_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("diploma.json");

    exec(&["new", path_str(&template), "--width", "800", "--height", "600"]).expect("new");

    let store = read_template(&template, EditorConfig::default()).expect("read");
    assert!(store.scene().is_empty());
    assert!((store.scene().canvas_width() - 800.0).abs() < f64::EPSILON);

    let report = exec(&["validate", path_str(&template)]).expect("validate");
    assert_eq!(report.trim(), "ok: 0 elements, 800x600");
}

#[test]
fn test_new_rejects_bad_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("bad.json");
    assert!(exec(&["new", path_str(&template), "--width", "0"]).is_err());
    assert!(!template.exists());
}

#[test]
fn test_validate_reports_invalid_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("dup.json");
    fs::write(
        &template,
        r#"{"elements":[
            {"id":"a","type":"line","x":0,"y":0,"width":10,"height":2},
            {"id":"a","type":"line","x":0,"y":0,"width":10,"height":2}
        ],"canvasWidth":100,"canvasHeight":100}"#,
    )
    .expect("write");
    assert!(exec(&["validate", path_str(&template)]).is_err());
}

// ==========================================================================
// embed-image / layers / render
// ==========================================================================

#[test]
fn test_embed_image_then_render_and_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("award.json");
    let logo = dir.path().join("logo.svg");
    fs::write(&logo, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").expect("write logo");

    exec(&["new", path_str(&template)]).expect("new");
    let id = exec(&[
        "embed-image",
        path_str(&template),
        path_str(&logo),
        "--x",
        "40",
        "--y",
        "60",
    ])
    .expect("embed");

    let store = read_template(&template, EditorConfig::default()).expect("read");
    let element = store.scene().elements().first().expect("element");
    assert_eq!(element.id.as_str(), id.trim());
    assert!((element.x - 40.0).abs() < f64::EPSILON);
    match element.kind() {
        ElementKind::Image(image) => assert!(image.src.starts_with("data:image/svg+xml;base64,")),
        other => panic!("unexpected {other:?}"),
    }

    let layers = exec(&["layers", path_str(&template)]).expect("layers");
    assert!(layers.contains("Image"));
    assert!(layers.contains(id.trim()));

    let svg_path = dir.path().join("award.svg");
    exec(&["render", path_str(&template), "-o", path_str(&svg_path), "--grid"]).expect("render");
    let svg = fs::read_to_string(&svg_path).expect("svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("data:image/svg+xml;base64,"));
    assert!(svg.contains("<pattern id=\"grid\""));
}

#[test]
fn test_embed_background_and_json_render() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("bg.json");
    let paper = dir.path().join("paper.png");
    fs::write(&paper, [0x89, b'P', b'N', b'G']).expect("write png");

    exec(&["new", path_str(&template)]).expect("new");
    exec(&["embed-image", path_str(&template), path_str(&paper), "--background"]).expect("embed");

    let tree = exec(&["render", path_str(&template), "--format", "json", "--zoom", "0.5"])
        .expect("render");
    let value: serde_json::Value = serde_json::from_str(&tree).expect("json");
    assert!(value["background"]
        .as_str()
        .is_some_and(|bg| bg.starts_with("data:image/png;base64,")));
    assert_eq!(value["zoom"], 0.5);
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_embed_rejects_unknown_type_and_keeps_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("keep.json");
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "not an image").expect("write");

    exec(&["new", path_str(&template)]).expect("new");
    let before = fs::read_to_string(&template).expect("read");
    assert!(exec(&["embed-image", path_str(&template), path_str(&notes)]).is_err());
    assert_eq!(fs::read_to_string(&template).expect("read"), before);
}

#[test]
fn test_embed_respects_size_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("limit.json");
    let big = dir.path().join("big.png");
    fs::write(&big, vec![0u8; 64]).expect("write");

    exec(&["new", path_str(&template)]).expect("new");
    assert!(exec(&[
        "embed-image",
        path_str(&template),
        path_str(&big),
        "--max-bytes",
        "16"
    ])
    .is_err());
}

#[test]
fn test_layers_json_is_topmost_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join("stack.json");
    fs::write(
        &template,
        r#"{"elements":[
            {"id":"low","type":"line","x":0,"y":0,"width":10,"height":2,"zIndex":0},
            {"id":"high","type":"text","x":0,"y":0,"width":10,"height":20,"zIndex":4,"text":"Top"}
        ],"canvasWidth":100,"canvasHeight":100}"#,
    )
    .expect("write");

    let rows = exec(&["layers", path_str(&template), "--json"]).expect("layers");
    let rows: serde_json::Value = serde_json::from_str(&rows).expect("json");
    assert_eq!(rows[0]["id"], "high");
    assert_eq!(rows[0]["label"], "Top");
    assert_eq!(rows[1]["id"], "low");
}
