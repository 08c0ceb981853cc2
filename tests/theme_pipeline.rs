use std::path::PathBuf;
use std::time::Duration;

use domsvg_lib::types::{SvgTag, VectorNode};
use domsvg_lib::{
    capture, convert_snapshots, match_documents, render_snapshot, to_svg_string, CaptureOptions,
    NoopIconFetcher, RootSelector, SnapshotSurface, SourceSnapshot, ThemeVariableTable,
    VarCategory,
};
use serde_json::{json, Value};

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_assets")
        .join(name)
}

fn load(name: &str) -> SourceSnapshot {
    let raw = std::fs::read_to_string(asset(name)).expect("read snapshot asset");
    serde_json::from_str(&raw).expect("parse snapshot asset")
}

fn options() -> CaptureOptions {
    CaptureOptions {
        settle_delay: Duration::ZERO,
        ..CaptureOptions::default()
    }
}

fn snapshot(root: Value) -> SourceSnapshot {
    serde_json::from_value(json!({
        "url": "https://example.com/",
        "viewport": {"width": 1440, "height": 900},
        "rootPath": [0],
        "root": root
    }))
    .expect("snapshot json")
}

fn bordered(id: u32, color: &str, bbox: Value) -> Value {
    let mut style = serde_json::Map::new();
    for side in ["top", "right", "bottom", "left"] {
        style.insert(format!("border-{side}-width"), json!("1px"));
        style.insert(format!("border-{side}-style"), json!("solid"));
        style.insert(format!("border-{side}-color"), json!(color));
    }
    for corner in ["top-left", "top-right", "bottom-right", "bottom-left"] {
        style.insert(format!("border-{corner}-radius"), json!("8px"));
    }
    json!({"nodeType": "element", "id": id, "tag": "div", "style": style, "bbox": bbox})
}

fn collect<'a>(node: &'a VectorNode, tag: SvgTag) -> Vec<&'a VectorNode> {
    let mut out = Vec::new();
    node.walk(&mut |n| {
        if n.tag == tag {
            out.push(n);
        }
    });
    out
}

fn style_block(svg: &str) -> String {
    let doc = roxmltree::Document::parse(svg).expect("theme-aware output is well-formed");
    doc.descendants()
        .find(|n| n.has_tag_name("style"))
        .and_then(|n| n.text())
        .expect("style block")
        .to_string()
}

#[tokio::test]
async fn border_color_change_becomes_one_color_variable() {
    let light = snapshot(bordered(1, "red", json!({"x": 0, "y": 0, "width": 200, "height": 80})));
    let dark = snapshot(bordered(1, "blue", json!({"x": 0, "y": 0, "width": 200, "height": 80})));

    let result = convert_snapshots(&light, Some(&dark), &NoopIconFetcher, &options())
        .await
        .unwrap();

    assert_eq!(result.variables.len(), 1);
    let var = &result.variables.variables[0];
    assert_eq!(var.category, VarCategory::Color);
    assert_eq!((var.light.as_str(), var.dark.as_str()), ("red", "blue"));
    assert_eq!(var.name, "color-red--blue");

    assert_eq!(result.light.matches("<rect").count(), 1);
    assert!(result.light.contains("stroke=\"var(--color-red--blue)\""));
    assert!(result.light.contains("@media (prefers-color-scheme: dark)"));
    let dark_svg = result.dark.expect("dark document");
    assert!(dark_svg.contains("stroke=\"blue\""));
    assert!(!dark_svg.contains("var(--"));
}

#[tokio::test]
async fn identical_value_pairs_share_one_variable() {
    let root = |color: &str| {
        json!({
            "id": 1, "tag": "div",
            "bbox": {"x": 0, "y": 0, "width": 400, "height": 100},
            "children": [
                bordered(2, color, json!({"x": 10, "y": 10, "width": 100, "height": 40})),
                bordered(3, color, json!({"x": 200, "y": 10, "width": 100, "height": 40}))
            ]
        })
    };
    let result = convert_snapshots(
        &snapshot(root("red")),
        Some(&snapshot(root("blue"))),
        &NoopIconFetcher,
        &options(),
    )
    .await
    .unwrap();

    assert_eq!(result.variables.len(), 1);
    assert_eq!(result.light.matches("var(--color-red--blue)").count(), 2);
    assert!(result.unmatched.is_empty());
}

#[tokio::test]
async fn date_inputs_render_the_formatted_value() {
    let input = snapshot(json!({
        "id": 1, "tag": "input",
        "attributes": {"type": "date"},
        "value": "2024-01-01",
        "style": {
            "color": "rgb(17, 24, 39)", "font-size": "14px",
            "padding-left": "8px", "padding-top": "6px", "padding-bottom": "6px",
            "border-top-width": "1px", "border-bottom-width": "1px", "border-left-width": "1px"
        },
        "bbox": {"x": 10, "y": 20, "width": 200, "height": 32}
    }));

    let doc = render_snapshot(&input, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let texts = collect(&doc.root, SvgTag::Text);
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].full_text(), "1/1/2024, 12:00:00 AM");
    assert_eq!(texts[0].attr("x"), Some("19"));
}

#[tokio::test]
async fn overflowing_single_line_text_is_truncated_with_an_ellipsis() {
    let doc = render_snapshot(&load("card_light.json"), &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let texts = collect(&doc.root, SvgTag::Text);
    let hint = texts
        .iter()
        .map(|t| t.full_text())
        .find(|t| t.starts_with("Receive"))
        .expect("hint text");
    assert!(hint.ends_with("..."), "got {hint}");
    assert!(!hint.contains("every week"));
    assert!(texts.iter().any(|t| t.full_text() == "Notifications"));
}

#[tokio::test]
async fn interactive_clipping_box_without_content_keeps_a_hit_rect() {
    let page = snapshot(json!({
        "id": 1, "tag": "div",
        "style": {"background-color": "rgb(255, 255, 255)"},
        "bbox": {"x": 0, "y": 0, "width": 300, "height": 200},
        "children": [{
            "nodeType": "element", "id": 2, "tag": "div",
            "attributes": {"data-command": "open-menu"},
            "style": {"overflow": "hidden"},
            "bbox": {"x": 20, "y": 20, "width": 120, "height": 40}
        }]
    }));

    let doc = render_snapshot(&page, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let hit_rects: Vec<_> = collect(&doc.root, SvgTag::Rect)
        .into_iter()
        .filter(|r| r.attr("fill") == Some("transparent"))
        .collect();
    assert_eq!(hit_rects.len(), 1);
    assert_eq!(hit_rects[0].attr("width"), Some("120"));
}

#[tokio::test]
async fn recorded_themes_match_totally_and_round_trip_through_the_style_block() {
    let light = load("card_light.json");
    let dark = load("card_dark.json");

    let light_doc = render_snapshot(&light, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let dark_doc = render_snapshot(&dark, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let report = match_documents(&light_doc.root, &dark_doc.root).unwrap();
    assert!(report.unmatched.is_empty(), "unmatched: {:?}", report.unmatched);

    let result = convert_snapshots(&light, Some(&dark), &NoopIconFetcher, &options())
        .await
        .unwrap();
    assert!(result.variables.len() >= 4);

    let parsed = ThemeVariableTable::parse_style_sheet(&style_block(&result.light));
    assert_eq!(parsed.as_ref(), Some(&result.variables));

    let plain_light = to_svg_string(&light_doc);
    let plain_dark = result.dark.as_deref().expect("dark document");
    for var in &result.variables.variables {
        assert!(plain_light.contains(&var.light), "{} missing in light", var.light);
        assert!(plain_dark.contains(&var.dark), "{} missing in dark", var.dark);
        assert!(result.light.contains(&format!("var(--{})", var.name)));
    }
}

#[tokio::test]
async fn fingerprints_are_stable_across_renders() {
    let snapshot = load("card_dark.json");
    let fingerprints = |root: &VectorNode| {
        let mut out = Vec::new();
        root.walk(&mut |n| {
            if let Some(fp) = &n.fingerprint {
                out.push(fp.clone());
            }
        });
        out
    };
    let first = render_snapshot(&snapshot, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    let second = render_snapshot(&snapshot, &NoopIconFetcher, &options().text)
        .await
        .unwrap();
    assert!(!fingerprints(&first.root).is_empty());
    assert_eq!(fingerprints(&first.root), fingerprints(&second.root));
}

#[tokio::test]
async fn capture_from_recorded_files_produces_both_documents() {
    let mut surface = SnapshotSurface::from_files(
        &asset("card_light.json"),
        Some(&asset("card_dark.json")),
    )
    .unwrap();
    let result = capture(
        &mut surface,
        &RootSelector::new(".card"),
        &NoopIconFetcher,
        &options(),
    )
    .await
    .unwrap();

    assert!(result.light.starts_with("<svg"));
    assert!(result.light.contains("--show-if-dark"));
    assert!(result.dark.is_some());
    assert!(result.unmatched.is_empty());
    assert!(!surface.is_attached());
}

#[tokio::test]
async fn detached_roots_fail_the_whole_capture() {
    let mut detached = load("card_light.json");
    detached.connected = false;
    let err = convert_snapshots(&detached, None, &NoopIconFetcher, &options())
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Measurement error"));
}
