//! Source snapshot types: the rendered element subtree as captured from a live page.
//!
//! A snapshot is produced once per theme by a capture surface. It carries everything the
//! converter needs to know about the live document: computed styles, absolute boxes, the
//! platform visibility verdict, text range measurements and markers recorded by earlier
//! passes (canvas drawing instructions, pixel snapshots, inline vector markup).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::geometry::{Rect, Viewport};

/// Stable identifier of an element inside one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub viewport: Viewport,
    /// Whether the root was attached to a live surface when it was measured.
    #[serde(default = "default_true")]
    pub connected: bool,
    /// Child-index path from the document body to `root`.
    #[serde(default)]
    pub root_path: Vec<u32>,
    pub root: SourceElement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "camelCase")]
pub enum SourceNode {
    Element(SourceElement),
    Text(TextNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceElement {
    pub id: ElementId,
    /// Lowercase tag name.
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: ComputedStyle,
    /// Computed `::placeholder` style for inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_style: Option<ComputedStyle>,
    pub bbox: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_width: Option<f32>,
    /// `Element.checkVisibility({opacityProperty, visibilityProperty})` as reported by the host.
    #[serde(default = "default_true")]
    pub check_visibility: bool,
    /// Current value of input-like controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SourceNode>,
    #[serde(default)]
    pub markers: ElementMarkers,
}

impl SourceElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &SourceElement> {
        self.children.iter().filter_map(|child| match child {
            SourceNode::Element(el) => Some(el),
            SourceNode::Text(_) => None,
        })
    }

    /// Depth-first iterator over this element and every descendant element.
    pub fn descendants(&self) -> Vec<&SourceElement> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(current.element_children());
            i += 1;
        }
        out
    }
}

/// A DOM text node with the range measurements taken by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub text: String,
    /// Bounding rect of the whole text range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_char: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_char: Option<Rect>,
    /// Number of client rects of the range (one per rendered line).
    #[serde(default)]
    pub line_count: u32,
}

/// Computed style keyed by CSS property name (`background-color`, `border-top-width`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle(pub BTreeMap<String, String>);

impl ComputedStyle {
    /// Property value, or the empty string when the host did not report it.
    pub fn get(&self, property: &str) -> &str {
        self.0.get(property).map(String::as_str).unwrap_or("")
    }

    pub fn opt(&self, property: &str) -> Option<&str> {
        self.0
            .get(property)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Numeric prefix of the value, `0.0` when absent or unparsable.
    pub fn px(&self, property: &str) -> f32 {
        crate::css::parse_float(self.get(property)).unwrap_or(0.0)
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        self.0.insert(property.to_string(), value.into());
    }

    pub fn with(mut self, property: &str, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }
}

/// Markers attached to elements by earlier passes on the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMarkers {
    /// Vector drawing instructions previously replayed onto a canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawn: Option<DrawnShapes>,
    /// Current canvas pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<PixelSnapshot>,
    /// Measured advance of the value or placeholder an input-like control displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_width: Option<f32>,
    /// Serialized markup of an inline `<svg>` element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_markup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_glyph: Option<IconGlyph>,
    /// `@keyframes` rules referenced by the element's running animations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnShapes {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub translate: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    #[serde(rename_all = "camelCase")]
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        fill: Option<String>,
        #[serde(default)]
        stroke: Option<String>,
        #[serde(default)]
        line_width: Option<f32>,
        #[serde(default)]
        radius: Option<f32>,
    },
    #[serde(rename_all = "camelCase")]
    Circle {
        x: f32,
        y: f32,
        r: f32,
        #[serde(default)]
        fill: Option<String>,
        #[serde(default)]
        stroke: Option<String>,
        #[serde(default)]
        line_width: Option<f32>,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        stroke: Option<String>,
        #[serde(default)]
        line_width: Option<f32>,
        #[serde(default)]
        dash: Option<Vec<f32>>,
    },
    #[serde(rename_all = "camelCase")]
    Polygon {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        fill: Option<String>,
        #[serde(default)]
        stroke: Option<String>,
        #[serde(default)]
        line_width: Option<f32>,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        x: f32,
        y: f32,
        text: String,
        #[serde(default)]
        fill: Option<String>,
        #[serde(default)]
        font: Option<String>,
        #[serde(default)]
        text_align: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelSnapshot {
    pub width: u32,
    pub height: u32,
    /// Raw RGBA8 pixels, base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgba_base64: Option<String>,
    /// Already-encoded image (`data:image/png;base64,...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<f32>,
}

/// Glyph of an icon font rendered through a `::before` pseudo element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconGlyph {
    pub glyph: String,
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_nested_nodes() {
        let json = r#"{
            "url": "https://example.com",
            "title": "Example",
            "root": {
                "id": 1,
                "tag": "div",
                "classes": ["panel"],
                "style": {"background-color": "rgb(255, 255, 255)", "border-top-width": "1px"},
                "bbox": {"x": 0, "y": 0, "width": 100, "height": 40},
                "children": [
                    {"nodeType": "text", "text": "Hello", "rect": {"x": 4, "y": 4, "width": 30, "height": 16}, "lineCount": 1},
                    {"nodeType": "element", "id": 2, "tag": "span", "bbox": {"x": 40, "y": 4, "width": 20, "height": 16}}
                ]
            }
        }"#;

        let snapshot: SourceSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.connected);
        assert_eq!(snapshot.viewport, Viewport::default());
        let root = &snapshot.root;
        assert_eq!(root.style.get("background-color"), "rgb(255, 255, 255)");
        assert_eq!(root.style.px("border-top-width"), 1.0);
        assert_eq!(root.style.get("missing"), "");
        assert!(root.check_visibility);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.element_children().count(), 1);
        assert!(matches!(&root.children[0], SourceNode::Text(t) if t.line_count == 1));
    }

    #[test]
    fn descendants_are_breadth_ordered_and_complete() {
        let leaf = SourceElement {
            id: ElementId(3),
            tag: "b".into(),
            classes: vec![],
            attributes: BTreeMap::new(),
            style: ComputedStyle::default(),
            placeholder_style: None,
            bbox: Rect::default(),
            client_height: None,
            client_width: None,
            check_visibility: true,
            value: None,
            children: vec![],
            markers: ElementMarkers::default(),
        };
        let mid = SourceElement {
            id: ElementId(2),
            children: vec![SourceNode::Element(leaf)],
            ..root_like()
        };
        let root = SourceElement {
            id: ElementId(1),
            children: vec![SourceNode::Element(mid)],
            ..root_like()
        };
        let ids: Vec<u32> = root.descendants().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    fn root_like() -> SourceElement {
        SourceElement {
            id: ElementId(0),
            tag: "div".into(),
            classes: vec![],
            attributes: BTreeMap::new(),
            style: ComputedStyle::default(),
            placeholder_style: None,
            bbox: Rect::default(),
            client_height: None,
            client_width: None,
            check_visibility: true,
            value: None,
            children: vec![],
            markers: ElementMarkers::default(),
        }
    }
}
