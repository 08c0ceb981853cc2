//! Emitted vector tree.
//!
//! Nodes keep their attributes in insertion order so serialization is deterministic
//! across runs; the theme matcher relies on that stability.

use std::collections::HashMap;

use super::geometry::Rect;
use super::source::ElementId;
use crate::text::TextRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Hands out node ids for one emitted document.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Running counter used for `clip-N`/`mask-N` definition ids.
    pub fn next_serial(&mut self) -> u32 {
        self.next_id().0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SvgTag {
    Svg,
    G,
    Defs,
    Style,
    Rect,
    Path,
    Line,
    Circle,
    Polygon,
    Polyline,
    Text,
    Tspan,
    Image,
    Use,
    ForeignObject,
    ClipPath,
    Mask,
    LinearGradient,
    Stop,
    /// Any other element found in embedded markup.
    Other(String),
}

impl SvgTag {
    pub fn as_str(&self) -> &str {
        match self {
            SvgTag::Svg => "svg",
            SvgTag::G => "g",
            SvgTag::Defs => "defs",
            SvgTag::Style => "style",
            SvgTag::Rect => "rect",
            SvgTag::Path => "path",
            SvgTag::Line => "line",
            SvgTag::Circle => "circle",
            SvgTag::Polygon => "polygon",
            SvgTag::Polyline => "polyline",
            SvgTag::Text => "text",
            SvgTag::Tspan => "tspan",
            SvgTag::Image => "image",
            SvgTag::Use => "use",
            SvgTag::ForeignObject => "foreignObject",
            SvgTag::ClipPath => "clipPath",
            SvgTag::Mask => "mask",
            SvgTag::LinearGradient => "linearGradient",
            SvgTag::Stop => "stop",
            SvgTag::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "svg" => SvgTag::Svg,
            "g" => SvgTag::G,
            "defs" => SvgTag::Defs,
            "style" => SvgTag::Style,
            "rect" => SvgTag::Rect,
            "path" => SvgTag::Path,
            "line" => SvgTag::Line,
            "circle" => SvgTag::Circle,
            "polygon" => SvgTag::Polygon,
            "polyline" => SvgTag::Polyline,
            "text" => SvgTag::Text,
            "tspan" => SvgTag::Tspan,
            "image" => SvgTag::Image,
            "use" => SvgTag::Use,
            "foreignObject" => SvgTag::ForeignObject,
            "clipPath" => SvgTag::ClipPath,
            "mask" => SvgTag::Mask,
            "linearGradient" => SvgTag::LinearGradient,
            "stop" => SvgTag::Stop,
            other => SvgTag::Other(other.to_string()),
        }
    }
}

/// Which visual concern produced a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Background,
    Border,
    Outline,
    Shadow,
    Mask,
    Backdrop,
    HitArea,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorNode {
    pub id: NodeId,
    pub tag: SvgTag,
    pub attrs: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<VectorNode>,
    /// Rounded absolute box + tag + child-index path of the source element.
    pub fingerprint: Option<String>,
    pub purpose: Option<Purpose>,
    pub bbox: Option<Rect>,
    /// Identity of the source a cloned vector icon was copied from.
    pub copy_of: Option<String>,
    /// Node lives inside an embedded `<svg>` document.
    pub nested: bool,
}

impl VectorNode {
    pub fn new(id: NodeId, tag: SvgTag) -> Self {
        Self {
            id,
            tag,
            attrs: Vec::new(),
            style: Vec::new(),
            text: None,
            children: Vec::new(),
            fingerprint: None,
            purpose: None,
            bbox: None,
            copy_of: None,
            nested: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.style.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value,
            None => self.style.push((property.to_string(), value)),
        }
    }

    pub fn push(&mut self, child: VectorNode) {
        self.children.push(child);
    }

    /// Pre-order walk, including `self`.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a VectorNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut VectorNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&VectorNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn max_id(&self) -> u32 {
        let mut max = self.id.0;
        self.walk(&mut |n| max = max.max(n.id.0));
        max
    }

    /// Text content including `tspan` children.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |n| {
            if let Some(t) = &n.text {
                out.push_str(t);
            }
        });
        out
    }
}

/// One emitted document plus the side tables built during emission.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    /// The `<svg>` element; its first child is `<defs>`.
    pub root: VectorNode,
    pub width: f32,
    pub height: f32,
    /// Back-references from emitted nodes to the source element that produced them.
    pub sources: HashMap<NodeId, ElementId>,
    /// Phase-1 text measurements keyed by emitted `<text>` node.
    pub text_runs: HashMap<NodeId, TextRun>,
}

impl VectorDocument {
    pub fn defs(&self) -> Option<&VectorNode> {
        self.root.children.iter().find(|c| c.tag == SvgTag::Defs)
    }

    pub fn defs_mut(&mut self) -> Option<&mut VectorNode> {
        self.root.children.iter_mut().find(|c| c.tag == SvgTag::Defs)
    }

    /// Looks up a definition by its `id` attribute (with or without the leading `#`).
    pub fn definition(&self, reference: &str) -> Option<&VectorNode> {
        let id = reference.trim_start_matches('#');
        self.defs()?
            .children
            .iter()
            .find(|d| d.attr("id") == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attr_replaces_in_place() {
        let mut ids = IdAllocator::default();
        let mut node = VectorNode::new(ids.next_id(), SvgTag::Path)
            .with_attr("d", "M0 0")
            .with_attr("fill", "red");
        node.set_attr("d", "M1 1");
        assert_eq!(node.attrs[0], ("d".to_string(), "M1 1".to_string()));
        assert_eq!(node.remove_attr("fill").as_deref(), Some("red"));
        assert!(node.attr("fill").is_none());
    }

    #[test]
    fn tag_names_round_trip() {
        for name in ["foreignObject", "clipPath", "g", "ellipse"] {
            assert_eq!(SvgTag::from_name(name).as_str(), name);
        }
    }

    #[test]
    fn full_text_concatenates_tspans() {
        let mut ids = IdAllocator::default();
        let mut text = VectorNode::new(ids.next_id(), SvgTag::Text);
        let mut a = VectorNode::new(ids.next_id(), SvgTag::Tspan);
        a.text = Some("Hello ".into());
        let mut b = VectorNode::new(ids.next_id(), SvgTag::Tspan);
        b.text = Some("world".into());
        text.push(a);
        text.push(b);
        assert_eq!(text.full_text(), "Hello world");
        assert_eq!(text.max_id(), 2);
    }
}
