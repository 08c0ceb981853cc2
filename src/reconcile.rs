//! Merges the dark document into the light one through CSS variables.
//!
//! Every matched pair is compared on its theme-sensitive attributes. A differing value is
//! replaced by `var(--name)` where `name` comes from the [`TableBuilder`], and the table is
//! finally rendered as a default `:root` block plus a `prefers-color-scheme: dark` block.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use crate::config::ThemeSettings;
use crate::css::is_visible_color;
use crate::matcher::MatchReport;
use crate::types::{IdAllocator, NodeId, SvgTag, VectorDocument, VectorNode};

pub const SHOW_IF_LIGHT: &str = "show-if-light";
pub const SHOW_IF_DARK: &str = "show-if-dark";

const NEUTRAL_OPACITY: &str = "1";
const NO_FILTER: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarCategory {
    Color,
    Opacity,
    Shadow,
    Font,
}

impl VarCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            VarCategory::Color => "color",
            VarCategory::Opacity => "opacity",
            VarCategory::Shadow => "shadow",
            VarCategory::Font => "font",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let prefix = name.split('-').next()?;
        [
            VarCategory::Color,
            VarCategory::Opacity,
            VarCategory::Shadow,
            VarCategory::Font,
        ]
        .into_iter()
        .find(|c| c.prefix() == prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVariable {
    pub category: VarCategory,
    /// Name without the leading `--`.
    pub name: String,
    pub light: String,
    pub dark: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeVariableTable {
    pub variables: Vec<ThemeVariable>,
}

impl ThemeVariableTable {
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ThemeVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Default block: flags for the light theme and every variable at its light value.
    pub fn root_block(&self) -> String {
        let mut css = format!(":root {{ --{SHOW_IF_LIGHT}: 1; --{SHOW_IF_DARK}: 0;");
        for var in &self.variables {
            css.push_str(&format!(" --{}: {};", var.name, var.light));
        }
        css.push_str(" }");
        css
    }

    pub fn dark_block(&self) -> String {
        let mut css = format!(
            "@media (prefers-color-scheme: dark) {{ :root {{ --{SHOW_IF_LIGHT}: 0; --{SHOW_IF_DARK}: 1;"
        );
        for var in &self.variables {
            css.push_str(&format!(" --{}: {};", var.name, var.dark));
        }
        css.push_str(" } }");
        css
    }

    pub fn style_sheet(&self) -> String {
        format!("{}\n{}", self.root_block(), self.dark_block())
    }

    /// Reads back a sheet produced by [`style_sheet`](Self::style_sheet).
    pub fn parse_style_sheet(css: &str) -> Option<Self> {
        let media = css.find("@media")?;
        let light = declarations(block_body(&css[..media])?);
        let dark: HashMap<String, String> = declarations(block_body(&css[media..])?)
            .into_iter()
            .collect();
        let variables = light
            .into_iter()
            .filter(|(name, _)| name != SHOW_IF_LIGHT && name != SHOW_IF_DARK)
            .filter_map(|(name, light)| {
                Some(ThemeVariable {
                    category: VarCategory::from_name(&name)?,
                    dark: dark.get(&name)?.clone(),
                    name,
                    light,
                })
            })
            .collect();
        Some(Self { variables })
    }
}

/// Body of the innermost `:root { ... }` block.
fn block_body(css: &str) -> Option<&str> {
    let start = css.find(":root")?;
    let open = css[start..].find('{')? + start + 1;
    let close = css[open..].find('}')? + open;
    Some(&css[open..close])
}

fn declarations(body: &str) -> Vec<(String, String)> {
    body.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().strip_prefix("--")?;
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Hands out one variable name per (category, light, dark).
#[derive(Debug)]
pub struct TableBuilder {
    max_name_len: usize,
    variables: Vec<ThemeVariable>,
    by_key: HashMap<(VarCategory, String, String), usize>,
    names: HashSet<String>,
}

impl TableBuilder {
    pub fn new(settings: &ThemeSettings) -> Self {
        Self {
            max_name_len: settings.max_variable_name_len,
            variables: Vec::new(),
            by_key: HashMap::new(),
            names: HashSet::new(),
        }
    }

    /// `var(--name)` for the pair, creating the entry on first use.
    pub fn reference(&mut self, category: VarCategory, light: &str, dark: &str) -> String {
        format!("var(--{})", self.variable(category, light, dark))
    }

    pub fn variable(&mut self, category: VarCategory, light: &str, dark: &str) -> String {
        let key = (category, light.to_string(), dark.to_string());
        if let Some(&index) = self.by_key.get(&key) {
            return self.variables[index].name.clone();
        }

        let base = self.base_name(category, light, dark);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{base}-{suffix}");
            suffix += 1;
        }

        self.names.insert(name.clone());
        self.by_key.insert(key, self.variables.len());
        self.variables.push(ThemeVariable {
            category,
            name: name.clone(),
            light: light.to_string(),
            dark: dark.to_string(),
        });
        name
    }

    fn base_name(&self, category: VarCategory, light: &str, dark: &str) -> String {
        let prefix = category.prefix();
        let readable = format!("{prefix}-{}--{}", sanitize(light), sanitize(dark));
        if readable.len() <= self.max_name_len {
            return readable;
        }
        let digest = Sha256::digest(format!("{light}\u{0}{dark}").as_bytes());
        format!("{prefix}-{}", hex::encode(&digest[..4]))
    }

    pub fn finish(self) -> ThemeVariableTable {
        ThemeVariableTable {
            variables: self.variables,
        }
    }
}

/// Lowercase alphanumerics separated by single dashes.
fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if c == '.' {
            out.push('_');
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[derive(Debug, Clone)]
pub struct ReconciledDocument {
    /// The light document carrying variable references and the style sheet.
    pub document: VectorDocument,
    pub table: ThemeVariableTable,
    /// `use` nodes that got a dark sibling.
    pub toggled_bitmaps: usize,
}

/// Rewrites the theme-sensitive attributes of `light` against their dark counterparts.
pub fn reconcile_pair(
    light: &mut VectorNode,
    dark: &VectorNode,
    table: &mut TableBuilder,
    settings: &ThemeSettings,
) {
    for attr in ["fill", "stroke"] {
        let Some(value) = light.attr(attr).filter(|v| is_visible_color(v)) else {
            continue;
        };
        let dark_value = dark.attr(attr).unwrap_or(value);
        if dark_value != value {
            let reference = table.reference(VarCategory::Color, value, dark_value);
            light.set_attr(attr, reference);
        }
    }

    let opacity = light.attr("opacity").unwrap_or(NEUTRAL_OPACITY);
    let dark_opacity = dark.attr("opacity").unwrap_or(NEUTRAL_OPACITY);
    if opacity != dark_opacity {
        let reference = table.reference(VarCategory::Opacity, opacity, dark_opacity);
        light.set_attr("opacity", reference);
    }

    let filter = light.style_value("filter").unwrap_or(NO_FILTER);
    let dark_filter = dark.style_value("filter").unwrap_or(NO_FILTER);
    if filter != dark_filter {
        let reference = table.reference(VarCategory::Shadow, filter, dark_filter);
        light.set_style("filter", reference);
    }

    if light.tag == SvgTag::Text {
        if let Some(family) = light
            .attr("font-family")
            .filter(|f| f.len() > settings.font_family_min_len)
        {
            let dark_family = dark.attr("font-family").unwrap_or(family);
            if dark_family != family {
                let reference = table.reference(VarCategory::Font, family, dark_family);
                light.set_attr("font-family", reference);
            }
        }
    }

    if let Some(color) = light.style_value("color").filter(|c| is_visible_color(c)) {
        let dark_color = dark.style_value("color").unwrap_or(color);
        if dark_color != color {
            let reference = table.reference(VarCategory::Color, color, dark_color);
            light.set_style("color", reference);
        }
    }
}

/// A light `use` whose bitmap differs in the dark document.
struct BitmapToggle {
    light_use: NodeId,
    dark_image: VectorNode,
}

fn bitmap_toggles(
    light: &VectorDocument,
    dark: &VectorDocument,
    dark_nodes: &HashMap<NodeId, &VectorNode>,
    pairs: &HashMap<NodeId, NodeId>,
) -> Vec<BitmapToggle> {
    let mut toggles = Vec::new();
    light.root.walk(&mut |node| {
        if node.tag != SvgTag::Use || node.nested {
            return;
        }
        let Some(dark_use) = pairs.get(&node.id).and_then(|id| dark_nodes.get(id)) else {
            return;
        };
        let (Some(href), Some(dark_href)) = (node.attr("href"), dark_use.attr("href")) else {
            return;
        };
        let (Some(light_image), Some(dark_image)) =
            (light.definition(href), dark.definition(dark_href))
        else {
            return;
        };
        if light_image.attr("href") != dark_image.attr("href") {
            toggles.push(BitmapToggle {
                light_use: node.id,
                dark_image: dark_image.clone(),
            });
        }
    });
    toggles
}

fn dark_clone_id(image: &VectorNode) -> String {
    format!("{}-dark", image.attr("id").unwrap_or("raster"))
}

fn insert_dark_siblings(
    node: &mut VectorNode,
    toggles: &HashMap<NodeId, String>,
    ids: &mut IdAllocator,
) {
    let children = std::mem::take(&mut node.children);
    for mut child in children {
        insert_dark_siblings(&mut child, toggles, ids);
        let sibling = toggles.get(&child.id).map(|dark_id| {
            let mut sibling = child.clone();
            sibling.id = ids.next_id();
            sibling.set_attr("href", format!("#{dark_id}"));
            sibling.set_attr("opacity", format!("var(--{SHOW_IF_DARK})"));
            sibling
        });
        if sibling.is_some() {
            child.set_attr("opacity", format!("var(--{SHOW_IF_LIGHT})"));
        }
        node.children.push(child);
        node.children.extend(sibling);
    }
}

/// Produces the merged theme-aware document.
pub fn reconcile(
    mut light: VectorDocument,
    dark: &VectorDocument,
    report: &MatchReport,
    settings: &ThemeSettings,
) -> ReconciledDocument {
    let mut dark_nodes: HashMap<NodeId, &VectorNode> = HashMap::new();
    dark.root.walk(&mut |n| {
        dark_nodes.insert(n.id, n);
    });
    let pairs = report.dark_for();
    let toggles = bitmap_toggles(&light, dark, &dark_nodes, &pairs);

    let mut table = TableBuilder::new(settings);
    light.root.walk_mut(&mut |node| {
        if node.tag == SvgTag::Use || node.nested {
            return;
        }
        if let Some(dark_node) = pairs.get(&node.id).and_then(|id| dark_nodes.get(id)) {
            reconcile_pair(node, dark_node, &mut table, settings);
        }
    });

    let mut ids = IdAllocator::starting_at(light.root.max_id() + 1);
    let mut sibling_targets = HashMap::new();
    let mut cloned = HashSet::new();
    for toggle in &toggles {
        let clone_id = dark_clone_id(&toggle.dark_image);
        sibling_targets.insert(toggle.light_use, clone_id.clone());
        if cloned.insert(clone_id.clone()) {
            let mut image = toggle.dark_image.clone();
            image.id = ids.next_id();
            image.set_attr("id", clone_id);
            if let Some(defs) = light.defs_mut() {
                defs.push(image);
            }
        }
    }
    insert_dark_siblings(&mut light.root, &sibling_targets, &mut ids);

    let table = table.finish();
    let mut style = VectorNode::new(ids.next_id(), SvgTag::Style);
    style.text = Some(table.style_sheet());
    let position = light
        .root
        .children
        .iter()
        .position(|c| c.tag == SvgTag::Defs)
        .map(|i| i + 1)
        .unwrap_or(0);
    light.root.children.insert(position, style);

    log::debug!(
        "reconciled {} theme variables, {} bitmap toggles",
        table.len(),
        toggles.len()
    );
    ReconciledDocument {
        document: light,
        table,
        toggled_bitmaps: toggles.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_documents;
    use crate::types::Rect;

    fn settings() -> ThemeSettings {
        ThemeSettings::default()
    }

    #[test]
    fn same_pair_reuses_one_variable() {
        let mut table = TableBuilder::new(&settings());
        let a = table.variable(VarCategory::Color, "rgb(255, 0, 0)", "rgb(0, 0, 255)");
        let b = table.variable(VarCategory::Color, "rgb(255, 0, 0)", "rgb(0, 0, 255)");
        assert_eq!(a, b);
        assert_eq!(a, "color-rgb-255-0-0--rgb-0-0-255");
        let opacity = table.variable(VarCategory::Opacity, "0.5", "1");
        assert_eq!(opacity, "opacity-0_5--1");
        assert_eq!(table.finish().len(), 2);
    }

    #[test]
    fn long_names_fall_back_to_a_digest_and_collisions_get_suffixes() {
        let mut table = TableBuilder::new(&settings());
        let light = "drop-shadow(rgba(0, 0, 0, 0.1) 0px 4px 3px) drop-shadow(rgba(0, 0, 0, 0.1) 0px 2px 2px)";
        let name = table.variable(VarCategory::Shadow, light, "none");
        assert!(name.starts_with("shadow-"));
        assert_eq!(name.len(), "shadow-".len() + 8);

        let first = table.variable(VarCategory::Color, "a b", "c");
        let second = table.variable(VarCategory::Color, "a-b", "c");
        assert_eq!(first, "color-a-b--c");
        assert_eq!(second, "color-a-b--c-2");
    }

    #[test]
    fn style_sheet_round_trips() {
        let mut builder = TableBuilder::new(&settings());
        builder.variable(VarCategory::Color, "rgb(255, 0, 0)", "rgb(0, 0, 255)");
        builder.variable(VarCategory::Font, "\"Inter Variable\", sans-serif", "Inter");
        let table = builder.finish();
        let css = table.style_sheet();
        assert!(css.starts_with(":root { --show-if-light: 1; --show-if-dark: 0;"));
        assert!(css.contains("@media (prefers-color-scheme: dark) { :root { --show-if-light: 0; --show-if-dark: 1;"));
        assert_eq!(ThemeVariableTable::parse_style_sheet(&css), Some(table));
    }

    fn doc(children: Vec<VectorNode>, defs: Vec<VectorNode>, ids: &mut IdAllocator) -> VectorDocument {
        let mut root = VectorNode::new(ids.next_id(), SvgTag::Svg);
        let mut d = VectorNode::new(ids.next_id(), SvgTag::Defs);
        d.children = defs;
        root.push(d);
        let mut g = VectorNode::new(ids.next_id(), SvgTag::G);
        g.fingerprint = Some("g".into());
        g.bbox = Some(Rect::new(0.0, 0.0, 100.0, 100.0));
        g.children = children;
        root.push(g);
        VectorDocument {
            root,
            width: 100.0,
            height: 100.0,
            sources: HashMap::new(),
            text_runs: HashMap::new(),
        }
    }

    fn rect(ids: &mut IdAllocator, fill: &str, stroke: &str) -> VectorNode {
        let mut n = VectorNode::new(ids.next_id(), SvgTag::Rect)
            .with_attr("fill", fill)
            .with_attr("stroke", stroke);
        n.fingerprint = Some("r".into());
        n.bbox = Some(Rect::new(0.0, 0.0, 10.0, 10.0));
        n
    }

    #[test]
    fn differing_stroke_becomes_one_variable() {
        let mut ids = IdAllocator::default();
        let light = doc(vec![rect(&mut ids, "transparent", "red")], vec![], &mut ids);
        let dark = doc(vec![rect(&mut ids, "transparent", "blue")], vec![], &mut ids);
        let report = match_documents(&light.root, &dark.root).unwrap();
        let merged = reconcile(light, &dark, &report, &settings());
        assert_eq!(merged.table.len(), 1);
        let var = &merged.table.variables[0];
        assert_eq!((var.light.as_str(), var.dark.as_str()), ("red", "blue"));
        let rect = &merged.document.root.children[2].children[0];
        assert_eq!(rect.attr("stroke"), Some("var(--color-red--blue)"));
        assert_eq!(rect.attr("fill"), Some("transparent"));
        assert_eq!(merged.document.root.children[1].tag, SvgTag::Style);
    }

    #[test]
    fn differing_bitmaps_get_toggled_siblings() {
        let mut ids = IdAllocator::default();
        let image = |ids: &mut IdAllocator, id: &str, data: &str| {
            VectorNode::new(ids.next_id(), SvgTag::Image)
                .with_attr("id", id)
                .with_attr("href", data)
        };
        let use_node = |ids: &mut IdAllocator, href: &str| {
            let mut n = VectorNode::new(ids.next_id(), SvgTag::Use).with_attr("href", href);
            n.copy_of = Some("canvas:0-1".into());
            n.fingerprint = Some("c".into());
            n
        };
        let light_image = image(&mut ids, "raster-aaa", "data:image/png;base64,AAAA");
        let light_use = use_node(&mut ids, "#raster-aaa");
        let light = doc(vec![light_use], vec![light_image], &mut ids);
        let dark_image = image(&mut ids, "raster-bbb", "data:image/png;base64,BBBB");
        let dark_use = use_node(&mut ids, "#raster-bbb");
        let dark = doc(vec![dark_use], vec![dark_image], &mut ids);

        let report = match_documents(&light.root, &dark.root).unwrap();
        let merged = reconcile(light, &dark, &report, &settings());
        assert_eq!(merged.toggled_bitmaps, 1);
        let doc = &merged.document;
        assert!(doc.definition("raster-bbb-dark").is_some());
        let group = &doc.root.children[2];
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[0].attr("opacity"), Some("var(--show-if-light)"));
        assert_eq!(group.children[1].attr("href"), Some("#raster-bbb-dark"));
        assert_eq!(group.children[1].attr("opacity"), Some("var(--show-if-dark)"));
        assert_ne!(group.children[0].id, group.children[1].id);
    }

    #[test]
    fn neutral_and_equal_values_produce_no_variables() {
        let mut ids = IdAllocator::default();
        let mut text = VectorNode::new(ids.next_id(), SvgTag::Text)
            .with_attr("fill", "currentColor")
            .with_attr("font-family", "Inter");
        text.set_style("filter", "drop-shadow(0px 1px 1px black)");
        let mut dark = text.clone();
        dark.set_attr("font-family", "Roboto");
        let mut table = TableBuilder::new(&settings());
        reconcile_pair(&mut text, &dark, &mut table, &settings());
        assert!(table.finish().is_empty());
        assert_eq!(text.attr("fill"), Some("currentColor"));
    }

    #[test]
    fn opacity_and_long_font_families_are_themed() {
        let mut ids = IdAllocator::default();
        let mut light = VectorNode::new(ids.next_id(), SvgTag::Text)
            .with_attr("font-family", "\"Inter Variable\", sans-serif");
        let dark = VectorNode::new(ids.next_id(), SvgTag::Text)
            .with_attr("font-family", "\"JetBrains Mono\", monospace")
            .with_attr("opacity", "0.6");
        let mut table = TableBuilder::new(&settings());
        reconcile_pair(&mut light, &dark, &mut table, &settings());
        let table = table.finish();
        assert_eq!(table.len(), 2);
        assert_eq!(light.attr("opacity"), Some("var(--opacity-1--0_6)"));
        assert!(light.attr("font-family").unwrap().starts_with("var(--font-"));
    }
}
