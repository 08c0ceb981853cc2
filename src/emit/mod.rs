//! Tree walker and SVG emitter.
//!
//! [`emit_document`] walks a [`SourceSnapshot`] depth-first: every element is probed,
//! classified and turned into a `<g>` holding its primitives, its content, its text runs and
//! its children in ascending z-index order. A failure inside one element is logged and leaves
//! that element's own render empty while its children are still walked; measurement failures
//! and invariant violations abort the walk.

pub mod clip;
pub mod markup;
pub mod primitives;
pub mod raster;
pub mod writer;

pub use markup::{parse_inline_style, parse_svg_markup};
pub use writer::{to_svg_string, SVG_NAMESPACE};

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};

use crate::classify::{
    classify, decode_svg_data_uri, hit_only_decision, unclassified_decision, ContentKind,
    PaintedBox, RenderDecision,
};
use crate::css::{fmt_num, parse_int};
use crate::error::Result;
use crate::icons::{resolve_icon_url, IconFetcher};
use crate::probe::{ensure_measurable, probe_element, Probe, ProbeContext, SourceElementKind};
use crate::text::TextRun;
use crate::types::{
    ElementId, IconGlyph, IdAllocator, ImageSource, NodeId, Rect, SourceElement, SourceSnapshot,
    SvgTag, VectorDocument, VectorNode,
};

use clip::{clip_path_def, clip_reference};
use primitives::{box_primitives, hit_rect, scroll_mask_def, text_node};
use raster::{pixel_data_url, raster_def, raster_id, raster_use, replay_shapes};

/// Stable identity of a source element across both theme captures.
pub fn fingerprint(bbox: &Rect, tag: &str, path: &[u32]) -> String {
    let r = bbox.rounded();
    format!(
        "{}-{}-{}-{}__{}{}",
        fmt_num(r.x),
        fmt_num(r.y),
        fmt_num(r.width),
        fmt_num(r.height),
        tag.to_ascii_uppercase(),
        path_key(path)
    )
}

fn path_key(path: &[u32]) -> String {
    path.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

/// Converts one snapshot into a standalone vector document.
pub async fn emit_document(
    snapshot: &SourceSnapshot,
    icons: &dyn IconFetcher,
) -> Result<VectorDocument> {
    ensure_measurable(snapshot)?;
    let mut emitter = Emitter::new(snapshot, icons);
    let viewport = ProbeContext::new(snapshot.viewport.as_rect());
    let body = emitter
        .emit_element(&snapshot.root, viewport, None, snapshot.root_path.clone(), true)
        .await?;
    Ok(emitter.finish(body))
}

struct Emitter<'a> {
    snapshot: &'a SourceSnapshot,
    icons: &'a dyn IconFetcher,
    ids: IdAllocator,
    defs: Vec<VectorNode>,
    rasters: HashSet<String>,
    keyframes: Vec<String>,
    sources: HashMap<NodeId, ElementId>,
    text_runs: HashMap<NodeId, TextRun>,
}

impl<'a> Emitter<'a> {
    fn new(snapshot: &'a SourceSnapshot, icons: &'a dyn IconFetcher) -> Self {
        Self {
            snapshot,
            icons,
            ids: IdAllocator::default(),
            defs: Vec::new(),
            rasters: HashSet::new(),
            keyframes: Vec::new(),
            sources: HashMap::new(),
            text_runs: HashMap::new(),
        }
    }

    fn finish(mut self, body: Option<VectorNode>) -> VectorDocument {
        let bbox = self.snapshot.root.bbox;
        let mut root = VectorNode::new(self.ids.next_id(), SvgTag::Svg)
            .with_attr("xmlns", SVG_NAMESPACE)
            .with_attr("width", fmt_num(bbox.width))
            .with_attr("height", fmt_num(bbox.height))
            .with_attr(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    fmt_num(bbox.x),
                    fmt_num(bbox.y),
                    fmt_num(bbox.width),
                    fmt_num(bbox.height)
                ),
            );

        let mut defs = VectorNode::new(self.ids.next_id(), SvgTag::Defs);
        defs.children = std::mem::take(&mut self.defs);
        if !self.keyframes.is_empty() {
            let mut style = VectorNode::new(self.ids.next_id(), SvgTag::Style);
            style.text = Some(self.keyframes.join("\n"));
            defs.push(style);
        }
        root.push(defs);
        if let Some(body) = body {
            root.push(body);
        }

        VectorDocument {
            root,
            width: bbox.width,
            height: bbox.height,
            sources: self.sources,
            text_runs: self.text_runs,
        }
    }

    fn emit_element<'b>(
        &'b mut self,
        element: &'b SourceElement,
        ctx: ProbeContext,
        parent: Option<PaintedBox>,
        path: Vec<u32>,
        is_root: bool,
    ) -> LocalBoxFuture<'b, Result<Option<VectorNode>>> {
        async move {
            let mut probe = probe_element(element, &ctx);
            if is_root {
                // the requested root is always drawn, even when scrolled out of view
                probe.visible = true;
                probe.might_be_hovered = false;
            }
            if !probe.visible && !probe.might_be_hovered {
                return Ok(None);
            }

            let fp = fingerprint(&element.bbox, &element.tag, &path);
            if probe.might_be_hovered {
                return Ok(Some(self.hit_only_group(element, &probe, &fp)));
            }

            let (decision, classified) = match classify(element, &probe, parent.as_ref()) {
                Ok(decision) => (decision, true),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    log::warn!("drawing nothing for <{}> at {fp}: {err}", element.tag);
                    (unclassified_decision(&probe, parent.as_ref()), false)
                }
            };
            let mut group = self.group_for(element, &decision, &fp);

            if let Some(mask) = &decision.scroll_mask {
                let id = format!("mask-{}", self.ids.next_serial());
                let def = scroll_mask_def(mask, &decision.bbox, &id, &mut self.ids);
                self.defs.push(def);
                group.set_attr("mask", clip_reference(&id));
            }

            if classified {
                match self.own_render(element, &decision, &path).await {
                    Ok(nodes) => {
                        for node in nodes {
                            self.attach(&mut group, node, element, &fp);
                        }
                    }
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        log::warn!("drawing nothing for <{}> at {fp}: {err}", element.tag);
                    }
                }
            }

            let child_ctx = ctx.descend(element);
            let mut children: Vec<(u32, &SourceElement)> = element
                .element_children()
                .enumerate()
                .map(|(i, child)| (i as u32, child))
                .collect();
            children.sort_by_key(|(_, child)| parse_int(child.style.get("z-index")).unwrap_or(0));

            for (index, child) in children {
                let mut child_path = path.clone();
                child_path.push(index);
                match self
                    .emit_element(child, child_ctx, decision.painted.clone(), child_path, false)
                    .await
                {
                    Ok(Some(node)) => group.push(node),
                    Ok(None) => {}
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        log::warn!("skipping <{}> inside {fp}: {err}", child.tag);
                    }
                }
            }

            if group.children.is_empty() {
                return Ok(None);
            }
            if decision.clip_overflow {
                let id = format!("clip-{}", self.ids.next_serial());
                let def = clip_path_def(&id, &decision.bbox, &decision.radii, &mut self.ids);
                self.defs.push(def);
                group.set_attr("clip-path", clip_reference(&id));
            }
            Ok(Some(group))
        }
        .boxed_local()
    }

    fn group_for(&mut self, element: &SourceElement, decision: &RenderDecision, fp: &str) -> VectorNode {
        let mut group = VectorNode::new(self.ids.next_id(), SvgTag::G);
        group.fingerprint = Some(fp.to_string());
        group.bbox = Some(decision.bbox);
        if let Some(opacity) = &decision.child_styles.opacity {
            group.set_attr("opacity", opacity.as_str());
        }
        for (key, value) in &decision.attribute_data {
            group.set_attr(key, value.as_str());
        }
        self.sources.insert(group.id, element.id);
        group
    }

    fn hit_only_group(&mut self, element: &SourceElement, probe: &Probe, fp: &str) -> VectorNode {
        let decision = hit_only_decision(element, probe);
        let mut group = self.group_for(element, &decision, fp);
        let rect = hit_rect(&decision.bbox, &mut self.ids);
        self.attach(&mut group, rect, element, fp);
        group
    }

    fn attach(&mut self, group: &mut VectorNode, mut node: VectorNode, element: &SourceElement, fp: &str) {
        stamp_fingerprint(&mut node, fp);
        self.sources.insert(node.id, element.id);
        group.push(node);
    }

    /// The element's own primitives, content and text, in paint order.
    async fn own_render(
        &mut self,
        element: &SourceElement,
        decision: &RenderDecision,
        path: &[u32],
    ) -> Result<Vec<VectorNode>> {
        let mut nodes = box_primitives(decision, &mut self.ids);
        if let Some(node) = self.emit_content(element, decision, path).await? {
            nodes.push(node);
        }
        if matches!(decision.kind, SourceElementKind::Canvas) {
            if let Some(node) = self.emit_canvas(element, &decision.bbox, path) {
                nodes.push(node);
            }
        }
        for run in &decision.text {
            let node = text_node(run, &mut self.ids);
            self.text_runs.insert(node.id, run.clone());
            nodes.push(node);
        }
        Ok(nodes)
    }

    async fn emit_content(
        &mut self,
        element: &SourceElement,
        decision: &RenderDecision,
        path: &[u32],
    ) -> Result<Option<VectorNode>> {
        let bbox = decision.bbox;
        let color = element.style.get("color");
        match &decision.content {
            ContentKind::None => Ok(None),
            ContentKind::SvgClone {
                markup,
                width,
                height,
            } => {
                let mut svg = parse_svg_markup(markup, &mut self.ids)?;
                svg.set_attr("width", fmt_num(*width));
                svg.set_attr("height", fmt_num(*height));
                let mut wrapper = self.copy_wrapper("svg", path, color);
                wrapper.set_style(
                    "transform",
                    format!("translate({}px, {}px)", fmt_num(bbox.x), fmt_num(bbox.y)),
                );
                wrapper.push(svg);
                Ok(Some(wrapper))
            }
            ContentKind::ExternalIcon { src } => {
                let Some(markup) = self.icon_markup(src).await else {
                    return Ok(None);
                };
                let mut svg = match parse_svg_markup(&markup, &mut self.ids) {
                    Ok(svg) => svg,
                    Err(err) => {
                        log::warn!("ignoring icon {src}: {err}");
                        return Ok(None);
                    }
                };
                place(&mut svg, &bbox);
                let mut wrapper = self.copy_wrapper("icon", path, color);
                wrapper.push(svg);
                Ok(Some(wrapper))
            }
            ContentKind::IconGlyph(glyph) => Ok(Some(self.glyph_node(element, glyph, &bbox))),
            ContentKind::Bitmap(source) => Ok(Some(self.bitmap_node(element, source, &bbox))),
            ContentKind::MaskImage {
                markup,
                color,
                animation,
            } => {
                let mut svg = parse_svg_markup(markup, &mut self.ids)?;
                place(&mut svg, &bbox);
                svg.set_attr("fill", "currentColor");
                if let Some(animation) = animation {
                    svg.set_style("animation", animation.as_str());
                    svg.set_style(
                        "transform-origin",
                        format!(
                            "{}px {}px",
                            fmt_num(bbox.x + bbox.width / 2.0),
                            fmt_num(bbox.y + bbox.height / 2.0)
                        ),
                    );
                    for rule in &element.markers.keyframes {
                        if !self.keyframes.contains(rule) {
                            self.keyframes.push(rule.clone());
                        }
                    }
                }
                let mut wrapper = self.copy_wrapper("mask", path, color);
                wrapper.push(svg);
                Ok(Some(wrapper))
            }
        }
    }

    fn copy_wrapper(&mut self, kind: &str, path: &[u32], color: &str) -> VectorNode {
        let mut wrapper = VectorNode::new(self.ids.next_id(), SvgTag::G);
        wrapper.copy_of = Some(format!("{kind}:{}", path_key(path)));
        if !color.is_empty() {
            wrapper.set_style("color", color);
        }
        wrapper
    }

    async fn icon_markup(&self, src: &str) -> Option<String> {
        if src.starts_with("data:") {
            return decode_svg_data_uri(src)
                .map_err(|err| log::warn!("ignoring inline icon: {err}"))
                .ok();
        }
        let url = match resolve_icon_url(src, self.snapshot.url.as_deref()) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("ignoring icon {src}: {err}");
                return None;
            }
        };
        self.icons.fetch(&url).await
    }

    fn glyph_node(&mut self, element: &SourceElement, glyph: &IconGlyph, bbox: &Rect) -> VectorNode {
        if let Some(data_url) = &glyph.data_url {
            let mut image = VectorNode::new(self.ids.next_id(), SvgTag::Image).with_attr("href", data_url.as_str());
            place(&mut image, bbox);
            return image;
        }
        let mut text = VectorNode::new(self.ids.next_id(), SvgTag::Text)
            .with_attr("x", fmt_num(bbox.x + bbox.width / 2.0))
            .with_attr("y", fmt_num(bbox.y + bbox.height / 2.0))
            .with_attr("fill", element.style.get("color"))
            .with_attr("font-family", glyph.font_family.as_str())
            .with_attr("font-size", element.style.get("font-size"))
            .with_attr("text-anchor", "middle")
            .with_attr("dominant-baseline", "central");
        text.text = Some(glyph.glyph.clone());
        text.bbox = Some(*bbox);
        text
    }

    fn bitmap_node(&mut self, element: &SourceElement, source: &ImageSource, bbox: &Rect) -> VectorNode {
        let href = match &source.data_url {
            Some(data_url) => data_url.clone(),
            None => resolve_icon_url(&source.src, self.snapshot.url.as_deref())
                .unwrap_or_else(|_| source.src.clone()),
        };
        let aspect = match element.style.get("object-fit") {
            "cover" => "xMidYMid slice",
            "contain" | "scale-down" => "xMidYMid meet",
            "none" => "xMidYMid",
            _ => "none",
        };
        let mut image = VectorNode::new(self.ids.next_id(), SvgTag::Image)
            .with_attr("href", href)
            .with_attr("preserveAspectRatio", aspect);
        place(&mut image, bbox);
        image
    }

    fn emit_canvas(&mut self, element: &SourceElement, bbox: &Rect, path: &[u32]) -> Option<VectorNode> {
        let markers = &element.markers;
        if let Some(drawn) = markers.drawn.as_ref().filter(|d| !d.shapes.is_empty()) {
            return Some(replay_shapes(drawn, bbox, &mut self.ids));
        }
        let pixels = markers.pixels.as_ref()?;
        let data_url = match pixel_data_url(pixels) {
            Ok(url) => url?,
            Err(err) => {
                log::warn!("dropping canvas snapshot at {}: {err}", path_key(path));
                return None;
            }
        };
        let id = raster_id(&data_url);
        if self.rasters.insert(id.clone()) {
            let def = raster_def(&id, &data_url, pixels, &mut self.ids);
            self.defs.push(def);
        }
        let mut node = raster_use(&id, bbox, pixels, &mut self.ids);
        node.copy_of = Some(format!("canvas:{}", path_key(path)));
        Some(node)
    }
}

/// Gives `node` and its descendants the owning element's fingerprint, stopping at nested
/// documents.
fn stamp_fingerprint(node: &mut VectorNode, fp: &str) {
    if node.nested {
        return;
    }
    if node.fingerprint.is_none() {
        node.fingerprint = Some(fp.to_string());
    }
    for child in &mut node.children {
        stamp_fingerprint(child, fp);
    }
}

fn place(node: &mut VectorNode, bbox: &Rect) {
    node.set_attr("x", fmt_num(bbox.x));
    node.set_attr("y", fmt_num(bbox.y));
    node.set_attr("width", fmt_num(bbox.width));
    node.set_attr("height", fmt_num(bbox.height));
    node.bbox = Some(*bbox);
}
