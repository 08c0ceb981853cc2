//! Style-to-primitive classification.
//!
//! [`classify`] is a pure function of the source element, its probe and the paint of the
//! nearest painted ancestor. The walker consumes the resulting [`RenderDecision`] without
//! looking at the computed style again.

pub mod border;
pub mod content;
pub mod geometry;
pub mod mask;
pub mod shadow;

pub use border::{side_segment, BorderSide, BorderSpec, Outline};
pub use content::{content_kind, decode_svg_data_uri, ContentKind};
pub use geometry::{rounded_rect_path, BoxShape, CornerRadii};
pub use mask::{scroll_mask, GradientDirection, MaskStop, ScrollMask};
pub use shadow::{DropShadow, ShadowLayer};

use crate::css::is_transparent;
use crate::error::Result;
use crate::probe::{is_interactive, Probe, SourceElementKind};
use crate::text::{child_text_runs, input_text_run, TextRun};
use crate::types::{Rect, SourceElement};

/// Attributes copied onto the emitted group for interaction layers.
pub const ATTRIBUTE_DATA_KEYS: &[&str] = &[
    "data-command",
    "data-key",
    "data-label",
    "aria-label",
    "role",
    "title",
];

const CHROME_ONLY_ROLES: &[&str] = &["menu", "menuitem", "listbox", "option", "tooltip"];

/// Background painted by an element, inherited by descendants for de-duplication.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedBox {
    pub color: String,
    pub bbox: Rect,
    pub radii: CornerRadii,
}

/// Styles that affect how descendants are drawn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChildAffectingStyles {
    /// Set only when it is not the neutral `1`.
    pub opacity: Option<String>,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderDecision {
    pub kind: SourceElementKind,
    pub bbox: Rect,
    /// Hidden hover affordance: only a transparent hit rectangle is drawn.
    pub hit_only: bool,
    pub background: Option<String>,
    pub border: Option<BorderSpec>,
    pub outline: Option<Outline>,
    pub shadow: Option<DropShadow>,
    pub backdrop_filter: Option<String>,
    pub scroll_mask: Option<ScrollMask>,
    pub radii: CornerRadii,
    /// Interaction metadata is present, so the group needs a hit area.
    pub hit_area: bool,
    pub content: ContentKind,
    pub text: Vec<TextRun>,
    pub child_styles: ChildAffectingStyles,
    pub attribute_data: Vec<(String, String)>,
    pub clip_overflow: bool,
    /// Paint descendants compare their own background against.
    pub painted: Option<PaintedBox>,
}

impl RenderDecision {
    fn empty(kind: SourceElementKind, bbox: Rect) -> Self {
        Self {
            kind,
            bbox,
            hit_only: false,
            background: None,
            border: None,
            outline: None,
            shadow: None,
            backdrop_filter: None,
            scroll_mask: None,
            radii: CornerRadii::default(),
            hit_area: false,
            content: ContentKind::None,
            text: Vec::new(),
            child_styles: ChildAffectingStyles::default(),
            attribute_data: Vec::new(),
            clip_overflow: false,
            painted: None,
        }
    }

    /// Whether a box primitive (possibly transparent) is emitted.
    pub fn draws_box(&self) -> bool {
        self.background.is_some()
            || self.border.is_some()
            || self.shadow.is_some()
            || self.scroll_mask.is_some()
            || self.backdrop_filter.is_some()
            || self.hit_area
    }

    /// Rect when every corner and side agree, explicit path otherwise. Inset by half
    /// the visible border width so the stroke is centered on the visual edge.
    pub fn shape(&self) -> BoxShape {
        let inset = self.border.as_ref().map(|b| b.visible_width()).unwrap_or(0.0) / 2.0;
        let rect = self.bbox.inset(inset);
        let uniform_border = self.border.as_ref().map(|b| b.is_uniform()).unwrap_or(true);
        match self.radii.uniform() {
            Some(r) if uniform_border => BoxShape::Rect {
                rect,
                rx: r.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0),
            },
            _ => BoxShape::Path {
                rect,
                radii: self.radii,
            },
        }
    }
}

/// Decision for a hidden, hover-revealed interactive element.
pub fn hit_only_decision(element: &SourceElement, probe: &Probe) -> RenderDecision {
    let mut decision = RenderDecision::empty(probe.kind.clone(), probe.bbox);
    decision.hit_only = true;
    decision.hit_area = true;
    decision.attribute_data = attribute_data(element);
    decision
}

/// Decision for an element whose own styles could not be classified: nothing of its own is
/// drawn and descendants keep comparing against `parent`.
pub fn unclassified_decision(probe: &Probe, parent: Option<&PaintedBox>) -> RenderDecision {
    let mut decision = RenderDecision::empty(probe.kind.clone(), probe.bbox);
    decision.painted = parent.cloned();
    decision
}

pub fn classify(
    element: &SourceElement,
    probe: &Probe,
    parent: Option<&PaintedBox>,
) -> Result<RenderDecision> {
    let style = &element.style;
    let kind = probe.kind.clone();
    let bbox = probe.bbox;
    let mut decision = RenderDecision::empty(kind.clone(), bbox);

    let chrome_excluded = kind.is_chrome() && style.get("appearance") != "none";
    decision.radii = CornerRadii::from_style(style, &bbox);

    if !chrome_excluded {
        let background = style.get("background-color");
        if !is_transparent(background) {
            let duplicate = parent.is_some_and(|p| {
                p.color == background
                    && p.bbox.rounded() == bbox.rounded()
                    && p.radii == decision.radii
            });
            if !duplicate {
                decision.background = Some(background.to_string());
            }
        }
        decision.border = BorderSpec::from_style(style);
        decision.outline = Outline::from_style(style);
        decision.shadow = DropShadow::parse(style.get("box-shadow"));
        decision.backdrop_filter = style
            .opt("backdrop-filter")
            .filter(|v| *v != "none")
            .map(str::to_string);
        decision.scroll_mask = scroll_mask(style, &bbox);
    }

    decision.attribute_data = attribute_data(element);
    decision.hit_area = !decision.attribute_data.is_empty() || is_interactive(element);
    decision.content = content_kind(element, &kind)?;

    decision.text = match input_text_run(element, &kind) {
        Some(run) => vec![run],
        None if kind.is_value_input() || matches!(kind, SourceElementKind::TextArea) => {
            Vec::new()
        }
        None => child_text_runs(element),
    };

    let opacity = style.get("opacity");
    decision.child_styles = ChildAffectingStyles {
        opacity: (!opacity.is_empty() && opacity != "1").then(|| opacity.to_string()),
        position: style.get("position").to_string(),
    };

    let chrome_only = matches!(kind, SourceElementKind::Label | SourceElementKind::Select)
        || element
            .attr("role")
            .is_some_and(|r| CHROME_ONLY_ROLES.contains(&r));
    decision.clip_overflow = !chrome_only
        && (crate::probe::clips_overflow(element) || kind.is_editable() || kind.is_raster());

    decision.painted = match &decision.background {
        Some(color) => Some(PaintedBox {
            color: color.clone(),
            bbox,
            radii: decision.radii,
        }),
        None => parent.cloned(),
    };

    Ok(decision)
}

fn attribute_data(element: &SourceElement) -> Vec<(String, String)> {
    ATTRIBUTE_DATA_KEYS
        .iter()
        .filter_map(|key| {
            element
                .attr(key)
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{probe_element, ProbeContext};
    use crate::types::{ComputedStyle, ElementId, ElementMarkers, SourceNode, TextNode};
    use std::collections::BTreeMap;

    fn element(tag: &str, style: ComputedStyle) -> SourceElement {
        SourceElement {
            id: ElementId(1),
            tag: tag.to_string(),
            classes: vec![],
            attributes: BTreeMap::new(),
            style,
            placeholder_style: None,
            bbox: Rect::new(10.0, 10.0, 100.0, 40.0),
            client_height: None,
            client_width: None,
            check_visibility: true,
            value: None,
            children: vec![],
            markers: ElementMarkers::default(),
        }
    }

    fn red_bordered() -> ComputedStyle {
        let mut style = ComputedStyle::default()
            .with("background-color", "rgb(255, 255, 255)")
            .with("box-shadow", "rgba(0, 0, 0, 0.2) 0px 2px 4px 0px")
            .with("opacity", "1");
        for side in ["top", "right", "bottom", "left"] {
            style.set(&format!("border-{side}-width"), "1px");
            style.set(&format!("border-{side}-style"), "solid");
            style.set(&format!("border-{side}-color"), "rgb(255, 0, 0)");
        }
        for corner in ["top-left", "top-right", "bottom-right", "bottom-left"] {
            style.set(&format!("border-{corner}-radius"), "8px");
        }
        style
    }

    fn probe(el: &SourceElement) -> Probe {
        probe_element(el, &ProbeContext::new(Rect::new(0.0, 0.0, 1000.0, 1000.0)))
    }

    #[test]
    fn classification_is_idempotent() {
        let mut el = element("div", red_bordered());
        el.children.push(SourceNode::Text(TextNode {
            text: "Label".into(),
            rect: Some(Rect::new(12.0, 12.0, 30.0, 14.0)),
            first_char: Some(Rect::new(12.0, 12.0, 6.0, 14.0)),
            last_char: Some(Rect::new(36.0, 12.0, 6.0, 14.0)),
            line_count: 1,
        }));
        let p = probe(&el);
        let first = classify(&el, &p, None).unwrap();
        let second = classify(&el, &p, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text.len(), 1);
    }

    #[test]
    fn uniform_border_and_radius_make_one_rect() {
        let el = element("div", red_bordered());
        let decision = classify(&el, &probe(&el), None).unwrap();
        assert!(decision.draws_box());
        assert!(decision.shadow.is_some());
        assert!(decision.child_styles.opacity.is_none());
        match decision.shape() {
            BoxShape::Rect { rect, rx } => {
                assert_eq!(rect, Rect::new(10.5, 10.5, 99.0, 39.0));
                assert_eq!(rx, 8.0);
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn mixed_radii_use_a_path() {
        let style = red_bordered().with("border-top-left-radius", "0px");
        let el = element("div", style);
        let decision = classify(&el, &probe(&el), None).unwrap();
        assert!(matches!(decision.shape(), BoxShape::Path { .. }));
    }

    #[test]
    fn background_matching_painted_parent_is_skipped() {
        let el = element("div", red_bordered());
        let parent = PaintedBox {
            color: "rgb(255, 255, 255)".into(),
            bbox: el.bbox,
            radii: CornerRadii::from_style(&el.style, &el.bbox),
        };
        let decision = classify(&el, &probe(&el), Some(&parent)).unwrap();
        assert!(decision.background.is_none());
        assert_eq!(decision.painted, Some(parent));
    }

    #[test]
    fn chrome_elements_draw_no_box_unless_interactive() {
        let button = element("button", red_bordered());
        let decision = classify(&button, &probe(&button), None).unwrap();
        assert!(decision.background.is_none());
        assert!(decision.border.is_none());
        assert!(decision.hit_area);

        let label = element("label", red_bordered());
        let decision = classify(&label, &probe(&label), None).unwrap();
        assert!(!decision.draws_box());

        let styled = element("button", red_bordered().with("appearance", "none"));
        let decision = classify(&styled, &probe(&styled), None).unwrap();
        assert!(decision.border.is_some());
    }

    #[test]
    fn overflow_hidden_interactive_element_gets_hit_area_and_clip() {
        let mut el = element(
            "div",
            ComputedStyle::default()
                .with("overflow", "hidden")
                .with("background-color", "rgba(0, 0, 0, 0)"),
        );
        el.attributes.insert("data-command".into(), "Panel.open".into());
        let decision = classify(&el, &probe(&el), None).unwrap();
        assert!(decision.background.is_none());
        assert!(decision.hit_area);
        assert!(decision.draws_box());
        assert!(decision.clip_overflow);
        assert_eq!(
            decision.attribute_data,
            vec![("data-command".to_string(), "Panel.open".to_string())]
        );
    }

    #[test]
    fn opacity_is_a_child_affecting_style() {
        let el = element("div", ComputedStyle::default().with("opacity", "0.5"));
        let decision = classify(&el, &probe(&el), None).unwrap();
        assert_eq!(decision.child_styles.opacity.as_deref(), Some("0.5"));
    }
}
