//! Box, text and mask primitives for one classified element.

use crate::classify::{
    rounded_rect_path, side_segment, BorderSpec, BoxShape, RenderDecision, ScrollMask,
};
use crate::css::fmt_num;
use crate::text::TextRun;
use crate::types::{IdAllocator, Purpose, Rect, SvgTag, VectorNode};

pub const TRANSPARENT: &str = "transparent";

/// Baseline correction applied to every emitted run.
const BASELINE_NUDGE: f32 = 2.0;

/// `rect` or `path` node for a box shape, without paint.
pub fn shape_node(shape: &BoxShape, ids: &mut IdAllocator) -> VectorNode {
    match shape {
        BoxShape::Rect { rect, rx } => {
            let mut node = rect_node(rect, ids);
            if *rx > 0.0 {
                node.set_attr("rx", fmt_num(*rx));
            }
            node
        }
        BoxShape::Path { rect, radii } => {
            VectorNode::new(ids.next_id(), SvgTag::Path).with_attr("d", rounded_rect_path(rect, radii))
        }
    }
}

fn rect_node(rect: &Rect, ids: &mut IdAllocator) -> VectorNode {
    VectorNode::new(ids.next_id(), SvgTag::Rect)
        .with_attr("x", fmt_num(rect.x))
        .with_attr("y", fmt_num(rect.y))
        .with_attr("width", fmt_num(rect.width.max(0.0)))
        .with_attr("height", fmt_num(rect.height.max(0.0)))
}

/// Transparent rectangle covering `bbox`, so the group has a hit area.
pub fn hit_rect(bbox: &Rect, ids: &mut IdAllocator) -> VectorNode {
    let mut node = rect_node(bbox, ids).with_attr("fill", TRANSPARENT);
    node.purpose = Some(Purpose::HitArea);
    node.bbox = Some(*bbox);
    node
}

/// Background, border and outline primitives in paint order.
pub fn box_primitives(decision: &RenderDecision, ids: &mut IdAllocator) -> Vec<VectorNode> {
    let mut out = Vec::new();
    if !decision.draws_box() && decision.outline.is_none() {
        return out;
    }

    let shape = decision.shape();
    if decision.draws_box() {
        let mut node = shape_node(&shape, ids);
        node.set_attr(
            "fill",
            decision.background.as_deref().unwrap_or(TRANSPARENT),
        );
        node.purpose = Some(if decision.background.is_some() {
            Purpose::Background
        } else if decision.border.is_some() {
            Purpose::Border
        } else if decision.shadow.is_some() {
            Purpose::Shadow
        } else {
            Purpose::HitArea
        });
        if let Some(BorderSpec::Uniform(side)) = &decision.border {
            node.set_attr("stroke", side.color.as_str());
            node.set_attr("stroke-width", fmt_num(side.width));
            if let Some(dash) = side.dash_array() {
                node.set_attr("stroke-dasharray", dash);
            }
        }
        if let Some(shadow) = &decision.shadow {
            node.set_style("filter", shadow.filter());
        }
        if let Some(backdrop) = &decision.backdrop_filter {
            node.set_style("backdrop-filter", backdrop.as_str());
        }
        node.bbox = Some(decision.bbox);
        out.push(node);
    }

    if let Some(BorderSpec::PerSide(sides)) = &decision.border {
        for (index, side) in sides.iter().enumerate() {
            let Some(side) = side else { continue };
            let (x1, y1, x2, y2) = side_segment(&decision.bbox, index, side.width);
            let mut line = VectorNode::new(ids.next_id(), SvgTag::Line)
                .with_attr("x1", fmt_num(x1))
                .with_attr("y1", fmt_num(y1))
                .with_attr("x2", fmt_num(x2))
                .with_attr("y2", fmt_num(y2))
                .with_attr("stroke", side.color.as_str())
                .with_attr("stroke-width", fmt_num(side.width));
            if let Some(dash) = side.dash_array() {
                line.set_attr("stroke-dasharray", dash);
            }
            line.purpose = Some(Purpose::Border);
            out.push(line);
        }
    }

    if let Some(outline) = &decision.outline {
        let inset = decision
            .border
            .as_ref()
            .map(|b| b.visible_width())
            .unwrap_or(0.0)
            / 2.0;
        let mut node = shape_node(&shape.grown(inset + outline.outward_distance()), ids)
            .with_attr("fill", "none")
            .with_attr("stroke", outline.color.as_str())
            .with_attr("stroke-width", fmt_num(outline.width));
        node.purpose = Some(Purpose::Outline);
        out.push(node);
    }
    out
}

/// `<mask>` definition for a scroll-fade gradient over `bbox`.
pub fn scroll_mask_def(mask: &ScrollMask, bbox: &Rect, id: &str, ids: &mut IdAllocator) -> VectorNode {
    let gradient_id = format!("{id}-{}", mask.direction.id_part());
    let [x1, y1, x2, y2] = mask.direction.vector();
    let mut gradient = VectorNode::new(ids.next_id(), SvgTag::LinearGradient)
        .with_attr("id", gradient_id.as_str())
        .with_attr("x1", x1)
        .with_attr("y1", y1)
        .with_attr("x2", x2)
        .with_attr("y2", y2);
    for stop in &mask.stops {
        gradient.push(
            VectorNode::new(ids.next_id(), SvgTag::Stop)
                .with_attr("offset", stop.offset.as_str())
                .with_attr("stop-color", "white")
                .with_attr("stop-opacity", fmt_num(stop.opacity)),
        );
    }

    let mut node = VectorNode::new(ids.next_id(), SvgTag::Mask)
        .with_attr("id", id)
        .with_attr("maskUnits", "userSpaceOnUse");
    node.purpose = Some(Purpose::Mask);
    node.push(gradient);
    node.push(rect_node(bbox, ids).with_attr("fill", format!("url(#{gradient_id})")));
    node
}

/// `<text>` node for a phase-1 run. Phase 2 may later replace its content with `tspan`s.
pub fn text_node(run: &TextRun, ids: &mut IdAllocator) -> VectorNode {
    let style = &run.style;
    let baseline = if run.from_input {
        run.y
    } else {
        run.y + style.font_size_px()
    };
    let mut node = VectorNode::new(ids.next_id(), SvgTag::Text)
        .with_attr("x", fmt_num(run.x))
        .with_attr("y", fmt_num(baseline - BASELINE_NUDGE))
        .with_attr("fill", style.color.as_str())
        .with_attr("font-family", style.font_family.as_str())
        .with_attr("font-size", style.font_size.as_str())
        .with_attr("font-weight", style.font_weight.as_str())
        .with_attr("font-style", style.font_style.as_str())
        .with_attr("text-anchor", "start");
    if !style.letter_spacing.is_empty() && style.letter_spacing != "normal" {
        node.set_attr("letter-spacing", style.letter_spacing.as_str());
    }
    if !style.text_decoration.is_empty() && !style.text_decoration.starts_with("none") {
        node.set_attr("text-decoration", style.text_decoration.as_str());
    }
    for (property, value) in [
        ("line-height", &style.line_height),
        ("white-space", &style.white_space),
        ("text-transform", &style.text_transform),
    ] {
        if !value.is_empty() && value != "none" {
            node.set_style(property, value.as_str());
        }
    }
    node.text = Some(run.display_content().to_string());
    node.bbox = Some(Rect::new(run.x, run.y, run.width, run.height));
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, GradientDirection, MaskStop};
    use crate::probe::{probe_element, ProbeContext};
    use crate::text::TextStyle;
    use crate::types::{ComputedStyle, ElementId, ElementMarkers, SourceElement};
    use std::collections::BTreeMap;

    fn decision(style: ComputedStyle) -> RenderDecision {
        let el = SourceElement {
            id: ElementId(1),
            tag: "div".into(),
            classes: vec![],
            attributes: BTreeMap::new(),
            style,
            placeholder_style: None,
            bbox: Rect::new(0.0, 0.0, 100.0, 20.0),
            client_height: None,
            client_width: None,
            check_visibility: true,
            value: None,
            children: vec![],
            markers: ElementMarkers::default(),
        };
        let probe = probe_element(&el, &ProbeContext::new(Rect::new(0.0, 0.0, 500.0, 500.0)));
        classify(&el, &probe, None).unwrap()
    }

    #[test]
    fn uniform_border_is_one_stroked_rect() {
        let mut style = ComputedStyle::default().with("background-color", "rgb(0, 0, 255)");
        for side in ["top", "right", "bottom", "left"] {
            style.set(&format!("border-{side}-width"), "2px");
            style.set(&format!("border-{side}-style"), "dashed");
            style.set(&format!("border-{side}-color"), "rgb(255, 0, 0)");
        }
        let mut ids = IdAllocator::default();
        let nodes = box_primitives(&decision(style), &mut ids);
        assert_eq!(nodes.len(), 1);
        let rect = &nodes[0];
        assert_eq!(rect.tag, SvgTag::Rect);
        assert_eq!(rect.attr("x"), Some("1"));
        assert_eq!(rect.attr("fill"), Some("rgb(0, 0, 255)"));
        assert_eq!(rect.attr("stroke"), Some("rgb(255, 0, 0)"));
        assert_eq!(rect.attr("stroke-dasharray"), Some("6 4"));
        assert_eq!(rect.purpose, Some(Purpose::Background));
    }

    #[test]
    fn per_side_borders_become_lines_and_outline_overlays() {
        let style = ComputedStyle::default()
            .with("border-bottom-width", "1px")
            .with("border-bottom-style", "solid")
            .with("border-bottom-color", "rgb(0, 0, 0)")
            .with("outline-width", "2px")
            .with("outline-style", "solid")
            .with("outline-color", "rgb(0, 128, 0)")
            .with("outline-offset", "0px");
        let mut ids = IdAllocator::default();
        let nodes = box_primitives(&decision(style), &mut ids);
        let lines: Vec<_> = nodes.iter().filter(|n| n.tag == SvgTag::Line).collect();
        assert_eq!(lines.len(), 1);
        let outline = nodes.last().unwrap();
        assert_eq!(outline.purpose, Some(Purpose::Outline));
        assert_eq!(outline.attr("fill"), Some("none"));
        assert_eq!(outline.attr("d"), Some("M-1 -1 H101 V21 H-1 V-1 Z"));
        assert_eq!(nodes[0].attr("fill"), Some(TRANSPARENT));
        assert_eq!(nodes[0].purpose, Some(Purpose::Border));
    }

    #[test]
    fn scroll_mask_definition_references_its_gradient() {
        let mask = ScrollMask {
            direction: GradientDirection::ToTop,
            stops: vec![
                MaskStop {
                    offset: "0%".into(),
                    opacity: 0.0,
                },
                MaskStop {
                    offset: "25%".into(),
                    opacity: 1.0,
                },
            ],
        };
        let mut ids = IdAllocator::default();
        let def = scroll_mask_def(&mask, &Rect::new(0.0, 0.0, 10.0, 40.0), "mask-3", &mut ids);
        assert_eq!(def.attr("id"), Some("mask-3"));
        assert_eq!(def.children[0].children.len(), 2);
        assert_eq!(def.children[1].attr("fill"), Some("url(#mask-3-toTop)"));
    }

    #[test]
    fn text_baseline_depends_on_input_origin() {
        let mut run = TextRun {
            content: "  Hello ".into(),
            x: 4.0,
            y: 10.0,
            width: 50.0,
            height: 16.0,
            natural_width: 40.0,
            indent: 0.0,
            single_line: Some(true),
            line_count: 1,
            from_input: false,
            style: TextStyle {
                font_size: "14px".into(),
                color: "rgb(0, 0, 0)".into(),
                white_space: "normal".into(),
                ..TextStyle::default()
            },
        };
        let mut ids = IdAllocator::default();
        let node = text_node(&run, &mut ids);
        assert_eq!(node.attr("y"), Some("22"));
        assert_eq!(node.text.as_deref(), Some("Hello"));
        assert_eq!(node.style_value("white-space"), Some("normal"));

        run.from_input = true;
        let node = text_node(&run, &mut ids);
        assert_eq!(node.attr("y"), Some("8"));
    }
}
