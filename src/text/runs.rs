//! Phase 1: text runs from input controls and direct text children.

use super::{TextRun, TextStyle};
use crate::probe::{is_text_visible, SourceElementKind};
use crate::types::{SourceElement, SourceNode};

/// Value or placeholder text of an input-like control, positioned with padding and
/// border arithmetic against the control's box.
pub fn input_text_run(element: &SourceElement, kind: &SourceElementKind) -> Option<TextRun> {
    let is_textarea = matches!(kind, SourceElementKind::TextArea);
    if !kind.is_text_input_like() {
        return None;
    }

    let value = element.value.as_deref().filter(|v| !v.is_empty());
    let is_placeholder = value.is_none();
    let mut content = value
        .or_else(|| element.attr("placeholder"))
        .filter(|v| !v.is_empty())?
        .to_string();

    let mut reformatted = false;
    if let (SourceElementKind::Input { input_type }, Some(v)) = (kind, value) {
        if input_type == "date" || input_type == "datetime-local" {
            if let Some(formatted) = format_locale_datetime(v) {
                content = formatted;
                reformatted = true;
            }
        }
    }

    let style = &element.style;
    let own_style = match (&element.placeholder_style, is_placeholder) {
        (Some(placeholder), true) => placeholder,
        _ => style,
    };
    let text_style = TextStyle::resolve(own_style, style);

    let rect = element.bbox;
    let padding_left = style.px("padding-left");
    let padding_top = style.px("padding-top");
    let padding_bottom = style.px("padding-bottom");
    let border_top = style.px("border-top-width");
    let border_bottom = style.px("border-bottom-width");
    let border_left = style.px("border-left-width");
    let font_size = text_style.font_size_px();

    let content_height = rect.height - padding_top - padding_bottom - border_top - border_bottom;
    let font_y_padding = (content_height - font_size).max(0.0);
    let y_offset = -padding_bottom - border_bottom - font_y_padding / 2.0 - 2.0;
    let y = if is_textarea {
        rect.y + padding_top + font_size + border_top + 2.0
    } else {
        rect.y + rect.height + y_offset
    };

    Some(TextRun {
        content,
        x: rect.x + padding_left + border_left,
        y,
        width: rect.width - padding_left,
        height: rect.height - padding_top,
        // the host measured the raw value, not the reformatted date
        natural_width: element
            .markers
            .text_width
            .filter(|w| !reformatted && *w > 0.0)
            .unwrap_or(0.0),
        indent: 0.0,
        single_line: (!is_textarea).then_some(true),
        line_count: 1,
        from_input: !is_textarea,
        style: text_style,
    })
}

/// One run per direct text child, clipped to the element's visible box.
pub fn child_text_runs(element: &SourceElement) -> Vec<TextRun> {
    let bbox = element.bbox;
    let max_x = bbox.right();
    let max_y = bbox.bottom();
    let span_height = if element.tag == "span" {
        element.client_height
    } else {
        None
    };

    element
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, child)| {
            let SourceNode::Text(node) = child else {
                return None;
            };
            if !is_text_visible(&node.text) {
                return None;
            }
            let rect = node.rect?;
            let visible_width = rect.width.min(rect.right().min(max_x) - rect.x);
            let visible_height = rect.height.min(rect.bottom().min(max_y) - rect.y);
            if visible_width <= 0.0 || visible_height <= 0.0 {
                return None;
            }

            let mut style = TextStyle::resolve(&element.style, &element.style);
            // keeps leading spaces between sibling runs of one logical block
            if index > 0 {
                style.white_space = "pre".to_string();
            }
            let indent = node
                .first_char
                .map(|first| (first.x - rect.x).max(0.0))
                .unwrap_or(0.0);
            let single_line = match (node.first_char, node.last_char) {
                (Some(first), Some(last)) => Some(first.y == last.y),
                _ => None,
            };

            Some(TextRun {
                content: node.text.clone(),
                x: rect.x,
                y: rect.y,
                width: visible_width,
                height: span_height.unwrap_or(visible_height),
                natural_width: rect.width,
                indent,
                single_line,
                line_count: node.line_count.max(1),
                from_input: false,
                style,
            })
        })
        .collect()
}

/// Formats `YYYY-MM-DD` or `YYYY-MM-DDThh:mm[:ss]` as `M/D/YYYY, h:mm:ss AM`.
pub fn format_locale_datetime(value: &str) -> Option<String> {
    let (date, time) = match value.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (value, None),
    };
    let mut date_parts = date.trim().splitn(3, '-');
    let year: u32 = date_parts.next()?.parse().ok()?;
    let month: u32 = date_parts.next()?.parse().ok()?;
    let day: u32 = date_parts.next()?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let (hour, minute, second) = match time {
        Some(t) => {
            let mut parts = t.split(':');
            let hour: u32 = parts.next()?.parse().ok()?;
            let minute: u32 = parts.next().unwrap_or("0").parse().ok()?;
            let second: u32 = parts
                .next()
                .map(|s| s.split('.').next().unwrap_or("0"))
                .unwrap_or("0")
                .parse()
                .ok()?;
            if hour > 23 || minute > 59 || second > 59 {
                return None;
            }
            (hour, minute, second)
        }
        None => (0, 0, 0),
    };

    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    Some(format!(
        "{month}/{day}/{year}, {hour12}:{minute:02}:{second:02} {meridiem}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextSettings;
    use crate::text::{CalibratedMeasurer, TextMeasurer};
    use crate::types::{ComputedStyle, ElementId, ElementMarkers, Rect, TextNode};
    use std::collections::BTreeMap;

    fn element(tag: &str, bbox: Rect) -> SourceElement {
        SourceElement {
            id: ElementId(7),
            tag: tag.to_string(),
            classes: vec![],
            attributes: BTreeMap::new(),
            style: ComputedStyle::default()
                .with("font-size", "14px")
                .with("color", "rgb(0, 0, 0)")
                .with("white-space", "normal"),
            placeholder_style: None,
            bbox,
            client_height: None,
            client_width: None,
            check_visibility: true,
            value: None,
            children: vec![],
            markers: ElementMarkers::default(),
        }
    }

    #[test]
    fn formats_dates_like_en_us_locale() {
        assert_eq!(
            format_locale_datetime("2024-01-01").as_deref(),
            Some("1/1/2024, 12:00:00 AM")
        );
        assert_eq!(
            format_locale_datetime("2023-11-30T13:05").as_deref(),
            Some("11/30/2023, 1:05:00 PM")
        );
        assert_eq!(format_locale_datetime("not a date"), None);
        assert_eq!(format_locale_datetime("2024-13-01"), None);
    }

    #[test]
    fn input_run_uses_padding_and_border_arithmetic() {
        let mut input = element("input", Rect::new(10.0, 20.0, 200.0, 32.0));
        input.attributes.insert("type".into(), "date".into());
        input.value = Some("2024-01-01".into());
        input.style.set("padding-left", "8px");
        input.style.set("padding-top", "6px");
        input.style.set("padding-bottom", "6px");
        input.style.set("border-top-width", "1px");
        input.style.set("border-bottom-width", "1px");
        input.style.set("border-left-width", "1px");

        let kind = SourceElementKind::of(&input);
        let run = input_text_run(&input, &kind).unwrap();
        assert_eq!(run.content, "1/1/2024, 12:00:00 AM");
        assert_eq!(run.x, 19.0);
        // content height 18, font padding 4
        assert_eq!(run.y, 20.0 + 32.0 - 6.0 - 1.0 - 2.0 - 2.0);
        assert_eq!(run.width, 192.0);
        assert_eq!(run.height, 26.0);
        assert!(run.from_input);
        assert!(run.never_wraps());
    }

    fn laid_out(run: &TextRun) -> String {
        use crate::text::layout_text;
        use crate::types::{IdAllocator, NodeId, SvgTag, VectorNode};

        let mut node = VectorNode::new(NodeId(1), SvgTag::Text).with_attr("x", "0");
        node.text = Some(run.content.clone());
        let mut ids = IdAllocator::starting_at(2);
        layout_text(&mut node, run, &CalibratedMeasurer::new(), &TextSettings::default(), &mut ids);
        node.full_text()
    }

    #[test]
    fn long_input_values_are_truncated_by_their_measured_width() {
        let mut input = element("input", Rect::new(0.0, 0.0, 200.0, 32.0));
        input.value = Some("Search across every workspace".into());
        input.style.set("padding-left", "8px");
        input.style.set("text-overflow", "ellipsis");
        input.markers.text_width = Some(420.0);

        let kind = SourceElementKind::of(&input);
        let run = input_text_run(&input, &kind).unwrap();
        assert_eq!(run.natural_width, 420.0);
        assert_eq!(run.single_line, Some(true));
        let shown = laid_out(&run);
        assert!(shown.ends_with("..."), "got {shown}");
        let measurer = CalibratedMeasurer::new();
        assert!(measurer.measure(&shown, &run) <= run.width + TextSettings::default().tolerance_px);
        assert_eq!(laid_out(&run), shown);

        // the same value measured narrower than the box is left alone
        input.markers.text_width = Some(150.0);
        let run = input_text_run(&input, &kind).unwrap();
        assert_eq!(laid_out(&run), "Search across every workspace");
    }

    #[test]
    fn reformatted_dates_ignore_the_measured_raw_value() {
        let mut input = element("input", Rect::new(0.0, 0.0, 200.0, 32.0));
        input.attributes.insert("type".into(), "date".into());
        input.value = Some("2024-01-01".into());
        input.markers.text_width = Some(70.0);
        let run = input_text_run(&input, &SourceElementKind::of(&input)).unwrap();
        assert_eq!(run.natural_width, 0.0);
    }

    #[test]
    fn placeholder_uses_placeholder_style() {
        let mut input = element("input", Rect::new(0.0, 0.0, 100.0, 30.0));
        input.attributes.insert("placeholder".into(), "Search".into());
        input.placeholder_style =
            Some(ComputedStyle::default().with("color", "rgb(120, 120, 120)"));
        let run = input_text_run(&input, &SourceElementKind::of(&input)).unwrap();
        assert_eq!(run.content, "Search");
        assert_eq!(run.style.color, "rgb(120, 120, 120)");
        assert_eq!(run.style.font_size, "14px");
    }

    #[test]
    fn empty_input_has_no_run() {
        let input = element("input", Rect::new(0.0, 0.0, 100.0, 30.0));
        assert!(input_text_run(&input, &SourceElementKind::of(&input)).is_none());
    }

    #[test]
    fn child_runs_clip_to_box_and_detect_single_line() {
        let mut div = element("div", Rect::new(0.0, 0.0, 100.0, 20.0));
        div.children.push(SourceNode::Text(TextNode {
            text: "A long label that overflows".into(),
            rect: Some(Rect::new(4.0, 2.0, 300.0, 16.0)),
            first_char: Some(Rect::new(6.0, 2.0, 8.0, 16.0)),
            last_char: Some(Rect::new(296.0, 2.0, 8.0, 16.0)),
            line_count: 1,
        }));
        div.children.push(SourceNode::Text(TextNode {
            text: "   ".into(),
            rect: Some(Rect::new(0.0, 0.0, 5.0, 5.0)),
            first_char: None,
            last_char: None,
            line_count: 1,
        }));
        div.children.push(SourceNode::Text(TextNode {
            text: " tail".into(),
            rect: Some(Rect::new(50.0, 2.0, 20.0, 16.0)),
            first_char: None,
            last_char: None,
            line_count: 1,
        }));

        let runs = child_text_runs(&div);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].width, 96.0);
        assert_eq!(runs[0].natural_width, 300.0);
        assert_eq!(runs[0].indent, 2.0);
        assert_eq!(runs[0].single_line, Some(true));
        assert_eq!(runs[0].style.white_space, "normal");
        assert_eq!(runs[1].style.white_space, "pre");
    }
}
