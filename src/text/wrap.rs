//! Phase 2: truncation and word wrapping against the measured run width.

use super::{TextMeasurer, TextRun};
use crate::config::TextSettings;
use crate::css::{fmt_num, parse_float};
use crate::types::{IdAllocator, SvgTag, VectorDocument, VectorNode};

const ELLIPSIS: &str = "...";

fn is_break_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':')
}

/// Splits into alternating words and delimiter runs, keeping the delimiters.
pub fn split_with_delimiters(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_delim: Option<bool> = None;
    for (i, c) in content.char_indices() {
        let delim = is_break_char(c);
        match in_delim {
            Some(prev) if prev != delim => {
                parts.push(&content[start..i]);
                start = i;
            }
            _ => {}
        }
        in_delim = Some(delim);
    }
    if start < content.len() {
        parts.push(&content[start..]);
    }
    parts
}

/// Lays out every measured text run of the document.
pub fn wrap_all_text(
    doc: &mut VectorDocument,
    measurer: &dyn TextMeasurer,
    settings: &TextSettings,
) {
    unnest_redundant_groups(&mut doc.root);
    let mut ids = IdAllocator::starting_at(doc.root.max_id() + 1);
    let runs = &doc.text_runs;
    doc.root.walk_mut(&mut |node| {
        if node.tag != SvgTag::Text || node.text.is_none() {
            return;
        }
        if let Some(run) = runs.get(&node.id) {
            layout_text(node, run, measurer, settings, &mut ids);
        }
    });
}

/// Truncates or wraps one `<text>` node in place.
pub fn layout_text(
    node: &mut VectorNode,
    run: &TextRun,
    measurer: &dyn TextMeasurer,
    settings: &TextSettings,
    ids: &mut IdAllocator,
) {
    let Some(content) = node.text.clone() else {
        return;
    };
    let tolerance = settings.tolerance_px;
    let width = run.width;
    let fits = |s: &str, available: f32| measurer.measure(s, run) <= available + tolerance;

    if fits(&content, width) && run.indent == 0.0 {
        return;
    }

    if run.single_line_ellipsis() {
        let mut kept = content.clone();
        let mut shown = content;
        while !fits(&shown, width) && !kept.is_empty() {
            kept.pop();
            shown = format!("{kept}{ELLIPSIS}");
        }
        node.text = Some(shown);
        return;
    }

    node.text = None;
    let x = node.attr("x").and_then(parse_float).unwrap_or(0.0);
    let line_height = run.style.line_height_px(settings);
    let first_text = if run.style.preserves_whitespace() {
        content.clone()
    } else {
        content.trim_start().to_string()
    };

    if run.never_wraps() {
        node.push(tspan(ids, x + run.indent, 0.0, first_text));
        return;
    }

    let max_lines = match (run.height / line_height).floor() {
        n if n >= 1.0 => n as usize,
        _ => run.line_count.max(1) as usize,
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;
    for word in split_with_delimiters(&content) {
        let first_line = lines.is_empty();
        let available = if first_line { width - run.indent } else { width };
        let candidate = format!("{current}{word}");
        let shown = if first_line {
            candidate.as_str()
        } else {
            candidate.trim_start()
        };
        if !fits(shown, available) && !current.trim().is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() >= max_lines {
                truncated = true;
                break;
            }
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !truncated && !current.is_empty() {
        lines.push(current);
    }

    if truncated && run.style.wants_ellipsis() {
        let available = if lines.len() == 1 {
            width - run.indent
        } else {
            width
        };
        if let Some(last) = lines.last_mut() {
            let mut kept = last.trim_end().to_string();
            while !kept.is_empty() && !fits(&format!("{kept}{ELLIPSIS}"), available) {
                kept.pop();
            }
            *last = format!("{kept}{ELLIPSIS}");
        }
    }

    for (index, line) in lines.into_iter().enumerate() {
        let node_line = if index == 0 {
            tspan(ids, x + run.indent, 0.0, first_line_text(&line, run))
        } else {
            tspan(ids, x, line_height, line.trim_start().to_string())
        };
        node.push(node_line);
    }
}

fn first_line_text(line: &str, run: &TextRun) -> String {
    if run.style.preserves_whitespace() {
        line.to_string()
    } else {
        line.trim_start().to_string()
    }
}

fn tspan(ids: &mut IdAllocator, x: f32, dy: f32, text: String) -> VectorNode {
    let mut node = VectorNode::new(ids.next_id(), SvgTag::Tspan)
        .with_attr("x", fmt_num(x))
        .with_attr("dy", dy_value(dy));
    node.text = Some(text);
    node
}

fn dy_value(dy: f32) -> String {
    if dy == 0.0 {
        "0".to_string()
    } else {
        format!("{}px", fmt_num(dy))
    }
}

fn is_redundant_group(node: &VectorNode) -> bool {
    node.tag == SvgTag::G
        && node.attrs.is_empty()
        && node.style.is_empty()
        && node.copy_of.is_none()
        && node.children.len() == 1
        && node.children[0].tag == SvgTag::G
}

/// Replaces attribute-less groups whose only child is a group with that child.
pub fn unnest_redundant_groups(node: &mut VectorNode) {
    for child in &mut node.children {
        unnest_redundant_groups(child);
        while is_redundant_group(child) {
            if let Some(inner) = child.children.pop() {
                *child = inner;
            }
        }
    }
}
