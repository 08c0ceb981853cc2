//! Imports embedded vector markup (inline `<svg>`, fetched icons, mask images) into the tree.

use crate::error::{CaptureError, Result};
use crate::types::{IdAllocator, SvgTag, VectorNode};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements whose text content is meaningful.
const TEXT_ELEMENTS: &[&str] = &["text", "tspan", "style", "title", "textPath"];

/// Parses markup whose root is an `<svg>` element. Every imported node is flagged `nested`.
pub fn parse_svg_markup(markup: &str, ids: &mut IdAllocator) -> Result<VectorNode> {
    let doc = roxmltree::Document::parse(markup)
        .map_err(|e| CaptureError::Markup(format!("failed to parse embedded svg: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(CaptureError::Markup(format!(
            "embedded markup root is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }
    Ok(import_element(root, ids))
}

fn import_element(element: roxmltree::Node<'_, '_>, ids: &mut IdAllocator) -> VectorNode {
    let name = element.tag_name().name();
    let mut node = VectorNode::new(ids.next_id(), SvgTag::from_name(name));
    node.nested = true;

    for attr in element.attributes() {
        let attr_name = match attr.namespace() {
            Some(XLINK_NS) if attr.name() == "href" => "href".to_string(),
            Some(XLINK_NS) => format!("xlink:{}", attr.name()),
            Some(XML_NS) => format!("xml:{}", attr.name()),
            _ => attr.name().to_string(),
        };
        if attr_name == "style" {
            node.style = parse_inline_style(attr.value());
        } else if attr_name != "xmlns" {
            node.set_attr(&attr_name, attr.value());
        }
    }

    if TEXT_ELEMENTS.contains(&name) {
        let text: String = element
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect();
        if !text.trim().is_empty() {
            node.text = Some(text);
        }
    }

    for child in element.children().filter(|c| c.is_element()) {
        node.push(import_element(child, ids));
    }
    node
}

/// Splits `a: b; c: d` into ordered declarations.
pub fn parse_inline_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty() && !v.is_empty()).then(|| (k.to_string(), v.to_string()))
        })
        .collect()
}
