//! Serializes a vector tree as SVG markup.

use crate::types::{SvgTag, VectorDocument, VectorNode};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

pub fn to_svg_string(doc: &VectorDocument) -> String {
    let mut out = String::with_capacity(4096);
    write_node(&mut out, &doc.root);
    out
}

pub fn write_node(out: &mut String, node: &VectorNode) {
    out.push('<');
    out.push_str(node.tag.as_str());
    for (name, value) in &node.attrs {
        push_attr(out, name, value);
    }
    if !node.style.is_empty() {
        let style = node
            .style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        push_attr(out, "style", &style);
    }

    let text = node.text.as_deref().unwrap_or("");
    if text.is_empty() && node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if node.tag == SvgTag::Style {
        // CSS is written verbatim inside CDATA
        out.push_str("<![CDATA[");
        out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
        out.push_str("]]>");
    } else {
        escape_into(out, text, false);
    }
    for child in &node.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(node.tag.as_str());
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, value: &str, attribute: bool) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
}
