//! Canvas surfaces: replayed drawing instructions or a deduplicated pixel snapshot.

use base64::Engine;
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, RgbaImage};
use sha2::{Digest, Sha256};

use crate::css::fmt_num;
use crate::error::{CaptureError, Result};
use crate::types::{DrawnShapes, IdAllocator, PixelSnapshot, Rect, Shape, SvgTag, VectorNode};

const HASH_PREFIX_LEN: usize = 12;

/// Group holding the recorded shapes, placed over `bbox` with the recorded transform.
pub fn replay_shapes(drawn: &DrawnShapes, bbox: &Rect, ids: &mut IdAllocator) -> VectorNode {
    let [tx, ty] = drawn.translate;
    let mut group = VectorNode::new(ids.next_id(), SvgTag::G).with_attr(
        "transform",
        format!(
            "translate({} {}) scale({}) translate({} {})",
            fmt_num(bbox.x),
            fmt_num(bbox.y),
            fmt_num(drawn.scale),
            fmt_num(tx),
            fmt_num(ty)
        ),
    );
    for shape in &drawn.shapes {
        group.push(shape_node(shape, ids));
    }
    group
}

fn paint(node: &mut VectorNode, fill: &Option<String>, stroke: &Option<String>, width: Option<f32>) {
    node.set_attr("fill", fill.as_deref().unwrap_or("none"));
    if let Some(stroke) = stroke {
        node.set_attr("stroke", stroke.as_str());
        node.set_attr("stroke-width", fmt_num(width.unwrap_or(1.0)));
    }
}

fn points_path(points: &[[f32; 2]], close: bool) -> String {
    let mut d = String::new();
    for (i, [x, y]) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        d.push_str(&format!("{cmd}{} {}", fmt_num(*x), fmt_num(*y)));
    }
    if close && !points.is_empty() {
        d.push_str(" Z");
    }
    d
}

fn shape_node(shape: &Shape, ids: &mut IdAllocator) -> VectorNode {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            line_width,
            radius,
        } => {
            let mut node = VectorNode::new(ids.next_id(), SvgTag::Rect)
                .with_attr("x", fmt_num(*x))
                .with_attr("y", fmt_num(*y))
                .with_attr("width", fmt_num(*width))
                .with_attr("height", fmt_num(*height));
            if let Some(r) = radius.filter(|r| *r > 0.0) {
                node.set_attr("rx", fmt_num(r));
            }
            paint(&mut node, fill, stroke, *line_width);
            node
        }
        Shape::Circle {
            x,
            y,
            r,
            fill,
            stroke,
            line_width,
        } => {
            let mut node = VectorNode::new(ids.next_id(), SvgTag::Circle)
                .with_attr("cx", fmt_num(*x))
                .with_attr("cy", fmt_num(*y))
                .with_attr("r", fmt_num(*r));
            paint(&mut node, fill, stroke, *line_width);
            node
        }
        Shape::Line {
            points,
            stroke,
            line_width,
            dash,
        } => {
            let mut node =
                VectorNode::new(ids.next_id(), SvgTag::Path).with_attr("d", points_path(points, false));
            paint(&mut node, &None, stroke, *line_width);
            if let Some(dash) = dash.as_ref().filter(|d| !d.is_empty()) {
                let dash = dash.iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(" ");
                node.set_attr("stroke-dasharray", dash);
            }
            node
        }
        Shape::Polygon {
            points,
            fill,
            stroke,
            line_width,
        } => {
            let mut node =
                VectorNode::new(ids.next_id(), SvgTag::Path).with_attr("d", points_path(points, true));
            paint(&mut node, fill, stroke, *line_width);
            node
        }
        Shape::Text {
            x,
            y,
            text,
            fill,
            font,
            text_align,
        } => {
            let anchor = match text_align.as_deref() {
                Some("center") => "middle",
                Some("right") | Some("end") => "end",
                _ => "start",
            };
            let mut node = VectorNode::new(ids.next_id(), SvgTag::Text)
                .with_attr("x", fmt_num(*x))
                .with_attr("y", fmt_num(*y))
                .with_attr("fill", fill.as_deref().unwrap_or("black"))
                .with_attr("text-anchor", anchor);
            if let Some(font) = font {
                node.set_style("font", font.as_str());
            }
            node.text = Some(text.clone());
            node
        }
    }
}

/// PNG data URL for the snapshot, or `None` when the host recorded no pixels.
pub fn pixel_data_url(pixels: &PixelSnapshot) -> Result<Option<String>> {
    if let Some(url) = &pixels.data_url {
        return Ok(Some(url.clone()));
    }
    let Some(encoded) = &pixels.rgba_base64 else {
        return Ok(None);
    };
    let engine = base64::engine::general_purpose::STANDARD;
    let raw = engine
        .decode(encoded)
        .map_err(|e| CaptureError::Unknown(format!("invalid canvas pixel payload: {e}")))?;
    let img = RgbaImage::from_raw(pixels.width, pixels.height, raw).ok_or_else(|| {
        CaptureError::Unknown(format!(
            "canvas pixel buffer does not match {}x{}",
            pixels.width, pixels.height
        ))
    })?;

    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        PngEncoder::new(&mut cursor).write_image(
            img.as_raw(),
            pixels.width,
            pixels.height,
            ColorType::Rgba8,
        )?;
    }
    Ok(Some(format!("data:image/png;base64,{}", engine.encode(&buf))))
}

/// Definition id shared by every canvas with the same pixels.
pub fn raster_id(data_url: &str) -> String {
    let digest = hex::encode(Sha256::digest(data_url.as_bytes()));
    format!("raster-{}", &digest[..HASH_PREFIX_LEN])
}

pub fn raster_def(id: &str, data_url: &str, pixels: &PixelSnapshot, ids: &mut IdAllocator) -> VectorNode {
    VectorNode::new(ids.next_id(), SvgTag::Image)
        .with_attr("id", id)
        .with_attr("width", pixels.width.to_string())
        .with_attr("height", pixels.height.to_string())
        .with_attr("preserveAspectRatio", "none")
        .with_attr("href", data_url)
}

pub fn raster_use(id: &str, bbox: &Rect, pixels: &PixelSnapshot, ids: &mut IdAllocator) -> VectorNode {
    let mut node = VectorNode::new(ids.next_id(), SvgTag::Use)
        .with_attr("href", format!("#{id}"))
        .with_attr("x", fmt_num(bbox.x))
        .with_attr("y", fmt_num(bbox.y));
    if pixels.width > 0 && pixels.height > 0 {
        let sx = bbox.width / pixels.width as f32;
        let sy = bbox.height / pixels.height as f32;
        if (sx - 1.0).abs() > f32::EPSILON || (sy - 1.0).abs() > f32::EPSILON {
            // `use` cannot resize its target; scale about the placement origin
            node.set_attr(
                "transform",
                format!(
                    "translate({} {}) scale({} {}) translate({} {})",
                    fmt_num(bbox.x),
                    fmt_num(bbox.y),
                    fmt_num(sx),
                    fmt_num(sy),
                    fmt_num(-bbox.x),
                    fmt_num(-bbox.y)
                ),
            );
        }
    }
    node.bbox = Some(*bbox);
    node
}
