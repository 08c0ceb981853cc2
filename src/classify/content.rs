use base64::Engine;

use crate::error::{CaptureError, Result};
use crate::probe::SourceElementKind;
use crate::types::{IconGlyph, ImageSource, SourceElement};

const SVG_DATA_PREFIX: &str = "data:image/svg+xml";

/// What an element contributes besides its box and text, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    None,
    /// The element is inline vector markup; it is cloned as-is.
    SvgClone {
        markup: String,
        width: f32,
        height: f32,
    },
    /// An `<img>` pointing at vector markup, fetched and inlined.
    ExternalIcon { src: String },
    IconGlyph(IconGlyph),
    Bitmap(ImageSource),
    /// Vector markup from a `mask-image` data URI, painted with the text color.
    MaskImage {
        markup: String,
        color: String,
        animation: Option<String>,
    },
}

pub fn content_kind(element: &SourceElement, kind: &SourceElementKind) -> Result<ContentKind> {
    if let (SourceElementKind::Svg, Some(markup)) = (kind, &element.markers.svg_markup) {
        return Ok(ContentKind::SvgClone {
            markup: markup.clone(),
            width: element.client_width.unwrap_or(element.bbox.width),
            height: element.client_height.unwrap_or(element.bbox.height),
        });
    }

    let image_src = element
        .markers
        .image
        .as_ref()
        .map(|i| i.src.as_str())
        .or_else(|| element.attr("src"));
    if let (SourceElementKind::Img, Some(src)) = (kind, image_src) {
        if is_vector_source(src) {
            return Ok(ContentKind::ExternalIcon {
                src: src.to_string(),
            });
        }
    }

    if let Some(glyph) = &element.markers.icon_glyph {
        return Ok(ContentKind::IconGlyph(glyph.clone()));
    }

    if let SourceElementKind::Img = kind {
        let source = element.markers.image.clone().or_else(|| {
            element.attr("src").map(|src| ImageSource {
                src: src.to_string(),
                data_url: None,
                natural_width: None,
                natural_height: None,
            })
        });
        if let Some(source) = source {
            return Ok(ContentKind::Bitmap(source));
        }
    }

    let mask = element
        .style
        .opt("mask-image")
        .or_else(|| element.style.opt("-webkit-mask-image"))
        .unwrap_or("");
    if mask.contains(SVG_DATA_PREFIX) {
        let markup = decode_svg_data_uri(mask)?;
        let animation = element
            .style
            .opt("animation")
            .filter(|a| !a.starts_with("none"))
            .map(str::to_string);
        return Ok(ContentKind::MaskImage {
            markup,
            color: element.style.get("color").to_string(),
            animation,
        });
    }

    Ok(ContentKind::None)
}

fn is_vector_source(src: &str) -> bool {
    if src.starts_with(SVG_DATA_PREFIX) {
        return true;
    }
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.to_ascii_lowercase().ends_with(".svg")
}

/// Decodes the vector markup of a `data:image/svg+xml` URI, optionally wrapped in `url("...")`.
pub fn decode_svg_data_uri(value: &str) -> Result<String> {
    let start = value
        .find(SVG_DATA_PREFIX)
        .ok_or_else(|| CaptureError::Markup("not an svg data URI".to_string()))?;
    let uri = value[start..]
        .trim_end()
        .trim_end_matches(')')
        .trim_end_matches(['"', '\'']);
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| CaptureError::Markup("svg data URI has no payload".to_string()))?;

    let markup = if header.ends_with(";base64") {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| CaptureError::Markup(format!("invalid base64 svg data URI: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| CaptureError::Markup(format!("svg data URI is not UTF-8: {e}")))?
    } else {
        // CSS serializes quotes inside url("...") as \"
        let unescaped = payload.replace("\\\"", "\"");
        urlencoding::decode(&unescaped)
            .map_err(|e| CaptureError::Markup(format!("invalid percent-encoding: {e}")))?
            .into_owned()
    };
    if !markup.trim_start().starts_with('<') {
        return Err(CaptureError::Markup(
            "svg data URI does not contain markup".to_string(),
        ));
    }
    Ok(markup)
}
