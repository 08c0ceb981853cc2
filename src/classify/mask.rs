//! Scroll-fade masks: a backdrop-filtered element whose `mask-image` is a linear gradient.

use crate::css::{fmt_num, parse_color, parse_float, split_top_level};
use crate::types::{ComputedStyle, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    ToTop,
    ToBottom,
    ToLeft,
    ToRight,
}

impl GradientDirection {
    fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "to top" => Some(GradientDirection::ToTop),
            "to bottom" => Some(GradientDirection::ToBottom),
            "to left" => Some(GradientDirection::ToLeft),
            "to right" => Some(GradientDirection::ToRight),
            _ => None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, GradientDirection::ToLeft | GradientDirection::ToRight)
    }

    /// `(x1, y1, x2, y2)` of the SVG gradient vector.
    pub fn vector(&self) -> [&'static str; 4] {
        match self {
            GradientDirection::ToTop => ["0%", "100%", "0%", "0%"],
            GradientDirection::ToBottom => ["0%", "0%", "0%", "100%"],
            GradientDirection::ToLeft => ["100%", "0%", "0%", "0%"],
            GradientDirection::ToRight => ["0%", "0%", "100%", "0%"],
        }
    }

    pub fn id_part(&self) -> &'static str {
        match self {
            GradientDirection::ToTop => "toTop",
            GradientDirection::ToBottom => "toBottom",
            GradientDirection::ToLeft => "toLeft",
            GradientDirection::ToRight => "toRight",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskStop {
    /// Percentage offset, e.g. `"25%"`.
    pub offset: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollMask {
    pub direction: GradientDirection,
    pub stops: Vec<MaskStop>,
}

fn mask_property<'a>(style: &'a ComputedStyle, name: &str) -> &'a str {
    style
        .opt(name)
        .or_else(|| style.opt(&format!("-webkit-{name}")))
        .unwrap_or("")
}

/// Only the first gradient layer is translated; SVG masks cannot combine layers.
pub fn scroll_mask(style: &ComputedStyle, bbox: &Rect) -> Option<ScrollMask> {
    let backdrop = style.get("backdrop-filter");
    if backdrop.is_empty() || backdrop == "none" {
        return None;
    }
    let image = mask_property(style, "mask-image");
    let composite = mask_property(style, "mask-composite");
    if !image.contains("linear-gradient(")
        || !composite.split(", ").all(|c| c.trim() == "source-in")
    {
        return None;
    }

    let body = first_gradient_body(image)?;
    let mut parts = split_top_level(body, ',');
    let direction = match parts.first().and_then(|p| GradientDirection::parse(p)) {
        Some(d) => {
            parts.remove(0);
            d
        }
        None => GradientDirection::ToBottom,
    };
    let extent = if direction.is_horizontal() {
        bbox.width
    } else {
        bbox.height
    };

    let count = parts.len();
    let stops = parts
        .iter()
        .enumerate()
        .filter_map(|(index, &part)| {
            let (color, offset) = match part.rfind(')') {
                Some(end) => (&part[..=end], part[end + 1..].trim()),
                None => part.split_once(' ').unwrap_or((part, "")),
            };
            let color = parse_color(color)?;
            let offset = if offset.ends_with("px") && extent > 0.0 {
                let px = parse_float(offset).unwrap_or(0.0);
                format!("{}%", fmt_num(px / extent * 100.0))
            } else if offset.ends_with('%') {
                offset.to_string()
            } else if count > 1 {
                format!("{}%", fmt_num(index as f32 / (count - 1) as f32 * 100.0))
            } else {
                "0%".to_string()
            };
            Some(MaskStop {
                offset,
                opacity: color.alpha as f32 / 255.0,
            })
        })
        .collect::<Vec<_>>();

    (!stops.is_empty()).then_some(ScrollMask { direction, stops })
}

fn first_gradient_body(image: &str) -> Option<&str> {
    let start = image.find("linear-gradient(")? + "linear-gradient(".len();
    let mut depth = 1;
    for (i, c) in image[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&image[start..start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked(image: &str) -> ComputedStyle {
        ComputedStyle::default()
            .with("backdrop-filter", "blur(6px)")
            .with("mask-image", image)
            .with("mask-composite", "source-in")
    }

    #[test]
    fn translates_first_gradient_with_pixel_stops() {
        let style = masked(
            "linear-gradient(to top, rgba(0, 0, 0, 0) 0px, rgb(0, 0, 0) 20px), linear-gradient(to left, rgb(0, 0, 0) 0%, rgb(0, 0, 0) 100%)",
        );
        let mask = scroll_mask(&style, &Rect::new(0.0, 0.0, 100.0, 80.0)).unwrap();
        assert_eq!(mask.direction, GradientDirection::ToTop);
        assert_eq!(mask.stops.len(), 2);
        assert_eq!(mask.stops[0].offset, "0%");
        assert_eq!(mask.stops[0].opacity, 0.0);
        assert_eq!(mask.stops[1].offset, "25%");
        assert_eq!(mask.stops[1].opacity, 1.0);
    }

    #[test]
    fn requires_backdrop_and_source_in() {
        let image = "linear-gradient(to left, rgb(0, 0, 0) 0%, rgb(0, 0, 0) 100%)";
        let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
        let no_backdrop = masked(image).with("backdrop-filter", "none");
        assert!(scroll_mask(&no_backdrop, &bbox).is_none());
        let add = masked(image).with("mask-composite", "add");
        assert!(scroll_mask(&add, &bbox).is_none());
        let mask = scroll_mask(&masked(image), &bbox).unwrap();
        assert!(mask.direction.is_horizontal());
    }
}
