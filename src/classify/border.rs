use crate::css::{fmt_num, is_transparent, parse_float};
use crate::types::{ComputedStyle, Rect};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

#[derive(Debug, Clone, PartialEq)]
pub struct BorderSide {
    pub width: f32,
    pub style: String,
    pub color: String,
}

impl BorderSide {
    fn read(style: &ComputedStyle, prefix: &str) -> Self {
        Self {
            width: parse_float(style.get(&format!("{prefix}-width"))).unwrap_or(0.0),
            style: style.get(&format!("{prefix}-style")).to_string(),
            color: style.get(&format!("{prefix}-color")).to_string(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0
            && !matches!(self.style.as_str(), "none" | "hidden" | "")
            && !is_transparent(&self.color)
    }

    /// `stroke-dasharray` for dashed and dotted lines.
    pub fn dash_array(&self) -> Option<String> {
        let w = self.width;
        match self.style.as_str() {
            "dashed" => Some(format!("{} {}", fmt_num(w * 3.0), fmt_num(w * 2.0))),
            "dotted" => Some(format!("{} {}", fmt_num(w), fmt_num(w))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BorderSpec {
    /// Same width, style and color on all four sides: one stroked primitive.
    Uniform(BorderSide),
    /// Sides differ: one segment per visible side, in top, right, bottom, left order.
    PerSide([Option<BorderSide>; 4]),
}

impl BorderSpec {
    pub fn from_style(style: &ComputedStyle) -> Option<Self> {
        let sides = SIDES.map(|side| BorderSide::read(style, &format!("border-{side}")));
        if !sides.iter().any(BorderSide::is_visible) {
            return None;
        }
        if sides.iter().all(|s| *s == sides[0]) {
            return Some(BorderSpec::Uniform(sides[0].clone()));
        }
        Some(BorderSpec::PerSide(
            sides.map(|s| if s.is_visible() { Some(s) } else { None }),
        ))
    }

    /// Width the box geometry is inset by so the stroke sits on the visual edge.
    pub fn visible_width(&self) -> f32 {
        match self {
            BorderSpec::Uniform(side) => side.width,
            BorderSpec::PerSide(_) => 0.0,
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, BorderSpec::Uniform(_))
    }
}

/// One segment of a per-side border: `(x1, y1, x2, y2)` centered on the side's stroke.
pub fn side_segment(bbox: &Rect, index: usize, width: f32) -> (f32, f32, f32, f32) {
    let half = width / 2.0;
    match index {
        0 => (bbox.x, bbox.y + half, bbox.right(), bbox.y + half),
        1 => (bbox.right() - half, bbox.y, bbox.right() - half, bbox.bottom()),
        2 => (bbox.x, bbox.bottom() - half, bbox.right(), bbox.bottom() - half),
        _ => (bbox.x + half, bbox.y, bbox.x + half, bbox.bottom()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub width: f32,
    pub color: String,
    pub offset: f32,
}

impl Outline {
    pub fn from_style(style: &ComputedStyle) -> Option<Self> {
        let width = style.px("outline-width");
        let line = style.get("outline-style");
        let color = style.get("outline-color");
        if width <= 0.0 || matches!(line, "none" | "hidden" | "") || is_transparent(color) {
            return None;
        }
        Some(Self {
            width,
            color: color.to_string(),
            offset: style.px("outline-offset"),
        })
    }

    /// Distance from the border box to the centre of the outline stroke.
    pub fn outward_distance(&self) -> f32 {
        self.offset + self.width / 2.0
    }
}
