use crate::css::{fmt_num, parse_float};
use crate::types::{ComputedStyle, Rect};

/// Per-corner radii in pixels: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub fn from_style(style: &ComputedStyle, bbox: &Rect) -> Self {
        let min_dimension = bbox.width.min(bbox.height);
        let radius = |property: &str| -> f32 {
            // elliptical radii ("8px 4px") use the horizontal component
            let raw = style.get(property).split_whitespace().next().unwrap_or("");
            let value = parse_float(raw).unwrap_or(0.0).max(0.0);
            if raw.ends_with('%') {
                value.min(50.0) / 100.0 * min_dimension
            } else {
                value
            }
        };
        Self {
            top_left: radius("border-top-left-radius"),
            top_right: radius("border-top-right-radius"),
            bottom_right: radius("border-bottom-right-radius"),
            bottom_left: radius("border-bottom-left-radius"),
        }
    }

    pub fn uniform(&self) -> Option<f32> {
        let r = self.top_left;
        let same = |v: f32| (v - r).abs() < 0.01;
        (same(self.top_right) && same(self.bottom_right) && same(self.bottom_left)).then_some(r)
    }

    pub fn is_zero(&self) -> bool {
        self.uniform() == Some(0.0)
    }

    /// Radii that fit inside `rect`.
    pub fn clamped_to(&self, rect: &Rect) -> Self {
        let max = (rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        Self {
            top_left: self.top_left.min(max),
            top_right: self.top_right.min(max),
            bottom_right: self.bottom_right.min(max),
            bottom_left: self.bottom_left.min(max),
        }
    }
}

/// Geometry of the box primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxShape {
    /// One radius for every corner.
    Rect { rect: Rect, rx: f32 },
    /// Each corner rounded independently.
    Path { rect: Rect, radii: CornerRadii },
}

impl BoxShape {
    pub fn rect(&self) -> Rect {
        match self {
            BoxShape::Rect { rect, .. } | BoxShape::Path { rect, .. } => *rect,
        }
    }

    /// The same shape grown outward by `d` on every side.
    pub fn grown(&self, d: f32) -> BoxShape {
        match self {
            BoxShape::Rect { rect, rx } => BoxShape::Rect {
                rect: rect.inset(-d),
                rx: if *rx > 0.0 { rx + d } else { 0.0 },
            },
            BoxShape::Path { rect, radii } => {
                let grow = |r: f32| if r > 0.0 { r + d } else { 0.0 };
                BoxShape::Path {
                    rect: rect.inset(-d),
                    radii: CornerRadii {
                        top_left: grow(radii.top_left),
                        top_right: grow(radii.top_right),
                        bottom_right: grow(radii.bottom_right),
                        bottom_left: grow(radii.bottom_left),
                    },
                }
            }
        }
    }
}

/// Closed path of a rectangle with independently rounded corners.
pub fn rounded_rect_path(rect: &Rect, radii: &CornerRadii) -> String {
    let r = radii.clamped_to(rect);
    let (x, y, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    let n = fmt_num;
    let mut d = format!("M{} {}", n(x + r.top_left), n(y));
    d.push_str(&format!(" H{}", n(right - r.top_right)));
    arc(&mut d, r.top_right, right, y + r.top_right);
    d.push_str(&format!(" V{}", n(bottom - r.bottom_right)));
    arc(&mut d, r.bottom_right, right - r.bottom_right, bottom);
    d.push_str(&format!(" H{}", n(x + r.bottom_left)));
    arc(&mut d, r.bottom_left, x, bottom - r.bottom_left);
    d.push_str(&format!(" V{}", n(y + r.top_left)));
    arc(&mut d, r.top_left, x + r.top_left, y);
    d.push_str(" Z");
    d
}

fn arc(d: &mut String, r: f32, to_x: f32, to_y: f32) {
    if r > 0.0 {
        let r = fmt_num(r);
        d.push_str(&format!(" A{r} {r} 0 0 1 {} {}", fmt_num(to_x), fmt_num(to_y)));
    }
}
