//! Boxes and viewport dimensions shared by the source snapshot and the emitted tree.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Absolute box in CSS pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Strict overlap: boxes that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Shrinks the box by `d` on every side (negative `d` grows it).
    pub fn inset(&self, d: f32) -> Rect {
        Rect::new(
            self.x + d,
            self.y + d,
            (self.width - 2.0 * d).max(0.0),
            (self.height - 2.0 * d).max(0.0),
        )
    }

    pub fn rounded(&self) -> Rect {
        Rect::new(
            self.x.round(),
            self.y.round(),
            self.width.round(),
            self.height.round(),
        )
    }

    pub fn is_zero_sized(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
        }
    }
}

impl Viewport {
    pub fn as_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Error)]
pub enum ViewportParseError {
    #[error("Invalid viewport format: expected WIDTHxHEIGHT (e.g., 1440x900)")]
    InvalidFormat,
    #[error("Invalid {axis}: {value}")]
    InvalidNumber { axis: &'static str, value: String },
    #[error("Viewport {0} must be positive")]
    Zero(&'static str),
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or(ViewportParseError::InvalidFormat)?;
        if h.contains('x') {
            return Err(ViewportParseError::InvalidFormat);
        }
        let parse = |axis: &'static str, raw: &str| -> Result<u32, ViewportParseError> {
            let value: u32 =
                raw.trim()
                    .parse()
                    .map_err(|_| ViewportParseError::InvalidNumber {
                        axis,
                        value: raw.to_string(),
                    })?;
            if value == 0 {
                return Err(ViewportParseError::Zero(axis));
            }
            Ok(value)
        };

        Ok(Viewport {
            width: parse("width", w)?,
            height: parse("height", h)?,
        })
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.0, 9.0, 5.0, 5.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(a.intersect(&c), Some(Rect::new(9.0, 9.0, 1.0, 1.0)));
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inset(3.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }

    #[test]
    fn viewport_parses_and_displays() {
        let vp: Viewport = " 1280 x 720 ".parse().unwrap();
        assert_eq!(vp, Viewport { width: 1280, height: 720 });
        assert_eq!(vp.to_string(), "1280x720");
        assert!("1280".parse::<Viewport>().is_err());
        assert!("1x2x3".parse::<Viewport>().is_err());
        assert!("0x720".parse::<Viewport>().is_err());
        assert!("abcx720".parse::<Viewport>().is_err());
    }
}
