//! Text layout engine.
//!
//! Phase 1 ([`runs`]) turns input values and direct text children into [`TextRun`]s while the
//! tree is emitted, recording the browser's own measurements. Phase 2 ([`wrap`]) runs over
//! the finished document and truncates or word-wraps runs that overflow, using a
//! [`TextMeasurer`] from [`measure`].

pub mod measure;
pub mod runs;
pub mod wrap;

pub use measure::{CalibratedMeasurer, CharTableMeasurer, TextMeasurer};
pub use runs::{child_text_runs, format_locale_datetime, input_text_run};
pub use wrap::{layout_text, unnest_redundant_groups, wrap_all_text};

use crate::config::TextSettings;
use crate::css::parse_float;
use crate::types::ComputedStyle;

const NON_WRAPPING_WHITE_SPACE: &[&str] = &["nowrap", "pre", "reverse", "reverse-wrap"];

/// Font and layout declarations copied onto an emitted `<text>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    pub color: String,
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub font_style: String,
    pub letter_spacing: String,
    pub text_decoration: String,
    pub line_height: String,
    pub white_space: String,
    pub text_overflow: String,
    pub text_transform: String,
}

impl TextStyle {
    /// Reads `own`, falling back to `element` for properties the host left empty
    /// (placeholder pseudo styles are sparse in some engines).
    pub fn resolve(own: &ComputedStyle, element: &ComputedStyle) -> Self {
        let pick = |property: &str| -> String {
            own.opt(property)
                .or_else(|| element.opt(property))
                .unwrap_or_default()
                .to_string()
        };
        Self {
            color: pick("color"),
            font_family: pick("font-family"),
            font_size: pick("font-size"),
            font_weight: pick("font-weight"),
            font_style: pick("font-style"),
            letter_spacing: pick("letter-spacing"),
            text_decoration: pick("text-decoration"),
            line_height: pick("line-height"),
            white_space: pick("white-space"),
            text_overflow: pick("text-overflow"),
            text_transform: pick("text-transform"),
        }
    }

    pub fn font_size_px(&self) -> f32 {
        parse_float(&self.font_size).unwrap_or(16.0)
    }

    /// `line-height` in pixels, or `factor` x font size when it is `normal` or missing.
    pub fn line_height_px(&self, settings: &TextSettings) -> f32 {
        parse_float(&self.line_height)
            .filter(|v| *v > 0.0)
            .unwrap_or(settings.default_line_height_factor * self.font_size_px())
    }

    pub fn letter_spacing_px(&self) -> f32 {
        parse_float(&self.letter_spacing).unwrap_or(0.0)
    }

    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_str() {
            "bold" | "bolder" => true,
            w => parse_float(w).map(|v| v >= 600.0).unwrap_or(false),
        }
    }

    pub fn preserves_whitespace(&self) -> bool {
        self.white_space == "pre"
    }

    pub fn is_non_wrapping(&self) -> bool {
        NON_WRAPPING_WHITE_SPACE.contains(&self.white_space.as_str())
    }

    pub fn wants_ellipsis(&self) -> bool {
        self.text_overflow == "ellipsis"
    }
}

/// One text run, with the phase-1 measurements phase 2 needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    pub x: f32,
    pub y: f32,
    /// Visible (non-overflowing) width.
    pub width: f32,
    pub height: f32,
    /// Full measured width of the range before clipping.
    pub natural_width: f32,
    /// Offset of the first glyph from the start of the range.
    pub indent: f32,
    /// `None` when the host could not measure edge characters (inputs).
    pub single_line: Option<bool>,
    /// Number of rendered lines the host reported.
    pub line_count: u32,
    /// Text of an `<input>` value or placeholder.
    pub from_input: bool,
    pub style: TextStyle,
}

impl TextRun {
    /// Single-line runs that truncate with `...` instead of wrapping.
    pub fn single_line_ellipsis(&self) -> bool {
        self.style.wants_ellipsis()
            && (self.style.is_non_wrapping() || self.single_line == Some(true))
    }

    pub fn never_wraps(&self) -> bool {
        self.single_line == Some(true) || self.from_input
    }

    /// Content as written into the `<text>` node.
    pub fn display_content(&self) -> &str {
        if self.style.preserves_whitespace() {
            self.content.trim_end()
        } else {
            self.content.trim()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_element_style() {
        let placeholder = ComputedStyle::default().with("color", "rgb(150, 150, 150)");
        let element = ComputedStyle::default()
            .with("color", "rgb(0, 0, 0)")
            .with("font-size", "14px")
            .with("line-height", "normal");
        let style = TextStyle::resolve(&placeholder, &element);
        assert_eq!(style.color, "rgb(150, 150, 150)");
        assert_eq!(style.font_size, "14px");
        let settings = TextSettings::default();
        assert!((style.line_height_px(&settings) - 15.4).abs() < 1e-4);
    }

    #[test]
    fn ellipsis_policy_requires_non_wrapping_or_single_line() {
        let mut run = TextRun {
            content: "hello".into(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            natural_width: 30.0,
            indent: 0.0,
            single_line: Some(false),
            line_count: 2,
            from_input: false,
            style: TextStyle {
                text_overflow: "ellipsis".into(),
                white_space: "normal".into(),
                ..TextStyle::default()
            },
        };
        assert!(!run.single_line_ellipsis());
        run.style.white_space = "nowrap".into();
        assert!(run.single_line_ellipsis());
        run.style.white_space = "normal".into();
        run.single_line = Some(true);
        assert!(run.single_line_ellipsis());
        assert!(run.never_wraps());
    }
}
