use super::TextRun;

/// Measures the rendered advance of a string in the context of one text run.
pub trait TextMeasurer {
    fn measure(&self, text: &str, run: &TextRun) -> f32;
}

/// Average advance widths, in em, for a proportional sans-serif face.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTableMeasurer;

impl CharTableMeasurer {
    fn advance_em(c: char) -> f32 {
        match c {
            'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' => 0.36,
            ' ' | '\u{a0}' => 0.28,
            'm' | 'w' => 0.85,
            'M' | 'W' => 0.92,
            '@' | '%' => 0.9,
            c if c.is_ascii_uppercase() => 0.66,
            c if c.is_ascii_digit() => 0.56,
            c if c.is_ascii() => 0.52,
            // CJK and other wide glyphs
            c if (c as u32) >= 0x2E80 => 1.0,
            _ => 0.6,
        }
    }
}

impl TextMeasurer for CharTableMeasurer {
    fn measure(&self, text: &str, run: &TextRun) -> f32 {
        let font_size = run.style.font_size_px();
        let spacing = run.style.letter_spacing_px();
        let weight = if run.style.is_bold() { 1.06 } else { 1.0 };
        text.chars()
            .map(|c| Self::advance_em(c) * font_size * weight + spacing)
            .sum()
    }
}

/// Scales the table estimate so the run's full content measures exactly the natural
/// width the browser reported for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibratedMeasurer {
    base: CharTableMeasurer,
}

impl CalibratedMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    fn scale(&self, run: &TextRun) -> f32 {
        let content = run.display_content();
        if run.natural_width <= 0.0 || content.is_empty() {
            return 1.0;
        }
        let estimate = self.base.measure(content, run);
        if estimate <= 0.0 {
            1.0
        } else {
            run.natural_width / estimate
        }
    }
}

impl TextMeasurer for CalibratedMeasurer {
    fn measure(&self, text: &str, run: &TextRun) -> f32 {
        self.base.measure(text, run) * self.scale(run)
    }
}
