//! Small helpers for reading serialized computed-style values.

use palette::{Srgba, WithAlpha};
use std::str::FromStr;

/// Parses the leading number of a CSS value (`"12.5px"` -> `12.5`), like `parseFloat`.
pub fn parse_float(value: &str) -> Option<f32> {
    let s = value.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let bytes = s.as_bytes();
    while end < bytes.len() {
        let c = bytes[end];
        match c {
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exp && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                // only an exponent if a digit follows
                let next = bytes.get(end + 1).copied();
                let after = bytes.get(end + 2).copied();
                let digit_follows = match next {
                    Some(b'0'..=b'9') => true,
                    Some(b'+') | Some(b'-') => matches!(after, Some(b'0'..=b'9')),
                    _ => false,
                };
                if !digit_follows {
                    break;
                }
                seen_exp = true;
            }
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse::<f32>().ok()
}

/// Parses a leading integer like `parseInt`; `"auto"` yields `None`.
pub fn parse_int(value: &str) -> Option<i32> {
    parse_float(value).map(|v| v.trunc() as i32)
}

/// Splits on `sep` at nesting depth zero (commas inside `rgb(...)` are kept).
pub fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(value[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let tail = value[start..].trim();
    if !tail.is_empty() || !parts.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Splits on whitespace at nesting depth zero.
pub fn split_whitespace_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start: Option<usize> = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// A parsed CSS color.
pub fn parse_color(value: &str) -> Option<Srgba<u8>> {
    let v = value.trim().to_ascii_lowercase();
    if v == "transparent" {
        return Some(Srgba::new(0, 0, 0, 0));
    }
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    let (name, args) = v.split_once('(')?;
    let args = args.strip_suffix(')')?;
    if name != "rgb" && name != "rgba" {
        return None;
    }
    let normalized = args.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    let channel = |raw: &str| -> Option<u8> {
        if let Some(pct) = raw.strip_suffix('%') {
            let p = pct.parse::<f32>().ok()?;
            return Some((p.clamp(0.0, 100.0) * 2.55).round() as u8);
        }
        Some(raw.parse::<f32>().ok()?.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(raw) => {
            let a = match raw.strip_suffix('%') {
                Some(p) => p.parse::<f32>().ok()? / 100.0,
                None => raw.parse::<f32>().ok()?,
            };
            (a.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Srgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn parse_hex(hex: &str) -> Option<Srgba<u8>> {
    match hex.len() {
        3 | 6 => palette::Srgb::<u8>::from_str(hex)
            .ok()
            .map(|c| c.with_alpha(255)),
        4 | 8 => {
            let (rgb, a) = hex.split_at(hex.len() / 4 * 3);
            let color = palette::Srgb::<u8>::from_str(rgb).ok()?;
            let a = if a.len() == 1 {
                u8::from_str_radix(&a.repeat(2), 16).ok()?
            } else {
                u8::from_str_radix(a, 16).ok()?
            };
            Some(color.with_alpha(a))
        }
        _ => None,
    }
}

/// Fully transparent colors paint nothing. Unparsable values count as opaque.
pub fn is_transparent(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() || v == "none" {
        return true;
    }
    parse_color(v).map(|c| c.alpha == 0).unwrap_or(false)
}

/// Whether a paint value is worth turning into a theme variable.
pub fn is_visible_color(value: &str) -> bool {
    let v = value.trim();
    !(v.is_empty()
        || v == "none"
        || v == "currentColor"
        || v == "transparent"
        || v == "rgba(0, 0, 0, 0)")
}

/// Formats a number the way attribute values are written: no trailing zeros.
pub fn fmt_num(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.3}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
