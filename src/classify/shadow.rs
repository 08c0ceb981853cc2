use crate::css::{fmt_num, is_transparent, parse_float, split_top_level, split_whitespace_top_level};

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowLayer {
    pub offset_x: f32,
    pub offset_y: f32,
    /// Already halved: vector drop shadows render sharper than raster blur.
    pub blur: f32,
    pub color: String,
}

/// A `box-shadow` list translated to `drop-shadow()` filter functions.
#[derive(Debug, Clone, PartialEq)]
pub struct DropShadow {
    pub layers: Vec<ShadowLayer>,
}

impl DropShadow {
    /// Parses a serialized computed `box-shadow`. Inset and all-zero layers are skipped.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == "none" {
            return None;
        }
        let layers: Vec<ShadowLayer> = split_top_level(value, ',')
            .into_iter()
            .filter_map(parse_layer)
            .collect();
        (!layers.is_empty()).then_some(Self { layers })
    }

    /// Value for the `filter` style property.
    pub fn filter(&self) -> String {
        self.layers
            .iter()
            .map(|l| {
                format!(
                    "drop-shadow({}px {}px {}px {})",
                    fmt_num(l.offset_x),
                    fmt_num(l.offset_y),
                    fmt_num(l.blur),
                    l.color
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn parse_layer(layer: &str) -> Option<ShadowLayer> {
    let mut color = None;
    let mut lengths = Vec::new();
    for token in split_whitespace_top_level(layer) {
        if token == "inset" {
            return None;
        }
        match parse_float(token) {
            Some(v) => lengths.push(v),
            None => color = Some(token.to_string()),
        }
    }
    let offset_x = *lengths.first()?;
    let offset_y = *lengths.get(1)?;
    let blur = lengths.get(2).copied().unwrap_or(0.0).max(0.0);
    let spread = lengths.get(3).copied().unwrap_or(0.0);
    if offset_x == 0.0 && offset_y == 0.0 && blur == 0.0 && spread == 0.0 {
        return None;
    }
    let color = color.unwrap_or_else(|| "currentColor".to_string());
    if is_transparent(&color) {
        return None;
    }
    Some(ShadowLayer {
        offset_x,
        offset_y,
        blur: blur / 2.0,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layers_and_halves_blur() {
        let shadow = DropShadow::parse(
            "rgba(0, 0, 0, 0.1) 0px 4px 6px -1px, rgba(0, 0, 0, 0.1) 0px 2px 4px -2px",
        )
        .unwrap();
        assert_eq!(shadow.layers.len(), 2);
        assert_eq!(shadow.layers[0].blur, 3.0);
        assert_eq!(
            shadow.filter(),
            "drop-shadow(0px 4px 3px rgba(0, 0, 0, 0.1)) drop-shadow(0px 2px 2px rgba(0, 0, 0, 0.1))"
        );
    }

    #[test]
    fn drops_degenerate_inset_and_transparent_layers() {
        assert!(DropShadow::parse("none").is_none());
        assert!(DropShadow::parse("rgb(0, 0, 0) 0px 0px 0px 0px").is_none());
        assert!(DropShadow::parse("rgb(0, 0, 0) 0px 1px 2px 0px inset").is_none());
        assert!(DropShadow::parse("rgba(0, 0, 0, 0) 0px 1px 2px 0px").is_none());
        let mixed = DropShadow::parse("rgb(0, 0, 0) 0px 0px 0px 0px, #000 1px 1px").unwrap();
        assert_eq!(mixed.layers.len(), 1);
        assert_eq!(mixed.layers[0].color, "#000");
    }
}
