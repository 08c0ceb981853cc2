//! Visibility and layout probing for one source element.

use crate::error::{CaptureError, Result};
use crate::types::{Rect, SourceElement, SourceSnapshot};

/// Closed set of element kinds the classifier and walker branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceElementKind {
    Input { input_type: String },
    TextArea,
    Select,
    Button,
    Label,
    Canvas,
    Svg,
    Img,
    Other,
}

const TEXT_INPUT_TYPES: &[&str] = &[
    "text",
    "search",
    "email",
    "password",
    "number",
    "tel",
    "url",
    "date",
    "datetime-local",
    "time",
    "month",
    "week",
];

impl SourceElementKind {
    pub fn of(element: &SourceElement) -> Self {
        match element.tag.as_str() {
            "input" => SourceElementKind::Input {
                input_type: element
                    .attr("type")
                    .unwrap_or("text")
                    .to_ascii_lowercase(),
            },
            "textarea" => SourceElementKind::TextArea,
            "select" => SourceElementKind::Select,
            "button" => SourceElementKind::Button,
            "label" => SourceElementKind::Label,
            "canvas" => SourceElementKind::Canvas,
            "svg" => SourceElementKind::Svg,
            "img" => SourceElementKind::Img,
            _ => SourceElementKind::Other,
        }
    }

    /// Controls that hold editable text and are always drawn.
    pub fn is_text_input_like(&self) -> bool {
        match self {
            SourceElementKind::Input { input_type } => {
                TEXT_INPUT_TYPES.contains(&input_type.as_str())
            }
            SourceElementKind::TextArea => true,
            _ => false,
        }
    }

    /// Value-holding controls whose text never wraps.
    pub fn is_value_input(&self) -> bool {
        matches!(self, SourceElementKind::Input { .. })
    }

    pub fn is_editable(&self) -> bool {
        self.is_text_input_like()
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, SourceElementKind::Canvas)
    }

    /// Elements the platform draws its own chrome for.
    pub fn is_chrome(&self) -> bool {
        match self {
            SourceElementKind::Button | SourceElementKind::Label | SourceElementKind::Select => {
                true
            }
            SourceElementKind::Input { .. } => !self.is_text_input_like(),
            _ => false,
        }
    }
}

/// Nearest overflow-clipping ancestor box and the viewport.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext {
    pub viewport: Rect,
    pub clip: Option<Rect>,
}

impl ProbeContext {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            clip: None,
        }
    }

    /// Context for the children of `element`.
    pub fn descend(&self, element: &SourceElement) -> Self {
        if clips_overflow(element) {
            Self {
                viewport: self.viewport,
                clip: Some(element.bbox),
            }
        } else {
            *self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub visible: bool,
    /// Hidden, but revealed on hover and interactive: emit a hit rectangle only.
    pub might_be_hovered: bool,
    pub kind: SourceElementKind,
    pub bbox: Rect,
}

pub fn probe_element(element: &SourceElement, ctx: &ProbeContext) -> Probe {
    let kind = SourceElementKind::of(element);
    let visible = element.check_visibility && is_within_visible_area(element, ctx);
    let might_be_hovered =
        !visible && is_hover_revealed(element) && has_interaction_markers(element);
    Probe {
        visible,
        might_be_hovered,
        kind,
        bbox: element.bbox,
    }
}

fn is_within_visible_area(element: &SourceElement, ctx: &ProbeContext) -> bool {
    let position = element.style.get("position");
    let escapes_clip = position == "absolute" || position == "fixed";
    let area = match ctx.clip {
        Some(clip) if !escapes_clip => clip,
        _ => ctx.viewport,
    };
    element
        .descendants()
        .iter()
        .any(|el| el.bbox.overlaps(&area))
}

/// A text node is visible iff its trimmed content is non-empty.
pub fn is_text_visible(text: &str) -> bool {
    !text.trim().is_empty()
}

pub fn clips_overflow(element: &SourceElement) -> bool {
    let style = &element.style;
    let clipping = |v: &str| matches!(v, "hidden" | "clip" | "scroll" | "auto");
    let overflow = style.get("overflow");
    if overflow
        .split_whitespace()
        .next()
        .map(clipping)
        .unwrap_or(false)
    {
        return true;
    }
    clipping(style.get("overflow-x")) || clipping(style.get("overflow-y"))
}

pub fn is_hover_revealed(element: &SourceElement) -> bool {
    element.classes.iter().any(|class| {
        matches!(class.as_str(), "show-on-hover" | "show-on-parent-hover")
            || class.starts_with("hover:")
            || class.starts_with("group-hover:")
    })
}

/// Interaction markers on the element itself.
pub fn is_interactive(element: &SourceElement) -> bool {
    ["data-command", "data-key", "onclick", "href"]
        .iter()
        .any(|a| element.attr(a).is_some())
        || element.attr("role") == Some("button")
        || matches!(element.tag.as_str(), "button" | "a")
}

/// Interaction markers on the element or any descendant.
pub fn has_interaction_markers(element: &SourceElement) -> bool {
    element.descendants().into_iter().any(is_interactive)
}

/// A detached root has no trustworthy geometry.
pub fn ensure_measurable(snapshot: &SourceSnapshot) -> Result<()> {
    if !snapshot.connected {
        return Err(CaptureError::measurement(
            "root element is not attached to a live document; geometry cannot be measured",
        ));
    }
    let root = &snapshot.root.bbox;
    if !root.width.is_finite() || !root.height.is_finite() {
        return Err(CaptureError::measurement(format!(
            "root element <{}> reported a non-finite box",
            snapshot.root.tag
        )));
    }
    Ok(())
}
