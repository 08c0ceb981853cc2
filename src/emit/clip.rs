use crate::classify::{BoxShape, CornerRadii};
use crate::types::{IdAllocator, Rect, SvgTag, VectorNode};

use super::primitives::shape_node;

/// `<clipPath>` following the element's rounded border box.
pub fn clip_path_def(id: &str, bbox: &Rect, radii: &CornerRadii, ids: &mut IdAllocator) -> VectorNode {
    let shape = match radii.uniform() {
        Some(r) => BoxShape::Rect {
            rect: *bbox,
            rx: r.min(bbox.width / 2.0).min(bbox.height / 2.0).max(0.0),
        },
        None => BoxShape::Path {
            rect: *bbox,
            radii: *radii,
        },
    };
    let mut clip = VectorNode::new(ids.next_id(), SvgTag::ClipPath).with_attr("id", id);
    clip.push(shape_node(&shape, ids));
    clip
}

pub fn clip_reference(id: &str) -> String {
    format!("url(#{id})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_avatar_clip_uses_rect_radius() {
        let mut ids = IdAllocator::default();
        let radii = CornerRadii {
            top_left: 40.0,
            top_right: 40.0,
            bottom_right: 40.0,
            bottom_left: 40.0,
        };
        let clip = clip_path_def("clip-7", &Rect::new(0.0, 0.0, 32.0, 32.0), &radii, &mut ids);
        assert_eq!(clip.tag, SvgTag::ClipPath);
        assert_eq!(clip.children[0].attr("rx"), Some("16"));
        assert_eq!(clip_reference("clip-7"), "url(#clip-7)");
    }

    #[test]
    fn mixed_corners_clip_with_a_path() {
        let mut ids = IdAllocator::default();
        let radii = CornerRadii {
            top_left: 4.0,
            ..CornerRadii::default()
        };
        let clip = clip_path_def("clip-1", &Rect::new(0.0, 0.0, 10.0, 10.0), &radii, &mut ids);
        assert_eq!(clip.children[0].tag, SvgTag::Path);
    }
}
