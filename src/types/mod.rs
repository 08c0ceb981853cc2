//! Core data types.
//!
//! - [`geometry`] - boxes and viewport dimensions
//! - [`source`] - captured element subtree (input side)
//! - [`vector`] - emitted vector tree (output side)

pub mod geometry;
pub mod source;
pub mod vector;

pub use geometry::{Rect, Viewport, ViewportParseError};
pub use source::{
    ComputedStyle, DrawnShapes, ElementId, ElementMarkers, IconGlyph, ImageSource, PixelSnapshot,
    Shape, SourceElement, SourceNode, SourceSnapshot, TextNode,
};
pub use vector::{IdAllocator, NodeId, Purpose, SvgTag, VectorDocument, VectorNode};
