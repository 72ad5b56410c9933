//! SVG outline input: path data, transforms and document traversal.

pub mod document;
pub mod path_data;
pub mod transform;

pub use document::SvgDocument;
pub use path_data::{PathData, PathSegment};
pub use transform::Affine;
