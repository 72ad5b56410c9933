//! Error types for outline parsing and geometry construction.

use thiserror::Error;

/// Reasons an outline cannot be turned into geometry.
///
/// Geometry queries never fail; these only surface while loading outlines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// Malformed path data.
    #[error("path data error at byte {offset}: {reason}")]
    PathSyntax {
        /// Byte offset into the `d` attribute.
        offset: usize,
        /// What was expected.
        reason: String,
    },

    /// Malformed or unknown `transform` attribute entry.
    #[error("invalid transform: {0}")]
    InvalidTransform(String),

    /// The document is not well-formed XML.
    #[error("SVG parse error: {0}")]
    Xml(String),

    /// The document has no `path`, `polygon` or `polyline` element.
    #[error("no outline elements found")]
    NoOutline,

    /// Every outline flattened to fewer than two distinct points.
    #[error("outline is degenerate ({points} usable points)")]
    DegenerateOutline {
        /// Points left after normalization.
        points: usize,
    },

    /// No outline source for the requested track.
    #[error("outline unavailable: {0}")]
    OutlineUnavailable(String),
}

/// Result alias for this crate.
pub type Result<T, E = TrackError> = std::result::Result<T, E>;

impl From<quick_xml::Error> for TrackError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
