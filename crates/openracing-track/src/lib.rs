//! Track outline geometry and lap progress projection.
//!
//! Turns a vector track map (SVG) into an arc-length parameterized closed
//! polyline, then maps in-game world positions onto it to get lap progress.
//!
//! # Pipeline
//!
//! 1. [`svg::SvgDocument`] extracts outlines (`<path>`, `<polygon>`,
//!    `<polyline>`) with group and viewport transforms applied.
//! 2. [`flatten`] turns curves into polylines by adaptive subdivision.
//! 3. [`TrackGeometry`] closes the outline and builds the cumulative length
//!    table used by [`TrackGeometry::point_at`] and
//!    [`TrackGeometry::progress_of_closest`].
//! 4. [`CoordinateAligner`] fits world samples onto the map with one of four
//!    quarter-turn rotations and a uniform scale.
//! 5. [`TrackProjector`] finds the progress of the map point nearest to an
//!    aligned world position.
//!
//! [`LapProgressTracker`] wires these together per active track, with built
//! geometry shared through a [`GeometryCache`].
//!
//! # Example
//!
//! ```rust
//! use openracing_track::{Point2, TrackGeometry};
//!
//! # fn main() -> Result<(), openracing_track::TrackError> {
//! let svg = r#"<svg viewBox="0 0 10 10"><path d="M0 0 H10 V10 H0 Z"/></svg>"#;
//! let track = TrackGeometry::from_svg(svg)?;
//! assert_eq!(track.point_at(0.25), Point2::new(10.0, 0.0));
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod align;
pub mod cache;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod point;
pub mod projector;
pub mod provider;
pub mod svg;
pub mod tracker;

pub use align::{
    AlignerConfig, AlignmentSolution, AlignmentTransform, CoordinateAligner, QuarterTurn,
};
pub use cache::{GeometryCache, TrackId};
pub use error::{Result, TrackError};
pub use flatten::{FlattenConfig, flatten_subpaths, polyline_length};
pub use geometry::{CLOSURE_EPSILON, Projection, TrackGeometry, normalize_outline};
pub use point::{BoundingBox, Point2};
pub use projector::{ProjectorConfig, TrackProjector};
pub use provider::{OutlineProvider, StaticOutlines};
pub use tracker::LapProgressTracker;
