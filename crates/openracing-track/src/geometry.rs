//! Closed, arc-length parameterized track polyline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::flatten::{FlattenConfig, flatten, polyline_length};
use crate::point::{BoundingBox, Point2};
use crate::svg::SvgDocument;

/// Points closer than this are treated as coincident when normalizing.
pub const CLOSURE_EPSILON: f64 = 1e-3;

/// Normalize a raw outline into a closed loop.
///
/// - non-finite points are dropped;
/// - consecutive points within `epsilon` of each other are merged;
/// - an open outline gets its first point appended;
/// - a nearly closed outline has its last point snapped onto the first, so no
///   point is added.
pub fn normalize_outline(points: &[Point2], epsilon: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len() + 1);
    for &p in points.iter().filter(|p| p.is_finite()) {
        if out.last().is_some_and(|last| last.distance(p) <= epsilon) {
            continue;
        }
        out.push(p);
    }
    if out.len() < 2 {
        return out;
    }
    let (Some(&first), Some(&last)) = (out.first(), out.last()) else {
        return out;
    };
    if first.distance(last) > epsilon {
        out.push(first);
    } else if let Some(end) = out.last_mut() {
        *end = first;
    }
    out
}

/// Nearest location on the polyline to some query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub point: Point2,
    pub distance: f64,
    /// Normalized arc length in `[0, 1]`.
    pub progress: f64,
    /// Index of the segment's first point.
    pub segment: usize,
}

/// Closed track outline with a cumulative arc-length table.
///
/// Immutable once built. `cumulative[i]` is the distance along the polyline
/// from the first point to `points[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    points: Vec<Point2>,
    cumulative: Vec<f64>,
    bounds: BoundingBox,
}

impl TrackGeometry {
    /// Build from raw points, normalizing them into a closed loop first.
    pub fn from_points(points: &[Point2]) -> Self {
        Self::from_closed(normalize_outline(points, CLOSURE_EPSILON))
    }

    fn from_closed(points: Vec<Point2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        let mut previous: Option<Point2> = None;
        for &p in &points {
            if let Some(prev) = previous {
                total += prev.distance(p);
            }
            cumulative.push(total);
            previous = Some(p);
        }
        let bounds = BoundingBox::from_points(points.iter().copied());
        Self {
            points,
            cumulative,
            bounds,
        }
    }

    /// Parse an SVG document and build geometry from its longest outline.
    ///
    /// # Errors
    ///
    /// Propagates SVG errors, and returns [`TrackError::DegenerateOutline`]
    /// when nothing with at least two distinct points remains.
    pub fn from_svg(text: &str) -> Result<Self> {
        Self::from_svg_with(text, &FlattenConfig::default())
    }

    /// [`Self::from_svg`] with explicit flattening parameters.
    ///
    /// # Errors
    ///
    /// As [`Self::from_svg`].
    pub fn from_svg_with(text: &str, config: &FlattenConfig) -> Result<Self> {
        let document = SvgDocument::parse(text)?;
        let outline = document
            .outlines()
            .iter()
            .map(|path| flatten(path, config))
            .max_by(|a, b| polyline_length(a).total_cmp(&polyline_length(b)))
            .unwrap_or_default();
        let geometry = Self::from_points(&outline);
        if geometry.len() < 2 {
            return Err(TrackError::DegenerateOutline {
                points: geometry.len(),
            });
        }
        debug!(
            outlines = document.outlines().len(),
            points = geometry.len(),
            length = geometry.total_length(),
            "track geometry built"
        );
        Ok(geometry)
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Cumulative arc length at each point.
    pub fn cumulative_lengths(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.total_length() <= f64::EPSILON
    }

    /// Point at normalized arc length `progress`, clamped to `[0, 1]`.
    ///
    /// Empty geometry yields the origin; a single point or zero-length loop
    /// yields its first point.
    pub fn point_at(&self, progress: f64) -> Point2 {
        let Some(&first) = self.points.first() else {
            return Point2::ORIGIN;
        };
        if self.is_degenerate() {
            return first;
        }
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let target = progress * self.total_length();

        // first index whose cumulative length reaches the target
        let idx = self.cumulative.partition_point(|&len| len < target);
        if idx == 0 {
            return first;
        }
        let (Some(&a), Some(&b), Some(&start), Some(&end)) = (
            self.points.get(idx - 1),
            self.points.get(idx),
            self.cumulative.get(idx - 1),
            self.cumulative.get(idx),
        ) else {
            return self.points.last().copied().unwrap_or(first);
        };
        let seg_len = end - start;
        if seg_len <= f64::EPSILON {
            return b;
        }
        let t = (target - start) / seg_len;
        if t >= 1.0 { b } else { a.lerp(b, t) }
    }

    /// Nearest point on the polyline, by per-segment clamped projection.
    pub fn closest_point(&self, query: Point2) -> Option<Projection> {
        let first = *self.points.first()?;
        if self.is_degenerate() {
            return Some(Projection {
                point: first,
                distance: first.distance(query),
                progress: 0.0,
                segment: 0,
            });
        }
        let total = self.total_length();
        let mut best: Option<Projection> = None;
        for (segment, (pair, &start)) in self.points.windows(2).zip(&self.cumulative).enumerate() {
            let [a, b] = pair else { continue };
            let ab = *b - *a;
            let len_sq = ab.dot(ab);
            let t = if len_sq <= f64::EPSILON {
                0.0
            } else {
                ((query - *a).dot(ab) / len_sq).clamp(0.0, 1.0)
            };
            let point = a.lerp(*b, t);
            let distance = point.distance(query);
            if best.is_none_or(|current| distance < current.distance) {
                best = Some(Projection {
                    point,
                    distance,
                    progress: (start + t * len_sq.sqrt()) / total,
                    segment,
                });
            }
        }
        best
    }

    /// Normalized progress of the nearest polyline location; `0.0` for
    /// degenerate geometry.
    pub fn progress_of_closest(&self, query: Point2) -> f64 {
        self.closest_point(query).map_or(0.0, |p| p.progress)
    }

    /// Distance from `query` to the polyline; infinite for empty geometry.
    pub fn distance_to(&self, query: Point2) -> f64 {
        self.closest_point(query).map_or(f64::INFINITY, |p| p.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> TrackGeometry {
        TrackGeometry::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ])
    }

    #[test]
    fn open_outline_gains_exactly_one_point() {
        let open = [Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(5.0, 5.0)];
        let closed = normalize_outline(&open, CLOSURE_EPSILON);
        assert_eq!(closed.len(), open.len() + 1);
        assert_eq!(closed.last(), closed.first());
    }

    #[test]
    fn nearly_closed_outline_is_snapped_not_extended() {
        let near = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(0.0002, -0.0001),
        ];
        let closed = normalize_outline(&near, CLOSURE_EPSILON);
        assert_eq!(closed.len(), near.len());
        assert_eq!(closed.last(), Some(&Point2::new(0.0, 0.0)));
    }

    #[test]
    fn duplicates_and_non_finite_points_are_dropped() {
        let raw = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 1.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 0.0005),
        ];
        let closed = normalize_outline(&raw, CLOSURE_EPSILON);
        assert_eq!(
            closed,
            vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(0.0, 0.0)]
        );
    }

    #[test]
    fn square_corners_at_quarter_steps() {
        let track = square();
        assert_abs_diff_eq!(track.total_length(), 40.0);
        assert_eq!(track.point_at(0.0), Point2::new(0.0, 0.0));
        assert_eq!(track.point_at(0.25), Point2::new(10.0, 0.0));
        assert_eq!(track.point_at(0.5), Point2::new(10.0, 10.0));
        assert_eq!(track.point_at(0.75), Point2::new(0.0, 10.0));
        assert_eq!(track.point_at(1.0), Point2::new(0.0, 0.0));
    }

    #[test]
    fn point_at_clamps_and_interpolates() {
        let track = square();
        assert_eq!(track.point_at(-3.0), Point2::new(0.0, 0.0));
        assert_eq!(track.point_at(7.0), Point2::new(0.0, 0.0));
        let p = track.point_at(0.125);
        assert_abs_diff_eq!(p.x, 5.0);
        assert_abs_diff_eq!(p.y, 0.0);
    }

    #[test]
    fn progress_follows_arc_length_not_segment_count() {
        // one long edge followed by short ones
        let track = TrackGeometry::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(90.0, 0.0),
            Point2::new(90.0, 5.0),
            Point2::new(85.0, 5.0),
            Point2::new(0.0, 5.0),
        ]);
        let progress = track.progress_of_closest(Point2::new(45.0, -1.0));
        assert_abs_diff_eq!(progress, 45.0 / 190.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_projects_onto_segment_interior() {
        let track = square();
        let hit = track.closest_point(Point2::new(12.0, 4.0));
        let Some(hit) = hit else {
            unreachable!("square has segments")
        };
        assert_eq!(hit.point, Point2::new(10.0, 4.0));
        assert_abs_diff_eq!(hit.distance, 2.0);
        assert_abs_diff_eq!(hit.progress, 14.0 / 40.0);
        assert_eq!(hit.segment, 1);
    }

    #[test]
    fn degenerate_geometry_has_safe_fallbacks() {
        let empty = TrackGeometry::from_points(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.point_at(0.5), Point2::ORIGIN);
        assert_abs_diff_eq!(empty.progress_of_closest(Point2::new(1.0, 1.0)), 0.0);
        assert!(empty.distance_to(Point2::ORIGIN).is_infinite());

        let single = TrackGeometry::from_points(&[Point2::new(4.0, 2.0)]);
        assert_eq!(single.len(), 1);
        assert_eq!(single.point_at(0.7), Point2::new(4.0, 2.0));
        assert_abs_diff_eq!(single.progress_of_closest(Point2::new(9.0, 9.0)), 0.0);
    }

    #[test]
    fn svg_rectangle_builds_closed_geometry() -> Result<()> {
        let track = TrackGeometry::from_svg(
            r#"<svg viewBox="0 0 40 20"><path d="M0 0 H40 V20 H0"/></svg>"#,
        )?;
        assert_eq!(track.len(), 5);
        assert_abs_diff_eq!(track.total_length(), 120.0);
        assert_eq!(track.points().first(), track.points().last());
        assert_abs_diff_eq!(track.bounds().width(), 40.0);
        Ok(())
    }

    #[test]
    fn svg_with_only_a_point_is_degenerate() {
        let result = TrackGeometry::from_svg(r#"<svg><path d="M5 5"/></svg>"#);
        assert!(matches!(result, Err(TrackError::DegenerateOutline { .. })));
    }
}
