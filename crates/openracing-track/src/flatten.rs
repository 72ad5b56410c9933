//! Curve flattening by De Casteljau bisection.

use serde::{Deserialize, Serialize};

use crate::point::Point2;
use crate::svg::{PathData, PathSegment};

/// Flattening parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Tolerance as a fraction of the larger bounding-box dimension.
    pub tolerance_ratio: f64,
    /// Maximum bisection depth per curve segment.
    pub max_depth: u32,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.002,
            max_depth: 8,
        }
    }
}

impl FlattenConfig {
    /// Absolute tolerance for a path of the given extent.
    pub fn tolerance_for(&self, extent: f64) -> f64 {
        (extent * self.tolerance_ratio).max(f64::EPSILON)
    }
}

/// Flatten every subpath of `path`. Each `MoveTo` starts a new polyline;
/// `Close` returns to the subpath start.
pub fn flatten_subpaths(path: &PathData, config: &FlattenConfig) -> Vec<Vec<Point2>> {
    let tolerance = config.tolerance_for(path.control_bounds().extent());
    let mut subpaths: Vec<Vec<Point2>> = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    let mut pen = Point2::ORIGIN;
    let mut start = Point2::ORIGIN;

    for segment in path.segments() {
        match *segment {
            PathSegment::MoveTo(p) => {
                if current.len() > 1 {
                    subpaths.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
                pen = p;
                start = p;
            }
            PathSegment::LineTo(p) => {
                ensure_started(&mut current, pen);
                current.push(p);
                pen = p;
            }
            PathSegment::QuadTo { ctrl, to } => {
                ensure_started(&mut current, pen);
                // exact degree elevation keeps a single subdivision routine
                let ctrl1 = pen.lerp(ctrl, 2.0 / 3.0);
                let ctrl2 = to.lerp(ctrl, 2.0 / 3.0);
                subdivide(pen, ctrl1, ctrl2, to, tolerance, config.max_depth, &mut current);
                pen = to;
            }
            PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                ensure_started(&mut current, pen);
                subdivide(pen, ctrl1, ctrl2, to, tolerance, config.max_depth, &mut current);
                pen = to;
            }
            PathSegment::Close => {
                if current.last().is_some_and(|last| *last != start) {
                    current.push(start);
                }
                pen = start;
            }
        }
    }
    if current.len() > 1 {
        subpaths.push(current);
    }
    subpaths
}

/// The longest flattened subpath, or an empty vector.
pub fn flatten(path: &PathData, config: &FlattenConfig) -> Vec<Point2> {
    flatten_subpaths(path, config)
        .into_iter()
        .max_by(|a, b| polyline_length(a).total_cmp(&polyline_length(b)))
        .unwrap_or_default()
}

/// Sum of consecutive point distances.
pub fn polyline_length(points: &[Point2]) -> f64 {
    points
        .windows(2)
        .filter_map(|pair| match pair {
            [a, b] => Some(a.distance(*b)),
            _ => None,
        })
        .sum()
}

fn ensure_started(current: &mut Vec<Point2>, pen: Point2) {
    if current.is_empty() {
        current.push(pen);
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// distance to `a` when the chord has no length.
fn distance_to_chord(p: Point2, a: Point2, b: Point2) -> f64 {
    let chord = b - a;
    let len = chord.dot(chord).sqrt();
    if len <= f64::EPSILON {
        return p.distance(a);
    }
    let rel = p - a;
    (chord.x * rel.y - chord.y * rel.x).abs() / len
}

fn is_flat(p0: Point2, p1: Point2, p2: Point2, p3: Point2, tolerance: f64) -> bool {
    distance_to_chord(p1, p0, p3) <= tolerance && distance_to_chord(p2, p0, p3) <= tolerance
}

/// Appends the curve's points after `p0`, ending with `p3`.
fn subdivide(
    p0: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
    tolerance: f64,
    depth_left: u32,
    out: &mut Vec<Point2>,
) {
    if depth_left == 0 || is_flat(p0, p1, p2, p3, tolerance) {
        out.push(p3);
        return;
    }
    // split at t = 0.5
    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let p23 = p2.midpoint(p3);
    let p012 = p01.midpoint(p12);
    let p123 = p12.midpoint(p23);
    let mid = p012.midpoint(p123);
    subdivide(p0, p01, p012, mid, tolerance, depth_left - 1, out);
    subdivide(mid, p123, p23, p3, tolerance, depth_left - 1, out);
}
