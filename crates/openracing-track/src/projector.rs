//! World position to lap progress.

use serde::{Deserialize, Serialize};

use crate::align::AlignmentTransform;
use crate::geometry::TrackGeometry;
use crate::point::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Evenly spaced samples over the whole lap.
    pub coarse_samples: u32,
    /// Samples across the refinement window around the best coarse hit.
    pub refine_samples: u32,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            coarse_samples: 200,
            refine_samples: 40,
        }
    }
}

/// Two-pass nearest-sample search along a [`TrackGeometry`].
///
/// A coarse pass finds the best of `coarse_samples` evenly spaced points; a
/// fine pass then searches one coarse step either side of it. The window wraps
/// across the start/finish line, so the result is always in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProjector {
    config: ProjectorConfig,
}

impl TrackProjector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Progress of the map point nearest to `world` after mapping it through
    /// `transform`. Degenerate geometry or a non-finite position yields `0.0`.
    pub fn project(&self, geometry: &TrackGeometry, transform: &AlignmentTransform, world: Point2) -> f64 {
        let target = transform.apply(world);
        if geometry.len() < 2 || geometry.total_length() <= f64::EPSILON || !target.is_finite() {
            return 0.0;
        }

        let coarse = self.config.coarse_samples.max(1);
        let step = 1.0 / f64::from(coarse);
        let coarse_best = best_sample(geometry, target, (0..coarse).map(|i| f64::from(i) * step));

        let refine = self.config.refine_samples.max(1);
        let window_start = coarse_best - step;
        let fine_step = 2.0 * step / f64::from(refine);
        let fine_best = best_sample(
            geometry,
            target,
            (0..=refine).map(|i| window_start + f64::from(i) * fine_step),
        );
        wrap(fine_best)
    }
}

/// Candidate progress values are wrapped before sampling; the unwrapped value
/// of the nearest one is returned. The first of equal distances wins.
fn best_sample(geometry: &TrackGeometry, target: Point2, candidates: impl Iterator<Item = f64>) -> f64 {
    let mut best = (0.0, f64::INFINITY);
    for progress in candidates {
        let distance = geometry.point_at(wrap(progress)).distance_squared(target);
        if distance < best.1 {
            best = (progress, distance);
        }
    }
    best.0
}

fn wrap(progress: f64) -> f64 {
    let wrapped = progress.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> TrackGeometry {
        TrackGeometry::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ])
    }

    #[test]
    fn defaults() {
        let config = ProjectorConfig::default();
        assert_eq!(config.coarse_samples, 200);
        assert_eq!(config.refine_samples, 40);
    }

    #[test]
    fn points_on_the_outline_project_to_their_progress() {
        let track = square();
        let projector = TrackProjector::default();
        let identity = AlignmentTransform::identity();
        for expected in [0.1, 0.25, 0.33, 0.6, 0.9] {
            let p = track.point_at(expected);
            let progress = projector.project(&track, &identity, p);
            assert_abs_diff_eq!(progress, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn alignment_is_applied_before_projection() {
        let track = square();
        let projector = TrackProjector::default();
        let transform = AlignmentTransform {
            scale: 0.5,
            target_center: Point2::new(50.0, 50.0),
            ..AlignmentTransform::identity()
        };
        // world (100, -100) maps to map (100, 0)
        let progress = projector.project(&track, &transform, Point2::new(100.0, -100.0));
        assert_abs_diff_eq!(progress, 0.25, epsilon = 1e-3);
    }

    #[test]
    fn start_finish_line_wraps_into_unit_interval() {
        let track = square();
        let projector = TrackProjector::default();
        let identity = AlignmentTransform::identity();
        // just before the line, on the closing edge
        let before = projector.project(&track, &identity, Point2::new(0.0, 0.5));
        assert!((0.0..1.0).contains(&before));
        assert!(before > 0.99);
        let at_line = projector.project(&track, &identity, Point2::new(0.0, 0.0));
        assert!((0.0..1.0).contains(&at_line));
        assert!(!(0.001..0.999).contains(&at_line));
    }

    #[test]
    fn degenerate_input_projects_to_zero() {
        let projector = TrackProjector::default();
        let identity = AlignmentTransform::identity();
        let empty = TrackGeometry::from_points(&[]);
        assert_abs_diff_eq!(projector.project(&empty, &identity, Point2::new(3.0, 4.0)), 0.0);
        let single = TrackGeometry::from_points(&[Point2::new(1.0, 1.0)]);
        assert_abs_diff_eq!(projector.project(&single, &identity, Point2::new(3.0, 4.0)), 0.0);
        let track = square();
        assert_abs_diff_eq!(
            projector.project(&track, &identity, Point2::new(f64::NAN, 0.0)),
            0.0
        );
    }

    #[test]
    fn wrap_stays_below_one() {
        assert_abs_diff_eq!(wrap(-1e-18), 0.0);
        assert_abs_diff_eq!(wrap(1.0), 0.0);
        assert_abs_diff_eq!(wrap(-0.25), 0.75);
        assert_abs_diff_eq!(wrap(1.5), 0.5);
    }
}
