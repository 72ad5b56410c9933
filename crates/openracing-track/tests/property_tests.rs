//! Property tests for path parsing, flattening and projection.

use openracing_track::svg::PathData;
use openracing_track::{
    AlignmentTransform, FlattenConfig, Point2, TrackGeometry, TrackProjector, flatten_subpaths,
};
use proptest::prelude::*;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn polygon_strategy() -> impl Strategy<Value = Vec<Point2>> {
    // star-shaped polygon: sorted angles with random radii around the origin
    prop::collection::vec((0.0f64..std::f64::consts::TAU, 50.0f64..500.0), 3..40).prop_map(
        |mut polar| {
            polar.sort_by(|a, b| a.0.total_cmp(&b.0));
            polar
                .into_iter()
                .map(|(angle, radius)| Point2::new(radius * angle.cos(), radius * angle.sin()))
                .collect()
        },
    )
}

/// Runs `parse` on a worker thread; false if it panics or is still running
/// after two seconds.
fn returns_promptly(parse: impl FnOnce() -> bool + Send + 'static) -> bool {
    let (tx, rx) = mpsc::channel();
    let _worker = thread::spawn(move || tx.send(parse()));
    rx.recv_timeout(Duration::from_secs(2)).is_ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn path_parser_always_returns(text in "[A-Za-z0-9 ,.+\\-#;()]{0,200}") {
        prop_assert!(returns_promptly(move || PathData::parse(&text).is_ok()));
    }

    #[test]
    fn document_parser_always_returns(
        d in "[MLCQAZRB0-9 .#-]{0,80}",
        transform in "[a-z0-9(), .-]{0,24}",
        extra in "[a-z<>/=\" ]{0,40}",
    ) {
        let svg = format!(
            r#"<svg><g transform="{transform}"><path d="{d}"/></g>{extra}<path d="M0 0 L1 1"/></svg>"#
        );
        prop_assert!(returns_promptly(move || TrackGeometry::from_svg(&svg).is_ok()));
    }

    #[test]
    fn point_at_endpoints_match_outline(points in polygon_strategy()) {
        let track = TrackGeometry::from_points(&points);
        prop_assume!(track.len() >= 3);
        let first = track.points().first().copied();
        let last = track.points().last().copied();
        prop_assert_eq!(Some(track.point_at(0.0)), first);
        prop_assert_eq!(Some(track.point_at(1.0)), last);
    }

    #[test]
    fn point_at_is_continuous(points in polygon_strategy()) {
        let track = TrackGeometry::from_points(&points);
        prop_assume!(track.total_length() > 1.0);
        let steps = 2000_u32;
        let max_jump = track.total_length() / f64::from(steps) + 1e-9;
        let mut previous = track.point_at(0.0);
        for i in 1..=steps {
            let current = track.point_at(f64::from(i) / f64::from(steps));
            prop_assert!(previous.distance(current) <= max_jump);
            previous = current;
        }
    }

    #[test]
    fn closest_progress_stable_under_perturbation(
        points in polygon_strategy(),
        progress in 0.01f64..0.99,
        dx in -1e-3f64..1e-3,
        dy in -1e-3f64..1e-3,
    ) {
        let track = TrackGeometry::from_points(&points);
        prop_assume!(track.total_length() > 1.0);
        let on_track = track.point_at(progress);
        let base = track.progress_of_closest(on_track);
        let nudged = track.progress_of_closest(Point2::new(on_track.x + dx, on_track.y + dy));
        // a nudge can only move the foot point a little along a single segment
        let moved = track.point_at(base).distance(track.point_at(nudged));
        prop_assert!(moved <= 0.01, "moved {moved}");
    }

    #[test]
    fn projection_is_in_unit_interval(
        points in polygon_strategy(),
        x in -1.0e4f64..1.0e4,
        y in -1.0e4f64..1.0e4,
    ) {
        let track = TrackGeometry::from_points(&points);
        let progress = TrackProjector::default().project(
            &track,
            &AlignmentTransform::identity(),
            Point2::new(x, y),
        );
        prop_assert!((0.0..1.0).contains(&progress));
    }

    #[test]
    fn flattened_points_stay_inside_control_hull_bounds(
        coords in prop::array::uniform8(-1000.0f64..1000.0),
    ) {
        let [x0, y0, x1, y1, x2, y2, x3, y3] = coords;
        let d = format!("M{x0} {y0} C{x1} {y1} {x2} {y2} {x3} {y3}");
        let path = PathData::parse(&d).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let bounds = path.control_bounds();
        for sub in flatten_subpaths(&path, &FlattenConfig::default()) {
            for p in sub {
                prop_assert!(p.x >= bounds.min.x - 1e-9 && p.x <= bounds.max.x + 1e-9);
                prop_assert!(p.y >= bounds.min.y - 1e-9 && p.y <= bounds.max.y + 1e-9);
            }
        }
    }
}
