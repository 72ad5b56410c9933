//! Fuzzes SVG outline extraction, flattening and geometry construction.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_svg_outline
#![no_main]
use libfuzzer_sys::fuzz_target;
use openracing_track::{Point2, TrackGeometry};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(track) = TrackGeometry::from_svg(&text) {
        let _ = track.point_at(0.5);
        let _ = track.progress_of_closest(Point2::new(1.0, 1.0));
    }
});
