//! Fuzzes the path data parser with arbitrary `d` attribute text.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_path_data
#![no_main]
use libfuzzer_sys::fuzz_target;
use openracing_track::{FlattenConfig, flatten_subpaths};
use openracing_track::svg::PathData;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(path) = PathData::parse(&text) {
        let _ = flatten_subpaths(&path, &FlattenConfig::default());
    }
});
