//! Fuzzes the F1 24 packet decoder and the state fold behind it.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_f1_packet
#![no_main]
use libfuzzer_sys::fuzz_target;
use openracing_telemetry_f1::{TelemetryState, decode_packet};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes; rejections are expected.
    let mut state = TelemetryState::new();
    if let Ok(packet) = decode_packet(data) {
        state.apply(packet);
    }
});
