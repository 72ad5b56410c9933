//! Integration tests for the trackctl binary.

use assert_cmd::Command;
use openracing_telemetry_f1::testing::{CarTelemetrySpec, build_car_telemetry_packet};
use predicates::prelude::*;
use serde_json::Value;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn trackctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("trackctl")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn outline_prints_geometry_json() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("oval.svg");
    std::fs::write(
        &path,
        r#"<svg viewBox="0 0 200 100"><path d="M50 0 H150 A50 50 0 0 1 150 100 H50 A50 50 0 0 1 50 0 Z"/></svg>"#,
    )?;

    let output = trackctl()?
        .args(["outline", "--samples", "10"])
        .arg(&path)
        .output()?;
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout)?;
    let samples = json.get("samples").and_then(Value::as_array);
    assert_eq!(samples.map(Vec::len), Some(10));
    let length = json
        .get("total_length")
        .and_then(Value::as_f64)
        .unwrap_or_default();
    let expected = 200.0 + std::f64::consts::PI * 100.0;
    assert!((length - expected).abs() < expected * 1e-3, "length {length}");
    Ok(())
}

#[test]
fn decode_prints_packet_json() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("telemetry.bin");
    let raw = build_car_telemetry_packet(
        3,
        &[(
            3,
            CarTelemetrySpec {
                speed_kmh: 301,
                gear: 8,
                ..CarTelemetrySpec::default()
            },
        )],
    );
    std::fs::write(&path, raw)?;

    trackctl()?
        .arg("decode")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"CarTelemetry\""))
        .stdout(predicate::str::contains("301"));
    Ok(())
}

#[test]
fn decode_rejects_truncated_capture() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("short.bin");
    std::fs::write(&path, [0u8; 12])?;

    trackctl()?
        .arg("decode")
        .arg(&path)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Error"));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() -> TestResult {
    trackctl()?
        .args(["outline", "/nonexistent/track.svg"])
        .assert()
        .code(3);
    Ok(())
}
