//! Decode one captured datagram.

use std::path::Path;

use anyhow::{Context, Result};
use openracing_telemetry_f1::{PacketDecoder, TelemetryPacket};
use serde::Serialize;

use crate::commands::print_json;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    file: String,
    bytes: usize,
    kind: Option<String>,
    packet: &'a TelemetryPacket,
}

pub fn execute(file: &Path) -> Result<()> {
    let raw = std::fs::read(file)
        .map_err(CliError::from)
        .with_context(|| format!("reading {}", file.display()))?;
    let packet = decode_bytes(&raw)?;
    let kind = packet.kind().map(|k| k.to_string());
    print_json(&DecodeOutput {
        file: file.display().to_string(),
        bytes: raw.len(),
        kind,
        packet: &packet,
    })?;
    Ok(())
}

/// Decode with the default (2024) packet format.
pub fn decode_bytes(raw: &[u8]) -> Result<TelemetryPacket, CliError> {
    Ok(PacketDecoder::default().decode(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openracing_telemetry_f1::testing::{CarTelemetrySpec, build_car_telemetry_packet};
    use openracing_telemetry_f1::{PacketBody, PacketKind};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn decodes_car_telemetry_capture() -> TestResult {
        let raw = build_car_telemetry_packet(
            0,
            &[(
                0,
                CarTelemetrySpec {
                    speed_kmh: 287,
                    gear: 7,
                    ..CarTelemetrySpec::default()
                },
            )],
        );
        let packet = decode_bytes(&raw)?;
        assert_eq!(packet.kind(), Some(PacketKind::CarTelemetry));
        assert!(matches!(packet.body, PacketBody::CarTelemetry(_)));
        Ok(())
    }

    #[test]
    fn truncated_capture_is_a_decode_error() {
        let result = decode_bytes(&[0u8; 10]);
        assert!(matches!(result, Err(CliError::Decode(_))));
    }
}
