//! Car Telemetry packet (ID 6).

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::CAR_TELEMETRY_LAYOUT;
use crate::error::Result;

/// Telemetry data for a single car, 60 bytes.
///
/// Four-wheel arrays are ordered `[RL, RR, FL, FR]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTelemetryData {
    /// Speed in km/h.
    pub speed_kmh: u16,
    /// Throttle position 0.0–1.0.
    pub throttle: f32,
    /// Steering input −1.0–1.0.
    pub steer: f32,
    /// Brake position 0.0–1.0.
    pub brake: f32,
    /// Clutch 0–100.
    pub clutch: u8,
    /// Gear: −1 = reverse, 0 = neutral, 1–8 = forward.
    pub gear: i8,
    pub engine_rpm: u16,
    /// DRS deployed flag (0 = off, 1 = on).
    pub drs: u8,
    pub rev_lights_percent: u8,
    /// Bit 0 = leftmost LED.
    pub rev_lights_bit_value: u16,
    /// °C.
    pub brakes_temperature: [u16; 4],
    /// °C.
    pub tyres_surface_temperature: [u8; 4],
    /// °C.
    pub tyres_inner_temperature: [u8; 4],
    /// °C.
    pub engine_temperature: u16,
    /// PSI.
    pub tyres_pressure: [f32; 4],
    /// Driving surface id per wheel.
    pub surface_type: [u8; 4],
}

impl CarTelemetryData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            speed_kmh: r.u16_le()?, // 0-1
            throttle: r.f32_le()?, // 2-5
            steer: r.f32_le()?, // 6-9
            brake: r.f32_le()?, // 10-13
            clutch: r.u8()?, // 14
            gear: r.i8()?, // 15
            engine_rpm: r.u16_le()?, // 16-17
            drs: r.u8()?, // 18
            rev_lights_percent: r.u8()?, // 19
            rev_lights_bit_value: r.u16_le()?, // 20-21
            brakes_temperature: r.u16_le_array()?, // 22-29
            tyres_surface_temperature: r.u8_array()?, // 30-33
            tyres_inner_temperature: r.u8_array()?, // 34-37
            engine_temperature: r.u16_le()?, // 38-39
            tyres_pressure: r.f32_le_array()?, // 40-55
            surface_type: r.u8_array()?, // 56-59
        })
    }

    /// Speed converted to metres per second.
    pub fn speed_ms(&self) -> f32 {
        f32::from(self.speed_kmh) / 3.6
    }

    pub fn drs_active(&self) -> bool {
        self.drs != 0
    }
}

/// Car Telemetry frame plus its packet-level trailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTelemetryPacket {
    pub cars: VehicleSlots<CarTelemetryData>,
    /// 255 = MFD closed.
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary_player: u8,
    /// 0 = no suggestion.
    pub suggested_gear: i8,
}

impl CarTelemetryPacket {
    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        let mut trailer = ByteReader::at(raw, CAR_TELEMETRY_LAYOUT.trailer_offset());
        Ok(Self {
            cars: decode_slots(raw, &CAR_TELEMETRY_LAYOUT, CarTelemetryData::read),
            mfd_panel_index: trailer.u8()?,
            mfd_panel_index_secondary_player: trailer.u8()?,
            suggested_gear: trailer.i8()?,
        })
    }
}

/// Parse the telemetry entry for `slot` from a Car Telemetry packet.
pub fn parse_car_telemetry(raw: &[u8], slot: usize) -> Result<CarTelemetryData> {
    decode_slot(raw, &CAR_TELEMETRY_LAYOUT, slot, CarTelemetryData::read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CarTelemetrySpec, build_car_telemetry_packet};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn round_trip_speed_gear_rpm() -> TestResult {
        let spec = CarTelemetrySpec {
            speed_kmh: 312,
            throttle: 0.95,
            brake: 0.0,
            steer: -0.1,
            gear: 8,
            engine_rpm: 11_900,
            drs: 1,
            tyres_pressure: [23.1, 23.2, 22.4, 22.5],
        };
        let raw = build_car_telemetry_packet(2, &[(2, spec)]);
        let telem = parse_car_telemetry(&raw, 2)?;
        assert_eq!(telem.speed_kmh, 312);
        assert_eq!(telem.gear, 8);
        assert_eq!(telem.engine_rpm, 11_900);
        assert!(telem.drs_active());
        assert!((telem.throttle - 0.95).abs() < 1e-6);
        assert!((telem.steer + 0.1).abs() < 1e-6);
        assert!((telem.tyres_pressure[3] - 22.5).abs() < 1e-6);
        assert!((telem.speed_ms() - 86.666_67).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn reverse_gear() -> TestResult {
        let spec = CarTelemetrySpec {
            gear: -1,
            ..CarTelemetrySpec::default()
        };
        let raw = build_car_telemetry_packet(0, &[(0, spec)]);
        assert_eq!(parse_car_telemetry(&raw, 0)?.gear, -1);
        Ok(())
    }

    #[test]
    fn trailer_is_decoded() -> TestResult {
        let mut raw = build_car_telemetry_packet(0, &[]);
        let len = raw.len();
        if let Some(tail) = raw.get_mut(len - 3..) {
            tail.copy_from_slice(&[255, 4, 7]);
        }
        let packet = CarTelemetryPacket::decode(&raw)?;
        assert_eq!(packet.mfd_panel_index, 255);
        assert_eq!(packet.mfd_panel_index_secondary_player, 4);
        assert_eq!(packet.suggested_gear, 7);
        Ok(())
    }
}
