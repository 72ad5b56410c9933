//! Car Status packet (ID 7).

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::{CAR_STATUS_LAYOUT, tyre_compound_name};
use crate::error::Result;

/// Battery capacity: 4 MJ.
pub const ERS_MAX_STORE_ENERGY_J: f32 = 4_000_000.0;

/// Status data for a single car, 55 bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarStatusData {
    pub traction_control: u8,
    pub anti_lock_brakes: u8,
    pub fuel_mix: u8,
    /// Percent.
    pub front_brake_bias: u8,
    /// 1 = pit limiter on.
    pub pit_limiter_status: u8,
    /// kg.
    pub fuel_in_tank: f32,
    pub fuel_capacity: f32,
    /// Estimated laps of fuel left.
    pub fuel_remaining_laps: f32,
    pub max_rpm: u16,
    pub idle_rpm: u16,
    pub max_gears: u8,
    /// 1 = DRS may be used this lap.
    pub drs_allowed: u8,
    /// Metres until DRS opens, 0 = unavailable.
    pub drs_activation_distance: u16,
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    /// −1 invalid, 0 none, 1 green, 2 blue, 3 yellow.
    pub vehicle_fia_flags: i8,
    /// Watts.
    pub engine_power_ice: f32,
    /// Watts.
    pub engine_power_mguk: f32,
    /// Joules.
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
    /// Joules harvested this lap by the MGU-K.
    pub ers_harvested_this_lap_mguk: f32,
    /// Joules harvested this lap by the MGU-H.
    pub ers_harvested_this_lap_mguh: f32,
    /// Joules deployed this lap.
    pub ers_deployed_this_lap: f32,
    pub network_paused: u8,
}

impl CarStatusData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            traction_control: r.u8()?, // 0
            anti_lock_brakes: r.u8()?, // 1
            fuel_mix: r.u8()?, // 2
            front_brake_bias: r.u8()?, // 3
            pit_limiter_status: r.u8()?, // 4
            fuel_in_tank: r.f32_le()?, // 5-8
            fuel_capacity: r.f32_le()?, // 9-12
            fuel_remaining_laps: r.f32_le()?, // 13-16
            max_rpm: r.u16_le()?, // 17-18
            idle_rpm: r.u16_le()?, // 19-20
            max_gears: r.u8()?, // 21
            drs_allowed: r.u8()?, // 22
            drs_activation_distance: r.u16_le()?, // 23-24
            actual_tyre_compound: r.u8()?, // 25
            visual_tyre_compound: r.u8()?, // 26
            tyres_age_laps: r.u8()?, // 27
            vehicle_fia_flags: r.i8()?, // 28
            engine_power_ice: r.f32_le()?, // 29-32
            engine_power_mguk: r.f32_le()?, // 33-36
            ers_store_energy: r.f32_le()?, // 37-40
            ers_deploy_mode: r.u8()?, // 41
            ers_harvested_this_lap_mguk: r.f32_le()?, // 42-45
            ers_harvested_this_lap_mguh: r.f32_le()?, // 46-49
            ers_deployed_this_lap: r.f32_le()?, // 50-53
            network_paused: r.u8()?, // 54
        })
    }

    /// Store energy as a fraction of the 4 MJ battery, clamped to `[0, 1]`.
    pub fn ers_store_fraction(&self) -> f32 {
        (self.ers_store_energy / ERS_MAX_STORE_ENERGY_J).clamp(0.0, 1.0)
    }

    pub fn drs_available(&self) -> bool {
        self.drs_allowed != 0
    }

    pub fn tyre_compound_name(&self) -> &'static str {
        tyre_compound_name(self.actual_tyre_compound)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarStatusPacket {
    pub cars: VehicleSlots<CarStatusData>,
}

impl CarStatusPacket {
    pub(crate) fn decode(raw: &[u8]) -> Self {
        Self {
            cars: decode_slots(raw, &CAR_STATUS_LAYOUT, CarStatusData::read),
        }
    }
}

/// Parse the status entry for `slot` from a Car Status packet.
pub fn parse_car_status(raw: &[u8], slot: usize) -> Result<CarStatusData> {
    decode_slot(raw, &CAR_STATUS_LAYOUT, slot, CarStatusData::read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CarStatusSpec, build_car_status_packet};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn round_trip_fuel_ers_engine_power() -> TestResult {
        let spec = CarStatusSpec {
            fuel_in_tank: 28.5,
            ers_store_energy: 3_000_000.0,
            drs_allowed: 1,
            pit_limiter: 0,
            actual_tyre_compound: 17,
            tyres_age_laps: 6,
            max_rpm: 13_500,
            engine_power_ice: 560_000.0,
            engine_power_mguk: 120_000.0,
        };
        let raw = build_car_status_packet(5, &[(5, spec)]);
        let status = parse_car_status(&raw, 5)?;
        assert!((status.fuel_in_tank - 28.5).abs() < 1e-5);
        assert!((status.ers_store_energy - 3_000_000.0).abs() < 1.0);
        assert!((status.engine_power_ice - 560_000.0).abs() < 1.0);
        assert!((status.engine_power_mguk - 120_000.0).abs() < 1.0);
        assert!(status.drs_available());
        assert_eq!(status.max_rpm, 13_500);
        assert_eq!(status.tyres_age_laps, 6);
        assert_eq!(status.tyre_compound_name(), "C4");
        assert!((status.ers_store_fraction() - 0.75).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn ers_fraction_is_clamped() -> TestResult {
        let spec = CarStatusSpec {
            ers_store_energy: 9_000_000.0,
            ..CarStatusSpec::default()
        };
        let raw = build_car_status_packet(0, &[(0, spec)]);
        let status = parse_car_status(&raw, 0)?;
        assert!((status.ers_store_fraction() - 1.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn truncated_packet_rejects_tail_slot() {
        let raw = build_car_status_packet(0, &[]);
        let truncated = raw.get(..raw.len() - 1).unwrap_or_default();
        assert!(parse_car_status(truncated, 21).is_err());
        assert!(parse_car_status(truncated, 20).is_ok());
    }
}
