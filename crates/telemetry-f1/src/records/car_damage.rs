//! Car Damage packet (ID 10).

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::CAR_DAMAGE_LAYOUT;
use crate::error::Result;

/// Damage data for a single car, 42 bytes. Percentages unless noted;
/// four-wheel arrays are `[RL, RR, FL, FR]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDamageData {
    pub tyres_wear: [f32; 4],
    pub tyres_damage: [u8; 4],
    pub brakes_damage: [u8; 4],
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub floor_damage: u8,
    pub diffuser_damage: u8,
    pub sidepod_damage: u8,
    /// 0 = OK, 1 = fault.
    pub drs_fault: u8,
    /// 0 = OK, 1 = fault.
    pub ers_fault: u8,
    pub gear_box_damage: u8,
    pub engine_damage: u8,
    pub engine_mguh_wear: u8,
    pub engine_es_wear: u8,
    pub engine_ce_wear: u8,
    pub engine_ice_wear: u8,
    pub engine_mguk_wear: u8,
    pub engine_tc_wear: u8,
    pub engine_blown: u8,
    pub engine_seized: u8,
}

impl CarDamageData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            tyres_wear: r.f32_le_array()?, // 0-15
            tyres_damage: r.u8_array()?, // 16-19
            brakes_damage: r.u8_array()?, // 20-23
            front_left_wing_damage: r.u8()?, // 24
            front_right_wing_damage: r.u8()?, // 25
            rear_wing_damage: r.u8()?, // 26
            floor_damage: r.u8()?, // 27
            diffuser_damage: r.u8()?, // 28
            sidepod_damage: r.u8()?, // 29
            drs_fault: r.u8()?, // 30
            ers_fault: r.u8()?, // 31
            gear_box_damage: r.u8()?, // 32
            engine_damage: r.u8()?, // 33
            engine_mguh_wear: r.u8()?, // 34
            engine_es_wear: r.u8()?, // 35
            engine_ce_wear: r.u8()?, // 36
            engine_ice_wear: r.u8()?, // 37
            engine_mguk_wear: r.u8()?, // 38
            engine_tc_wear: r.u8()?, // 39
            engine_blown: r.u8()?, // 40
            engine_seized: r.u8()?, // 41
        })
    }

    /// Any fault flag or terminal engine state set.
    pub fn has_fault(&self) -> bool {
        self.drs_fault != 0 || self.ers_fault != 0 || self.engine_blown != 0 || self.engine_seized != 0
    }

    /// Highest tyre wear across the four corners.
    pub fn max_tyre_wear(&self) -> f32 {
        self.tyres_wear.iter().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDamagePacket {
    pub cars: VehicleSlots<CarDamageData>,
}

impl CarDamagePacket {
    pub(crate) fn decode(raw: &[u8]) -> Self {
        Self {
            cars: decode_slots(raw, &CAR_DAMAGE_LAYOUT, CarDamageData::read),
        }
    }
}

/// Parse the damage entry for `slot` from a Car Damage packet.
pub fn parse_car_damage(raw: &[u8], slot: usize) -> Result<CarDamageData> {
    decode_slot(raw, &CAR_DAMAGE_LAYOUT, slot, CarDamageData::read)
}
