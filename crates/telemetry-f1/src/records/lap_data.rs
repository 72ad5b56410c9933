//! Lap Data packet (ID 2).

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::LAP_DATA_LAYOUT;
use crate::error::Result;

/// A duration the game splits into whole minutes plus a millisecond part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTime {
    pub minutes: u8,
    pub millis: u16,
}

impl SplitTime {
    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let millis = r.u16_le()?;
        let minutes = r.u8()?;
        Ok(Self { minutes, millis })
    }

    pub fn total_ms(&self) -> u32 {
        u32::from(self.minutes) * 60_000 + u32::from(self.millis)
    }
}

/// Lap data for a single car, 57 bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapData {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_time: SplitTime,
    pub sector2_time: SplitTime,
    pub delta_to_car_in_front: SplitTime,
    pub delta_to_race_leader: SplitTime,
    /// Metres around the current lap; negative before crossing the line.
    pub lap_distance: f32,
    /// Metres since the session started.
    pub total_distance: f32,
    /// Seconds.
    pub safety_car_delta: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
    /// 0 none, 1 pitting, 2 in pit area.
    pub pit_status: u8,
    pub num_pit_stops: u8,
    /// 0 = sector 1.
    pub sector: u8,
    pub current_lap_invalid: u8,
    /// Seconds of accumulated time penalties.
    pub penalties: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub num_unserved_drive_through_pens: u8,
    pub num_unserved_stop_go_pens: u8,
    pub grid_position: u8,
    /// 0 garage, 1 flying lap, 2 in lap, 3 out lap, 4 on track.
    pub driver_status: u8,
    /// 0 invalid, 1 inactive, 2 active, 3 finished, 4 DNF, 5 DSQ, 6 not classified, 7 retired.
    pub result_status: u8,
    pub pit_lane_timer_active: u8,
    pub pit_lane_time_in_lane_ms: u16,
    pub pit_stop_timer_ms: u16,
    pub pit_stop_should_serve_pen: u8,
    /// km/h.
    pub speed_trap_fastest_speed: f32,
    /// 255 = not set.
    pub speed_trap_fastest_lap: u8,
}

impl LapData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            last_lap_time_ms: r.u32_le()?, // 0-3
            current_lap_time_ms: r.u32_le()?, // 4-7
            sector1_time: SplitTime::read(r)?, // 8-10
            sector2_time: SplitTime::read(r)?, // 11-13
            delta_to_car_in_front: SplitTime::read(r)?, // 14-16
            delta_to_race_leader: SplitTime::read(r)?, // 17-19
            lap_distance: r.f32_le()?, // 20-23
            total_distance: r.f32_le()?, // 24-27
            safety_car_delta: r.f32_le()?, // 28-31
            car_position: r.u8()?, // 32
            current_lap_num: r.u8()?, // 33
            pit_status: r.u8()?, // 34
            num_pit_stops: r.u8()?, // 35
            sector: r.u8()?, // 36
            current_lap_invalid: r.u8()?, // 37
            penalties: r.u8()?, // 38
            total_warnings: r.u8()?, // 39
            corner_cutting_warnings: r.u8()?, // 40
            num_unserved_drive_through_pens: r.u8()?, // 41
            num_unserved_stop_go_pens: r.u8()?, // 42
            grid_position: r.u8()?, // 43
            driver_status: r.u8()?, // 44
            result_status: r.u8()?, // 45
            pit_lane_timer_active: r.u8()?, // 46
            pit_lane_time_in_lane_ms: r.u16_le()?, // 47-48
            pit_stop_timer_ms: r.u16_le()?, // 49-50
            pit_stop_should_serve_pen: r.u8()?, // 51
            speed_trap_fastest_speed: r.f32_le()?, // 52-55
            speed_trap_fastest_lap: r.u8()?, // 56
        })
    }

    pub fn lap_invalid(&self) -> bool {
        self.current_lap_invalid != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapDataPacket {
    pub cars: VehicleSlots<LapData>,
    /// 255 = none.
    pub time_trial_pb_car_idx: u8,
    /// 255 = none.
    pub time_trial_rival_car_idx: u8,
}

impl LapDataPacket {
    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        let mut trailer = ByteReader::at(raw, LAP_DATA_LAYOUT.trailer_offset());
        Ok(Self {
            cars: decode_slots(raw, &LAP_DATA_LAYOUT, LapData::read),
            time_trial_pb_car_idx: trailer.u8()?,
            time_trial_rival_car_idx: trailer.u8()?,
        })
    }
}

/// Parse the lap data entry for `slot` from a Lap Data packet.
pub fn parse_lap_data(raw: &[u8], slot: usize) -> Result<LapData> {
    decode_slot(raw, &LAP_DATA_LAYOUT, slot, LapData::read)
}
