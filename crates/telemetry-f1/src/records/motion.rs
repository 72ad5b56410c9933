//! Motion packet (ID 0): world-space kinematics for every car.

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::MOTION_LAYOUT;
use crate::error::Result;

/// Scale of the normalised direction vectors sent as `i16`.
const DIRECTION_SCALE: f32 = 32767.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(r.f32_le()?, r.f32_le()?, r.f32_le()?))
    }

    fn read_direction(r: &mut ByteReader<'_>) -> Result<Self> {
        let x = f32::from(r.i16_le()?) / DIRECTION_SCALE;
        let y = f32::from(r.i16_le()?) / DIRECTION_SCALE;
        let z = f32::from(r.i16_le()?) / DIRECTION_SCALE;
        Ok(Self::new(x, y, z))
    }
}

/// CarMotionData, 60 bytes per car.
///
/// The game's world frame is Y-up; the ground plane is X/Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarMotionData {
    /// World position in metres.
    pub world_position: Vector3,
    /// Velocity in metres per second.
    pub world_velocity: Vector3,
    /// Unit forward direction.
    pub world_forward_dir: Vector3,
    /// Unit right direction.
    pub world_right_dir: Vector3,
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
    /// Radians.
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl CarMotionData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            world_position: Vector3::read(r)?, // 0-11
            world_velocity: Vector3::read(r)?, // 12-23
            world_forward_dir: Vector3::read_direction(r)?, // 24-29
            world_right_dir: Vector3::read_direction(r)?, // 30-35
            g_force_lateral: r.f32_le()?, // 36-39
            g_force_longitudinal: r.f32_le()?, // 40-43
            g_force_vertical: r.f32_le()?, // 44-47
            yaw: r.f32_le()?, // 48-51
            pitch: r.f32_le()?, // 52-55
            roll: r.f32_le()?, // 56-59
        })
    }

    /// Position on the ground plane as `(x, z)`.
    pub fn ground_position(&self) -> (f32, f32) {
        (self.world_position.x, self.world_position.z)
    }
}

/// Motion frame for all 22 slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPacket {
    pub cars: VehicleSlots<CarMotionData>,
}

impl MotionPacket {
    pub(crate) fn decode(raw: &[u8]) -> Self {
        Self {
            cars: decode_slots(raw, &MOTION_LAYOUT, CarMotionData::read),
        }
    }
}

/// Parse the motion entry for `slot` from a Motion packet.
pub fn parse_car_motion(raw: &[u8], slot: usize) -> Result<CarMotionData> {
    decode_slot(raw, &MOTION_LAYOUT, slot, CarMotionData::read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CarMotionSpec, build_motion_packet};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn decodes_position_velocity_and_directions() -> TestResult {
        let raw = build_motion_packet(
            4,
            &[(
                4,
                CarMotionSpec {
                    position: [120.5, 3.0, -842.25],
                    velocity: [70.0, 0.0, 1.0],
                    forward: [32767, 0, 0],
                    g_force_lateral: 1.25,
                    yaw: 0.5,
                },
            )],
        );
        let car = parse_car_motion(&raw, 4)?;
        assert!((car.world_position.x - 120.5).abs() < 1e-6);
        assert!((car.world_position.z + 842.25).abs() < 1e-6);
        assert!((car.world_velocity.x - 70.0).abs() < 1e-6);
        assert!((car.world_forward_dir.x - 1.0).abs() < 1e-6);
        assert!((car.g_force_lateral - 1.25).abs() < 1e-6);
        assert!((car.yaw - 0.5).abs() < 1e-6);
        assert_eq!(car.ground_position(), (120.5, -842.25));
        Ok(())
    }

    #[test]
    fn zeroed_slots_still_decode() {
        let raw = build_motion_packet(0, &[]);
        let packet = MotionPacket::decode(&raw);
        assert_eq!(packet.cars.decoded_count(), 22);
        let origin = packet.cars.get(21).map(|c| c.world_position);
        assert_eq!(origin, Some(Vector3::default()));
    }
}
