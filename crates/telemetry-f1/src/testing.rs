//! Byte-exact packet builders.
//!
//! Every builder produces a datagram of exactly the catalog length for
//! packet format 2024, with zeroed slots except those passed in. Used by the
//! unit tests, the integration tests and the replay tooling.

use crate::catalog::{
    CAR_DAMAGE_LAYOUT, CAR_STATUS_LAYOUT, CAR_TELEMETRY_LAYOUT, HEADER_SIZE, LAP_DATA_LAYOUT,
    MOTION_LAYOUT, NO_SECONDARY_PLAYER, PACKET_FORMAT_2024, PARTICIPANTS_LAYOUT, PacketKind,
    RecordLayout,
};
use crate::header::PacketHeader;

/// Header for `packet_id` with the given format and player slot.
pub fn build_header_bytes(packet_format: u16, packet_id: u8, player_index: u8) -> Vec<u8> {
    PacketHeader {
        packet_format,
        game_year: 24,
        game_major_version: 1,
        game_minor_version: 0,
        packet_version: 1,
        packet_id,
        session_uid: 0xDEAD_BEEF,
        session_time: 0.0,
        frame_identifier: 0,
        overall_frame_identifier: 0,
        player_car_index: player_index,
        secondary_player_car_index: NO_SECONDARY_PLAYER,
    }
    .to_bytes()
}

/// Zero-filled datagram of the catalog length with a valid header.
pub fn build_blank_packet(kind: PacketKind, player_index: u8) -> Vec<u8> {
    let mut buf = build_header_bytes(PACKET_FORMAT_2024, kind.id(), player_index);
    buf.resize(kind.expected_len(), 0);
    buf
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    if let Some(dst) = buf.get_mut(offset..offset + bytes.len()) {
        dst.copy_from_slice(bytes);
    }
}

fn build_slotted<T>(
    kind: PacketKind,
    layout: &RecordLayout,
    player_index: u8,
    cars: &[(usize, T)],
    write: impl Fn(&T, &mut Vec<u8>),
) -> Vec<u8> {
    let mut buf = build_blank_packet(kind, player_index);
    for (slot, spec) in cars {
        let Some(offset) = layout.slot_offset(*slot) else {
            continue;
        };
        let mut record = Vec::with_capacity(layout.width);
        write(spec, &mut record);
        record.resize(layout.width, 0);
        put(&mut buf, offset, &record);
    }
    buf
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarMotionSpec {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub forward: [i16; 3],
    pub g_force_lateral: f32,
    pub yaw: f32,
}

pub fn build_motion_packet(player_index: u8, cars: &[(usize, CarMotionSpec)]) -> Vec<u8> {
    build_slotted(PacketKind::Motion, &MOTION_LAYOUT, player_index, cars, |spec, out| {
        for v in spec.position.iter().chain(&spec.velocity) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for d in &spec.forward {
            out.extend_from_slice(&d.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; 6]); // right dir
        out.extend_from_slice(&spec.g_force_lateral.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]); // longitudinal, vertical
        out.extend_from_slice(&spec.yaw.to_le_bytes());
    })
}

/// Motion packet with every slot in `positions` placed at world `(x, y, z)`.
pub fn build_positions_packet(player_index: u8, positions: &[(usize, [f32; 3])]) -> Vec<u8> {
    let cars: Vec<(usize, CarMotionSpec)> = positions
        .iter()
        .map(|&(slot, position)| {
            (
                slot,
                CarMotionSpec {
                    position,
                    ..CarMotionSpec::default()
                },
            )
        })
        .collect();
    build_motion_packet(player_index, &cars)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarTelemetrySpec {
    pub speed_kmh: u16,
    pub throttle: f32,
    pub brake: f32,
    pub steer: f32,
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
    pub tyres_pressure: [f32; 4],
}

pub fn build_car_telemetry_packet(
    player_index: u8,
    cars: &[(usize, CarTelemetrySpec)],
) -> Vec<u8> {
    build_slotted(
        PacketKind::CarTelemetry,
        &CAR_TELEMETRY_LAYOUT,
        player_index,
        cars,
        |spec, out| {
            out.extend_from_slice(&spec.speed_kmh.to_le_bytes()); // 0-1
            out.extend_from_slice(&spec.throttle.to_le_bytes()); // 2-5
            out.extend_from_slice(&spec.steer.to_le_bytes()); // 6-9
            out.extend_from_slice(&spec.brake.to_le_bytes()); // 10-13
            out.push(0); // clutch
            out.extend_from_slice(&spec.gear.to_le_bytes()); // 15
            out.extend_from_slice(&spec.engine_rpm.to_le_bytes()); // 16-17
            out.push(spec.drs); // 18
            out.resize(40, 0);
            for p in &spec.tyres_pressure {
                out.extend_from_slice(&p.to_le_bytes()); // 40-55
            }
        },
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarStatusSpec {
    pub fuel_in_tank: f32,
    pub ers_store_energy: f32,
    pub drs_allowed: u8,
    pub pit_limiter: u8,
    pub actual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    pub max_rpm: u16,
    pub engine_power_ice: f32,
    pub engine_power_mguk: f32,
}

pub fn build_car_status_packet(player_index: u8, cars: &[(usize, CarStatusSpec)]) -> Vec<u8> {
    build_slotted(
        PacketKind::CarStatus,
        &CAR_STATUS_LAYOUT,
        player_index,
        cars,
        |spec, out| {
            out.extend_from_slice(&[0, 0, 0, 0]); // TC, ABS, fuel mix, brake bias
            out.push(spec.pit_limiter); // 4
            out.extend_from_slice(&spec.fuel_in_tank.to_le_bytes()); // 5-8
            out.extend_from_slice(&110.0f32.to_le_bytes()); // 9-12 capacity
            out.extend_from_slice(&0.0f32.to_le_bytes()); // 13-16
            out.extend_from_slice(&spec.max_rpm.to_le_bytes()); // 17-18
            out.extend_from_slice(&4_000u16.to_le_bytes()); // 19-20 idle
            out.push(8); // 21 max gears
            out.push(spec.drs_allowed); // 22
            out.extend_from_slice(&0u16.to_le_bytes()); // 23-24
            out.push(spec.actual_tyre_compound); // 25
            out.push(spec.actual_tyre_compound); // 26
            out.push(spec.tyres_age_laps); // 27
            out.push(0); // 28 FIA flags
            out.extend_from_slice(&spec.engine_power_ice.to_le_bytes()); // 29-32
            out.extend_from_slice(&spec.engine_power_mguk.to_le_bytes()); // 33-36
            out.extend_from_slice(&spec.ers_store_energy.to_le_bytes()); // 37-40
        },
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LapDataSpec {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_ms: u32,
    pub sector2_ms: u32,
    pub lap_distance: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
}

fn split_time(ms: u32) -> [u8; 3] {
    let minutes = u8::try_from(ms / 60_000).unwrap_or(u8::MAX);
    let millis = u16::try_from(ms % 60_000).unwrap_or(u16::MAX);
    let [lo, hi] = millis.to_le_bytes();
    [lo, hi, minutes]
}

pub fn build_lap_data_packet(player_index: u8, cars: &[(usize, LapDataSpec)]) -> Vec<u8> {
    let mut buf = build_slotted(
        PacketKind::LapData,
        &LAP_DATA_LAYOUT,
        player_index,
        cars,
        |spec, out| {
            out.extend_from_slice(&spec.last_lap_time_ms.to_le_bytes()); // 0-3
            out.extend_from_slice(&spec.current_lap_time_ms.to_le_bytes()); // 4-7
            out.extend_from_slice(&split_time(spec.sector1_ms)); // 8-10
            out.extend_from_slice(&split_time(spec.sector2_ms)); // 11-13
            out.extend_from_slice(&[0u8; 6]); // 14-19 deltas
            out.extend_from_slice(&spec.lap_distance.to_le_bytes()); // 20-23
            out.extend_from_slice(&[0u8; 8]); // 24-31
            out.push(spec.car_position); // 32
            out.push(spec.current_lap_num); // 33
        },
    );
    put(&mut buf, LAP_DATA_LAYOUT.trailer_offset(), &[255, 255]);
    buf
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarDamageSpec {
    pub tyres_wear: [f32; 4],
    pub front_left_wing_damage: u8,
    pub engine_damage: u8,
    pub drs_fault: u8,
}

pub fn build_car_damage_packet(player_index: u8, cars: &[(usize, CarDamageSpec)]) -> Vec<u8> {
    build_slotted(
        PacketKind::CarDamage,
        &CAR_DAMAGE_LAYOUT,
        player_index,
        cars,
        |spec, out| {
            for w in &spec.tyres_wear {
                out.extend_from_slice(&w.to_le_bytes()); // 0-15
            }
            out.resize(24, 0);
            out.push(spec.front_left_wing_damage); // 24
            out.resize(30, 0);
            out.push(spec.drs_fault); // 30
            out.push(0); // 31
            out.push(0); // 32
            out.push(spec.engine_damage); // 33
        },
    )
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantSpec {
    pub name: String,
    pub race_number: u8,
    pub team_id: u8,
    pub ai_controlled: bool,
}

impl ParticipantSpec {
    pub fn named(name: &str, race_number: u8, team_id: u8) -> Self {
        Self {
            name: name.to_owned(),
            race_number,
            team_id,
            ai_controlled: false,
        }
    }
}

pub fn build_participants_packet(num_active: u8, cars: &[(usize, ParticipantSpec)]) -> Vec<u8> {
    let mut buf = build_slotted(
        PacketKind::Participants,
        &PARTICIPANTS_LAYOUT,
        0,
        cars,
        |spec, out| {
            out.push(u8::from(spec.ai_controlled)); // 0
            out.extend_from_slice(&[0, 0]); // driver, network id
            out.push(spec.team_id); // 3
            out.push(0); // 4
            out.push(spec.race_number); // 5
            out.push(0); // 6
            let mut name = [0u8; 48];
            for (dst, src) in name.iter_mut().zip(spec.name.bytes().take(47)) {
                *dst = src;
            }
            out.extend_from_slice(&name); // 7-54
            out.push(1); // 55 public telemetry
        },
    );
    put(&mut buf, HEADER_SIZE, &[num_active]);
    buf
}

#[derive(Debug, Clone, Default)]
pub struct SessionSpec {
    pub track_id: i8,
    pub track_length: u16,
    pub total_laps: u8,
    pub session_type: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub safety_car_status: u8,
    /// `(zone_start, zone_flag)`.
    pub marshal_zones: Vec<(f32, i8)>,
    /// Rain percentage per forecast sample.
    pub forecast_rain: Vec<u8>,
}

pub fn build_session_packet(spec: &SessionSpec) -> Vec<u8> {
    let mut buf = build_blank_packet(PacketKind::Session, 0);
    let body = HEADER_SIZE;
    put(&mut buf, body + 1, &spec.track_temperature.to_le_bytes());
    put(&mut buf, body + 2, &spec.air_temperature.to_le_bytes());
    put(&mut buf, body + 3, &[spec.total_laps]);
    put(&mut buf, body + 4, &spec.track_length.to_le_bytes());
    put(&mut buf, body + 6, &[spec.session_type]);
    put(&mut buf, body + 7, &spec.track_id.to_le_bytes());

    let zones = u8::try_from(spec.marshal_zones.len().min(21)).unwrap_or(21);
    put(&mut buf, body + 18, &[zones]);
    for (idx, (start, flag)) in spec.marshal_zones.iter().take(21).enumerate() {
        let offset = body + 19 + idx * 5;
        put(&mut buf, offset, &start.to_le_bytes());
        put(&mut buf, offset + 4, &flag.to_le_bytes());
    }

    put(&mut buf, body + 124, &[spec.safety_car_status]);
    let samples = u8::try_from(spec.forecast_rain.len().min(64)).unwrap_or(64);
    put(&mut buf, body + 126, &[samples]);
    for (idx, rain) in spec.forecast_rain.iter().take(64).enumerate() {
        put(&mut buf, body + 127 + idx * 8 + 7, &[*rain]);
    }
    buf
}

/// Event packet with a four-letter code and up to 12 detail bytes.
pub fn build_event_packet(code: [u8; 4], details: &[u8]) -> Vec<u8> {
    let mut buf = build_blank_packet(PacketKind::Event, 0);
    put(&mut buf, HEADER_SIZE, &code);
    let details = details.get(..details.len().min(12)).unwrap_or_default();
    put(&mut buf, HEADER_SIZE + 4, details);
    buf
}
