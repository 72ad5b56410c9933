//! Property-based fuzz tests for F1 telemetry packet decoding.
//!
//! Ensures the decoder never panics on arbitrary or random input.

use openracing_telemetry_f1::testing::build_blank_packet;
use openracing_telemetry_f1::{
    DecodeError, HEADER_SIZE, PacketHeader, PacketKind, decode_packet,
};
use proptest::prelude::*;

const F1_PACKET_MAX: usize = 2048;

fn header_strategy() -> impl Strategy<Value = PacketHeader> {
    (
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>()),
        any::<u64>(),
        -1.0e6f32..1.0e6f32,
        (any::<u32>(), any::<u32>()),
        (any::<u8>(), any::<u8>()),
    )
        .prop_map(
            |((year, major, minor, version, id), uid, time, (frame, overall), (player, second))| {
                PacketHeader {
                    packet_format: 2024,
                    game_year: year,
                    game_major_version: major,
                    game_minor_version: minor,
                    packet_version: version,
                    packet_id: id,
                    session_uid: uid,
                    session_time: time,
                    frame_identifier: frame,
                    overall_frame_identifier: overall,
                    player_car_index: player,
                    secondary_player_car_index: second,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary random bytes of any length must never cause a panic.
    #[test]
    fn prop_random_bytes_no_panic(
        data in proptest::collection::vec(any::<u8>(), 0..F1_PACKET_MAX)
    ) {
        let _ = decode_packet(&data);
    }

    /// Anything shorter than the header is rejected as too short.
    #[test]
    fn prop_short_buffers_rejected(
        data in proptest::collection::vec(any::<u8>(), 1..HEADER_SIZE)
    ) {
        let len = data.len();
        prop_assert_eq!(
            decode_packet(&data),
            Err(DecodeError::TooShort { len, min: HEADER_SIZE })
        );
    }

    /// Any header written to the wire decodes back field for field.
    #[test]
    fn prop_header_round_trip(header in header_strategy()) {
        let raw = header.to_bytes();
        prop_assert_eq!(PacketHeader::parse(&raw), Ok(header));
    }

    /// A valid header followed by random body bytes of the catalog length
    /// decodes or fails cleanly, for every kind.
    #[test]
    fn prop_valid_header_random_body(
        kind_idx in 0usize..PacketKind::ALL.len(),
        body in proptest::collection::vec(any::<u8>(), 1460..=1460)
    ) {
        let kind = PacketKind::ALL.get(kind_idx).copied().unwrap_or(PacketKind::Motion);
        let mut raw = build_blank_packet(kind, 0);
        let body_len = raw.len() - HEADER_SIZE;
        if let (Some(dst), Some(src)) = (raw.get_mut(HEADER_SIZE..), body.get(..body_len)) {
            dst.copy_from_slice(src);
        }
        let _ = decode_packet(&raw);
    }

    /// Random player index never breaks slot lookup.
    #[test]
    fn prop_slot_lookup_bounded(slot in any::<usize>()) {
        let raw = build_blank_packet(PacketKind::CarStatus, 0);
        let result = openracing_telemetry_f1::records::car_status::parse_car_status(&raw, slot);
        prop_assert_eq!(result.is_ok(), slot < 22);
    }
}
