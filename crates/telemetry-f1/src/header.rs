//! The 29-byte header that opens every datagram.

use serde::{Deserialize, Serialize};

use crate::byte_reader::ByteReader;
use crate::catalog::{HEADER_SIZE, NO_SECONDARY_PLAYER, PacketKind};
use crate::error::{DecodeError, Result};

/// Parsed `PacketHeader`.
///
/// Wire layout (little-endian):
/// - 0-1: packetFormat (u16)
/// - 2: gameYear
/// - 3: gameMajorVersion
/// - 4: gameMinorVersion
/// - 5: packetVersion
/// - 6: packetId
/// - 7-14: sessionUID (u64)
/// - 15-18: sessionTime (f32)
/// - 19-22: frameIdentifier (u32)
/// - 23-26: overallFrameIdentifier (u32)
/// - 27: playerCarIndex
/// - 28: secondaryPlayerCarIndex (255 = none)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacketHeader {
    pub packet_format: u16,
    pub game_year: u8,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub overall_frame_identifier: u32,
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

impl PacketHeader {
    /// Decode the header fields in wire order.
    ///
    /// Only checks that the bytes exist; format and length validation is the
    /// decoder's job.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_SIZE {
            return Err(DecodeError::TooShort {
                len: raw.len(),
                min: HEADER_SIZE,
            });
        }
        let mut r = ByteReader::new(raw);
        Ok(Self {
            packet_format: r.u16_le()?,
            game_year: r.u8()?,
            game_major_version: r.u8()?,
            game_minor_version: r.u8()?,
            packet_version: r.u8()?,
            packet_id: r.u8()?,
            session_uid: r.u64_le()?,
            session_time: r.f32_le()?,
            frame_identifier: r.u32_le()?,
            overall_frame_identifier: r.u32_le()?,
            player_car_index: r.u8()?,
            secondary_player_car_index: r.u8()?,
        })
    }

    /// Append the 29 wire bytes for this header to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.reserve(HEADER_SIZE);
        buf.extend_from_slice(&self.packet_format.to_le_bytes());
        buf.push(self.game_year);
        buf.push(self.game_major_version);
        buf.push(self.game_minor_version);
        buf.push(self.packet_version);
        buf.push(self.packet_id);
        buf.extend_from_slice(&self.session_uid.to_le_bytes());
        buf.extend_from_slice(&self.session_time.to_le_bytes());
        buf.extend_from_slice(&self.frame_identifier.to_le_bytes());
        buf.extend_from_slice(&self.overall_frame_identifier.to_le_bytes());
        buf.push(self.player_car_index);
        buf.push(self.secondary_player_car_index);
    }

    /// Header bytes as a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        self.write_to(&mut buf);
        buf
    }

    /// Kind from the catalog, `None` for ids this crate does not know.
    pub fn kind(&self) -> Option<PacketKind> {
        PacketKind::from_id(self.packet_id)
    }

    /// Second split-screen player's slot, if any.
    pub fn secondary_player(&self) -> Option<u8> {
        (self.secondary_player_car_index != NO_SECONDARY_PLAYER)
            .then_some(self.secondary_player_car_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn sample() -> PacketHeader {
        PacketHeader {
            packet_format: 2024,
            game_year: 24,
            game_major_version: 1,
            game_minor_version: 7,
            packet_version: 1,
            packet_id: 6,
            session_uid: 0xFEED_FACE_CAFE_BEEF,
            session_time: 123.25,
            frame_identifier: 4_000,
            overall_frame_identifier: 4_010,
            player_car_index: 3,
            secondary_player_car_index: 255,
        }
    }

    #[test]
    fn header_is_29_bytes() {
        assert_eq!(sample().to_bytes().len(), HEADER_SIZE);
    }

    #[test]
    fn parse_reads_back_written_header() -> TestResult {
        let header = sample();
        let parsed = PacketHeader::parse(&header.to_bytes())?;
        assert_eq!(parsed, header);
        assert_eq!(parsed.kind(), Some(PacketKind::CarTelemetry));
        assert_eq!(parsed.secondary_player(), None);
        Ok(())
    }

    #[test]
    fn field_offsets_match_wire_layout() -> TestResult {
        let raw = sample().to_bytes();
        assert_eq!(raw.get(6), Some(&6));
        assert_eq!(raw.get(27), Some(&3));
        assert_eq!(raw.get(28), Some(&255));
        assert_eq!(raw.get(7..15), Some(&0xFEED_FACE_CAFE_BEEFu64.to_le_bytes()[..]));
        Ok(())
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert_eq!(
            PacketHeader::parse(&[0u8; 28]),
            Err(DecodeError::TooShort { len: 28, min: 29 })
        );
        assert!(PacketHeader::parse(&[]).is_err());
    }
}
