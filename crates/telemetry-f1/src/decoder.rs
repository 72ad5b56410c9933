//! Header validation and per-kind dispatch.

use serde::{Deserialize, Serialize};

use crate::catalog::{LENGTH_TOLERANCE, PACKET_FORMAT_2024, PacketKind};
use crate::error::{DecodeError, Result};
use crate::header::PacketHeader;
use crate::records::{
    CarDamagePacket, CarStatusPacket, CarTelemetryPacket, EventPacket, LapDataPacket,
    MotionPacket, ParticipantsPacket, SessionData,
};

/// Decoded body, one variant per handled kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PacketBody {
    Motion(MotionPacket),
    Session(SessionData),
    LapData(LapDataPacket),
    Event(EventPacket),
    Participants(ParticipantsPacket),
    CarTelemetry(CarTelemetryPacket),
    CarStatus(CarStatusPacket),
    CarDamage(CarDamagePacket),
    /// Catalogued and length-checked, but no body decoder.
    Unhandled(PacketKind),
    /// `packetId` outside the catalog; body not inspected.
    Unknown(u8),
}

/// One validated datagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPacket {
    pub header: PacketHeader,
    pub body: PacketBody,
}

impl TelemetryPacket {
    pub fn kind(&self) -> Option<PacketKind> {
        self.header.kind()
    }

    pub fn player_index(&self) -> usize {
        usize::from(self.header.player_car_index)
    }
}

/// Stateless datagram decoder.
///
/// Validation order: header length, packet format, total length against the
/// catalog, then the body. Each datagram is decoded independently.
#[derive(Debug, Clone, Copy)]
pub struct PacketDecoder {
    packet_format: u16,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self {
            packet_format: PACKET_FORMAT_2024,
        }
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single `packetFormat` this decoder accepts.
    pub fn packet_format(&self) -> u16 {
        self.packet_format
    }

    /// Decode one datagram.
    ///
    /// # Errors
    ///
    /// Returns a format error ([`DecodeError::is_format_error`]) when the
    /// datagram is empty, shorter than the header, carries another packet
    /// format, or has a length outside the catalog tolerance. Packet-level
    /// fields (session body, trailers) that overrun return
    /// [`DecodeError::OutOfBounds`]; per-vehicle overruns only empty the slot.
    pub fn decode(&self, raw: &[u8]) -> Result<TelemetryPacket> {
        if raw.is_empty() {
            return Err(DecodeError::Empty);
        }
        let header = PacketHeader::parse(raw)?;
        if header.packet_format != self.packet_format {
            return Err(DecodeError::UnsupportedFormat {
                found: header.packet_format,
                expected: self.packet_format,
            });
        }

        let Some(kind) = header.kind() else {
            return Ok(TelemetryPacket {
                header,
                body: PacketBody::Unknown(header.packet_id),
            });
        };

        if !kind.accepts_len(raw.len()) {
            return Err(DecodeError::LengthMismatch {
                kind,
                len: raw.len(),
                expected: kind.expected_len(),
                tolerance: LENGTH_TOLERANCE,
            });
        }

        let body = decode_body(kind, raw)?;
        Ok(TelemetryPacket { header, body })
    }
}

fn decode_body(kind: PacketKind, raw: &[u8]) -> Result<PacketBody> {
    Ok(match kind {
        PacketKind::Motion => PacketBody::Motion(MotionPacket::decode(raw)),
        PacketKind::Session => PacketBody::Session(SessionData::decode(raw)?),
        PacketKind::LapData => PacketBody::LapData(LapDataPacket::decode(raw)?),
        PacketKind::Event => PacketBody::Event(EventPacket::decode(raw)?),
        PacketKind::Participants => PacketBody::Participants(ParticipantsPacket::decode(raw)?),
        PacketKind::CarTelemetry => PacketBody::CarTelemetry(CarTelemetryPacket::decode(raw)?),
        PacketKind::CarStatus => PacketBody::CarStatus(CarStatusPacket::decode(raw)),
        PacketKind::CarDamage => PacketBody::CarDamage(CarDamagePacket::decode(raw)),
        PacketKind::CarSetups
        | PacketKind::FinalClassification
        | PacketKind::LobbyInfo
        | PacketKind::SessionHistory
        | PacketKind::TyreSets
        | PacketKind::MotionEx
        | PacketKind::TimeTrial => PacketBody::Unhandled(kind),
    })
}

/// Decode with the default (format 2024) decoder.
pub fn decode_packet(raw: &[u8]) -> Result<TelemetryPacket> {
    PacketDecoder::default().decode(raw)
}
