//! Latest-value store fed by decoded packets.
//!
//! Owned by one consumer task; nothing here is shared across threads.

use tracing::debug;

use crate::decoder::{PacketBody, TelemetryPacket};
use crate::header::PacketHeader;
use crate::records::{
    CarDamagePacket, CarStatusPacket, CarTelemetryPacket, EventPacket, LapDataPacket,
    MotionPacket, ParticipantsPacket, SessionData,
};

/// Newest packet of each decoded kind for the current session.
#[derive(Debug, Default, Clone)]
pub struct TelemetryState {
    pub session_uid: Option<u64>,
    pub last_header: Option<PacketHeader>,
    pub motion: Option<MotionPacket>,
    pub session: Option<SessionData>,
    pub lap_data: Option<LapDataPacket>,
    pub participants: Option<ParticipantsPacket>,
    pub car_telemetry: Option<CarTelemetryPacket>,
    pub car_status: Option<CarStatusPacket>,
    pub car_damage: Option<CarDamagePacket>,
    pub last_event: Option<EventPacket>,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one packet in, replacing the previous packet of the same kind.
    ///
    /// A new session UID drops everything held for the old session first.
    /// Returns `true` when the session changed.
    pub fn apply(&mut self, packet: TelemetryPacket) -> bool {
        let uid = packet.header.session_uid;
        let session_changed = self.session_uid.is_some_and(|current| current != uid);
        if session_changed {
            debug!(old = ?self.session_uid, new = uid, "session changed, clearing state");
            *self = Self::default();
        }
        self.session_uid = Some(uid);
        self.last_header = Some(packet.header);

        match packet.body {
            PacketBody::Motion(p) => self.motion = Some(p),
            PacketBody::Session(p) => self.session = Some(p),
            PacketBody::LapData(p) => self.lap_data = Some(p),
            PacketBody::Event(p) => self.last_event = Some(p),
            PacketBody::Participants(p) => self.participants = Some(p),
            PacketBody::CarTelemetry(p) => self.car_telemetry = Some(p),
            PacketBody::CarStatus(p) => self.car_status = Some(p),
            PacketBody::CarDamage(p) => self.car_damage = Some(p),
            PacketBody::Unhandled(kind) => debug!(%kind, "no decoder for packet kind"),
            PacketBody::Unknown(id) => debug!(packet_id = id, "ignoring unknown packet id"),
        }
        session_changed
    }

    /// Current track id from the last session packet.
    pub fn track_id(&self) -> Option<i8> {
        self.session.as_ref().map(|s| s.track_id)
    }

    pub fn player_index(&self) -> Option<usize> {
        self.last_header
            .map(|header| usize::from(header.player_car_index))
    }

    /// Driver name for `slot`, if participants have been received.
    pub fn driver_name(&self, slot: usize) -> Option<&str> {
        self.participants
            .as_ref()
            .and_then(|p| p.cars.get(slot))
            .map(|car| car.name.as_str())
    }
}
