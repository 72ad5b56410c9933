//! Static packet catalog for the F1 24 UDP protocol (packet format `2024`).
//!
//! | ID | Kind                | Bytes | Per-car width |
//! |----|---------------------|-------|---------------|
//! | 0  | Motion              | 1349  | 60            |
//! | 1  | Session             | 753   | -             |
//! | 2  | Lap Data            | 1285  | 57            |
//! | 3  | Event               | 45    | -             |
//! | 4  | Participants        | 1350  | 60            |
//! | 5  | Car Setups          | 1133  | 50            |
//! | 6  | Car Telemetry       | 1352  | 60            |
//! | 7  | Car Status          | 1239  | 55            |
//! | 8  | Final Classification| 1020  | 45            |
//! | 9  | Lobby Info          | 1306  | 58            |
//! | 10 | Car Damage          | 953   | 42            |
//! | 11 | Session History     | 1460  | -             |
//! | 12 | Tyre Sets           | 231   | -             |
//! | 13 | Motion Ex           | 237   | -             |
//! | 14 | Time Trial          | 101   | -             |
//!
//! These numbers belong to the game's published specification, not to this
//! crate. Header is 29 bytes; car status is 55 bytes per car (F1 24 adds the
//! ICE/MGU-K power fields that F1 23's 47-byte entry lacks).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default UDP port, standard since F1 2019.
pub const DEFAULT_PORT: u16 = 20777;

/// The single `packetFormat` value this decoder accepts.
pub const PACKET_FORMAT_2024: u16 = 2024;

/// Size of the packet header shared by every packet kind.
pub const HEADER_SIZE: usize = 29;

/// Fixed grid size; slot index is vehicle identity for the session.
pub const NUM_CARS: usize = 22;

/// Trailing bytes tolerated past the catalog length. Some producers and
/// relays pad datagrams; `expected <= len < expected + LENGTH_TOLERANCE`.
pub const LENGTH_TOLERANCE: usize = 16;

/// `secondaryPlayerCarIndex` value meaning "no second player".
pub const NO_SECONDARY_PLAYER: u8 = 255;

/// Per-vehicle record placement inside a packet body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Bytes between the header and slot 0 (e.g. `numActiveCars`).
    pub prefix: usize,
    /// Bytes per vehicle record.
    pub width: usize,
    /// Bytes after the last record (packet-level trailer fields).
    pub trailer: usize,
}

impl RecordLayout {
    const fn new(prefix: usize, width: usize, trailer: usize) -> Self {
        Self {
            prefix,
            width,
            trailer,
        }
    }

    /// Byte offset of `slot` from the start of the datagram, or `None` when it
    /// would overflow.
    pub fn slot_offset(&self, slot: usize) -> Option<usize> {
        slot.checked_mul(self.width)?
            .checked_add(HEADER_SIZE)?
            .checked_add(self.prefix)
    }

    /// Offset of the first byte after the record array.
    pub fn trailer_offset(&self) -> usize {
        HEADER_SIZE + self.prefix + NUM_CARS * self.width
    }

    /// Total packet size implied by this layout.
    pub const fn packet_size(&self) -> usize {
        HEADER_SIZE + self.prefix + NUM_CARS * self.width + self.trailer
    }
}

/// Packet kind, taken from the header's `packetId` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketKind {
    Motion,
    Session,
    LapData,
    Event,
    Participants,
    CarSetups,
    CarTelemetry,
    CarStatus,
    FinalClassification,
    LobbyInfo,
    CarDamage,
    SessionHistory,
    TyreSets,
    MotionEx,
    TimeTrial,
}

impl PacketKind {
    /// All kinds in `packetId` order.
    pub const ALL: [PacketKind; 15] = [
        PacketKind::Motion,
        PacketKind::Session,
        PacketKind::LapData,
        PacketKind::Event,
        PacketKind::Participants,
        PacketKind::CarSetups,
        PacketKind::CarTelemetry,
        PacketKind::CarStatus,
        PacketKind::FinalClassification,
        PacketKind::LobbyInfo,
        PacketKind::CarDamage,
        PacketKind::SessionHistory,
        PacketKind::TyreSets,
        PacketKind::MotionEx,
        PacketKind::TimeTrial,
    ];

    /// Map a header `packetId`; `None` for ids this catalog does not know.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Motion => 0,
            Self::Session => 1,
            Self::LapData => 2,
            Self::Event => 3,
            Self::Participants => 4,
            Self::CarSetups => 5,
            Self::CarTelemetry => 6,
            Self::CarStatus => 7,
            Self::FinalClassification => 8,
            Self::LobbyInfo => 9,
            Self::CarDamage => 10,
            Self::SessionHistory => 11,
            Self::TyreSets => 12,
            Self::MotionEx => 13,
            Self::TimeTrial => 14,
        }
    }

    /// Exact datagram length the game sends for this kind.
    pub fn expected_len(self) -> usize {
        match self {
            Self::Motion => 1349,
            Self::Session => 753,
            Self::LapData => 1285,
            Self::Event => 45,
            Self::Participants => 1350,
            Self::CarSetups => 1133,
            Self::CarTelemetry => 1352,
            Self::CarStatus => 1239,
            Self::FinalClassification => 1020,
            Self::LobbyInfo => 1306,
            Self::CarDamage => 953,
            Self::SessionHistory => 1460,
            Self::TyreSets => 231,
            Self::MotionEx => 237,
            Self::TimeTrial => 101,
        }
    }

    /// Per-vehicle layout, for kinds that carry a 22-slot record array.
    pub fn record_layout(self) -> Option<RecordLayout> {
        match self {
            Self::Motion => Some(MOTION_LAYOUT),
            Self::LapData => Some(LAP_DATA_LAYOUT),
            Self::Participants => Some(PARTICIPANTS_LAYOUT),
            Self::CarSetups => Some(RecordLayout::new(0, 50, 4)),
            Self::CarTelemetry => Some(CAR_TELEMETRY_LAYOUT),
            Self::CarStatus => Some(CAR_STATUS_LAYOUT),
            Self::FinalClassification => Some(RecordLayout::new(1, 45, 0)),
            Self::LobbyInfo => Some(RecordLayout::new(1, 58, 0)),
            Self::CarDamage => Some(CAR_DAMAGE_LAYOUT),
            Self::Session
            | Self::Event
            | Self::SessionHistory
            | Self::TyreSets
            | Self::MotionEx
            | Self::TimeTrial => None,
        }
    }

    /// Whether the length `len` is acceptable for this kind.
    pub fn accepts_len(self, len: usize) -> bool {
        let expected = self.expected_len();
        len >= expected && len < expected + LENGTH_TOLERANCE
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// CarMotionData: 60 bytes per car.
pub const MOTION_LAYOUT: RecordLayout = RecordLayout::new(0, 60, 0);
/// LapData: 57 bytes per car, trailer holds the time-trial PB/rival indices.
pub const LAP_DATA_LAYOUT: RecordLayout = RecordLayout::new(0, 57, 2);
/// ParticipantData: 60 bytes per car after the `numActiveCars` byte.
pub const PARTICIPANTS_LAYOUT: RecordLayout = RecordLayout::new(1, 60, 0);
/// CarTelemetryData: 60 bytes per car, trailer holds MFD indices and suggested gear.
pub const CAR_TELEMETRY_LAYOUT: RecordLayout = RecordLayout::new(0, 60, 3);
/// CarStatusData: 55 bytes per car.
pub const CAR_STATUS_LAYOUT: RecordLayout = RecordLayout::new(0, 55, 0);
/// CarDamageData: 42 bytes per car.
pub const CAR_DAMAGE_LAYOUT: RecordLayout = RecordLayout::new(0, 42, 0);

/// Maps `m_trackId` (0-based) to a display name. Unknown ids return `"Unknown"`.
pub fn track_name_from_id(track_id: i8) -> &'static str {
    const NAMES: &[&str] = &[
        "Melbourne",         // 0
        "Paul Ricard",       // 1
        "Shanghai",          // 2
        "Sakhir (Bahrain)",  // 3
        "Catalunya",         // 4
        "Monaco",            // 5
        "Montreal",          // 6
        "Silverstone",       // 7
        "Hockenheim",        // 8
        "Hungaroring",       // 9
        "Spa",               // 10
        "Monza",             // 11
        "Singapore",         // 12
        "Suzuka",            // 13
        "Abu Dhabi",         // 14
        "Texas",             // 15
        "Brazil",            // 16
        "Austria",           // 17
        "Sochi",             // 18
        "Mexico",            // 19
        "Baku (Azerbaijan)", // 20
        "Sakhir Short",      // 21
        "Silverstone Short", // 22
        "Texas Short",       // 23
        "Suzuka Short",      // 24
        "Hanoi",             // 25
        "Zandvoort",         // 26
        "Imola",             // 27
        "Portimao",          // 28
        "Jeddah",            // 29
        "Miami",             // 30
        "Las Vegas",         // 31
        "Losail",            // 32
    ];
    usize::try_from(track_id)
        .ok()
        .and_then(|idx| NAMES.get(idx).copied())
        .unwrap_or("Unknown")
}

/// Human-readable name for an actual tyre compound code.
pub fn tyre_compound_name(compound: u8) -> &'static str {
    match compound {
        7 => "Intermediate",
        8 => "Wet",
        9 => "Dry (classic)",
        10 => "Wet (classic)",
        11 => "Super Soft",
        12 => "Soft",
        13 => "Medium",
        14 => "Hard",
        15 => "Wet",
        16 => "C5",
        17 => "C4",
        18 => "C3",
        19 => "C2",
        20 => "C1",
        21 => "C0",
        _ => "Unknown",
    }
}
