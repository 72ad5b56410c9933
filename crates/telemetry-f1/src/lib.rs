//! EA F1 24 UDP telemetry decoder.
//!
//! Decodes the Codemasters binary UDP protocol (packet format `2024`, default
//! port **20777**) into typed, per-vehicle records.
//!
//! # Layers
//!
//! - [`ByteReader`]: fallible little-endian cursor. An overrun is an error,
//!   never a silent zero.
//! - [`catalog`]: packet kinds, expected lengths and per-vehicle layouts.
//! - [`PacketDecoder`]: header validation, length check against the catalog,
//!   dispatch to the record decoders in [`records`].
//! - [`UdpTelemetryReceiver`]: tokio receive loop feeding a bounded channel.
//! - [`TelemetryState`]: latest packet of each kind, for a single consumer.
//!
//! ## Decoded packets
//!
//! | Packet ID | Name          | Decoded into                  |
//! |-----------|---------------|-------------------------------|
//! | 0         | Motion        | [`MotionPacket`]              |
//! | 1         | Session       | [`SessionData`]               |
//! | 2         | Lap Data      | [`LapDataPacket`]             |
//! | 3         | Event         | [`EventPacket`]               |
//! | 4         | Participants  | [`ParticipantsPacket`]        |
//! | 6         | Car Telemetry | [`CarTelemetryPacket`]        |
//! | 7         | Car Status    | [`CarStatusPacket`]           |
//! | 10        | Car Damage    | [`CarDamagePacket`]           |
//!
//! Other catalogued kinds are length-checked and reported as
//! [`PacketBody::Unhandled`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use openracing_telemetry_f1::{ReceiverConfig, TelemetryState, UdpTelemetryReceiver};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let receiver = UdpTelemetryReceiver::new(ReceiverConfig::from_env());
//! let mut packets = receiver.start().await?;
//! let mut state = TelemetryState::new();
//! while let Some(packet) = packets.recv().await {
//!     state.apply(packet);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod byte_reader;
pub mod catalog;
pub mod decoder;
pub mod error;
pub mod header;
pub mod receiver;
pub mod records;
pub mod state;
pub mod testing;

pub use byte_reader::ByteReader;
pub use catalog::{
    DEFAULT_PORT, HEADER_SIZE, LENGTH_TOLERANCE, NUM_CARS, PACKET_FORMAT_2024, PacketKind,
    RecordLayout, track_name_from_id,
};
pub use decoder::{PacketBody, PacketDecoder, TelemetryPacket, decode_packet};
pub use error::{DecodeError, Result};
pub use header::PacketHeader;
pub use receiver::{
    ReceiverConfig, ReceiverStats, StatsSnapshot, TelemetryReceiver, UdpTelemetryReceiver,
};
pub use records::{
    CarDamageData, CarDamagePacket, CarMotionData, CarStatusData, CarStatusPacket,
    CarTelemetryData, CarTelemetryPacket, EventPacket, LapData, LapDataPacket, MarshalZone,
    MotionPacket, ParticipantData, ParticipantsPacket, SessionData, Vector3, VehicleSlots,
    WeatherForecastSample,
};
pub use state::TelemetryState;
