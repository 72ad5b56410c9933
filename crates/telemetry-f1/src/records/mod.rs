//! Per-kind record decoders.
//!
//! Each vehicle record is decoded from its own sub-slice, so a record can
//! never read into its neighbour. A slot that fails to decode is left empty
//! and the rest of the frame is kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::byte_reader::ByteReader;
use crate::catalog::{NUM_CARS, RecordLayout};
use crate::error::{DecodeError, Result};

pub mod car_damage;
pub mod car_status;
pub mod car_telemetry;
pub mod event;
pub mod lap_data;
pub mod motion;
pub mod participants;
pub mod session;

pub use car_damage::{CarDamageData, CarDamagePacket};
pub use car_status::{CarStatusData, CarStatusPacket};
pub use car_telemetry::{CarTelemetryData, CarTelemetryPacket};
pub use event::EventPacket;
pub use lap_data::{LapData, LapDataPacket};
pub use motion::{CarMotionData, MotionPacket, Vector3};
pub use participants::{ParticipantData, ParticipantsPacket};
pub use session::{MarshalZone, SessionData, WeatherForecastSample};

/// Fixed 22-slot array of per-vehicle records for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSlots<T> {
    slots: Vec<Option<T>>,
}

impl<T> VehicleSlots<T> {
    /// Record in `slot`, if it decoded.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Decoded records with their slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|record| (idx, record)))
    }

    /// Number of slots that decoded.
    pub fn decoded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Always [`NUM_CARS`].
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T> FromIterator<Option<T>> for VehicleSlots<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let mut slots: Vec<Option<T>> = iter.into_iter().take(NUM_CARS).collect();
        slots.resize_with(NUM_CARS, || None);
        Self { slots }
    }
}

/// Sub-slice holding exactly one vehicle record.
fn record_bytes<'a>(raw: &'a [u8], layout: &RecordLayout, slot: usize) -> Result<&'a [u8]> {
    if slot >= NUM_CARS {
        return Err(DecodeError::SlotOutOfRange {
            index: slot,
            max: NUM_CARS - 1,
        });
    }
    let out_of_bounds = |offset: usize| DecodeError::OutOfBounds {
        offset,
        needed: layout.width,
        len: raw.len(),
    };
    let start = layout.slot_offset(slot).ok_or(out_of_bounds(usize::MAX))?;
    let end = start
        .checked_add(layout.width)
        .ok_or(out_of_bounds(start))?;
    raw.get(start..end).ok_or(out_of_bounds(start))
}

/// Decode a single slot.
pub(crate) fn decode_slot<T>(
    raw: &[u8],
    layout: &RecordLayout,
    slot: usize,
    decode: impl Fn(&mut ByteReader<'_>) -> Result<T>,
) -> Result<T> {
    let bytes = record_bytes(raw, layout, slot)?;
    decode(&mut ByteReader::new(bytes))
}

/// Decode every slot; failures leave the slot empty.
pub(crate) fn decode_slots<T>(
    raw: &[u8],
    layout: &RecordLayout,
    decode: impl Fn(&mut ByteReader<'_>) -> Result<T>,
) -> VehicleSlots<T> {
    (0..NUM_CARS)
        .map(|slot| match decode_slot(raw, layout, slot, &decode) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(slot, error = %err, "vehicle record rejected");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HEADER_SIZE;

    const LAYOUT: RecordLayout = RecordLayout {
        prefix: 0,
        width: 2,
        trailer: 0,
    };

    #[test]
    fn truncated_tail_only_loses_the_trailing_slots() {
        // room for 10 complete records plus one dangling byte
        let raw = vec![1u8; HEADER_SIZE + 10 * 2 + 1];
        let slots = decode_slots(&raw, &LAYOUT, |r| r.u16_le());
        assert_eq!(slots.capacity(), NUM_CARS);
        assert_eq!(slots.decoded_count(), 10);
        assert_eq!(slots.get(9), Some(&0x0101));
        assert_eq!(slots.get(10), None);
    }

    #[test]
    fn record_cannot_read_past_its_width() {
        let raw = vec![0u8; HEADER_SIZE + NUM_CARS * 2];
        let result = decode_slot(&raw, &LAYOUT, 0, |r| r.u32_le());
        assert!(matches!(result, Err(DecodeError::OutOfBounds { .. })));
    }

    #[test]
    fn slot_index_is_bounded() {
        let raw = vec![0u8; 2048];
        let result = decode_slot(&raw, &LAYOUT, NUM_CARS, |r| r.u8());
        assert_eq!(
            result,
            Err(DecodeError::SlotOutOfRange {
                index: NUM_CARS,
                max: NUM_CARS - 1
            })
        );
    }

    #[test]
    fn from_iter_pads_to_grid_size() {
        let slots: VehicleSlots<u8> = vec![Some(1), None, Some(3)].into_iter().collect();
        assert_eq!(slots.capacity(), NUM_CARS);
        let decoded: Vec<_> = slots.iter().collect();
        assert_eq!(decoded, vec![(0, &1), (2, &3)]);
    }
}
