//! Participants packet (ID 4).

use serde::{Deserialize, Serialize};

use super::{VehicleSlots, decode_slot, decode_slots};
use crate::byte_reader::ByteReader;
use crate::catalog::{HEADER_SIZE, PARTICIPANTS_LAYOUT};
use crate::error::Result;

const NAME_LEN: usize = 48;

/// One participant entry, 60 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantData {
    pub ai_controlled: u8,
    pub driver_id: u8,
    pub network_id: u8,
    pub team_id: u8,
    pub my_team: u8,
    pub race_number: u8,
    pub nationality: u8,
    pub name: String,
    /// 0 = restricted, 1 = public.
    pub your_telemetry: u8,
    pub show_online_names: u8,
    pub tech_level: u16,
    pub platform: u8,
}

impl ParticipantData {
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let ai_controlled = r.u8()?;
        let driver_id = r.u8()?;
        let network_id = r.u8()?;
        let team_id = r.u8()?;
        let my_team = r.u8()?;
        let race_number = r.u8()?;
        let nationality = r.u8()?;
        let name = decode_name(r.bytes(NAME_LEN)?);
        Ok(Self {
            ai_controlled,
            driver_id,
            network_id,
            team_id,
            my_team,
            race_number,
            nationality,
            name,
            your_telemetry: r.u8()?,
            show_online_names: r.u8()?,
            tech_level: r.u16_le()?,
            platform: r.u8()?,
        })
    }

    pub fn is_ai(&self) -> bool {
        self.ai_controlled != 0
    }
}

/// NUL-terminated UTF-8; invalid sequences are replaced rather than rejected.
fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(bytes.get(..end).unwrap_or_default()).into_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsPacket {
    pub num_active_cars: u8,
    pub cars: VehicleSlots<ParticipantData>,
}

impl ParticipantsPacket {
    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        let num_active_cars = ByteReader::at(raw, HEADER_SIZE).u8()?;
        Ok(Self {
            num_active_cars,
            cars: decode_slots(raw, &PARTICIPANTS_LAYOUT, ParticipantData::read),
        })
    }

    /// Participants in the first `num_active_cars` slots.
    pub fn active(&self) -> impl Iterator<Item = (usize, &ParticipantData)> {
        let active = usize::from(self.num_active_cars);
        self.cars.iter().take_while(move |(idx, _)| *idx < active)
    }
}

/// Parse the participant entry for `slot`.
pub fn parse_participant(raw: &[u8], slot: usize) -> Result<ParticipantData> {
    decode_slot(raw, &PARTICIPANTS_LAYOUT, slot, ParticipantData::read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ParticipantSpec, build_participants_packet};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn decodes_names_and_active_count() -> TestResult {
        let raw = build_participants_packet(
            2,
            &[
                (0, ParticipantSpec::named("VERSTAPPEN", 1, 9)),
                (1, ParticipantSpec::named("Pérez", 11, 9)),
            ],
        );
        let packet = ParticipantsPacket::decode(&raw)?;
        assert_eq!(packet.num_active_cars, 2);
        assert_eq!(packet.active().count(), 2);
        let first = packet.cars.get(0).ok_or("slot 0 missing")?;
        assert_eq!(first.name, "VERSTAPPEN");
        assert_eq!(first.race_number, 1);
        assert_eq!(first.team_id, 9);
        assert_eq!(parse_participant(&raw, 1)?.name, "Pérez");
        Ok(())
    }

    #[test]
    fn invalid_utf8_in_name_is_replaced() {
        assert_eq!(decode_name(&[b'A', 0xFF, b'B', 0, b'Z']), "A\u{FFFD}B");
        assert_eq!(decode_name(&[0; 4]), "");
        assert_eq!(decode_name(b"FULL"), "FULL");
    }
}
