//! Event packet (ID 3).

use serde::{Deserialize, Serialize};

use crate::byte_reader::ByteReader;
use crate::catalog::HEADER_SIZE;
use crate::error::Result;

const EVENT_DETAILS_LEN: usize = 12;

/// A discrete session event. The detail bytes are a union keyed by the
/// event code and are kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPacket {
    pub code: [u8; 4],
    pub details: [u8; EVENT_DETAILS_LEN],
}

impl EventPacket {
    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            code: r.u8_array()?,
            details: r.u8_array()?,
        })
    }

    /// Event code as text, e.g. `"SSTA"` or `"FTLP"`.
    pub fn code_str(&self) -> String {
        String::from_utf8_lossy(&self.code).into_owned()
    }

    /// Vehicle index carried by events that name a single car
    /// (fastest lap, retirement, penalty, ...).
    pub fn vehicle_index(&self) -> Option<u8> {
        match &self.code {
            b"FTLP" | b"RTMT" | b"TMPT" | b"RCWN" | b"PENA" | b"SPTP" | b"DTSV" | b"SGSV"
            | b"OVTK" | b"COLL" => self.details.first().copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_event_packet;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn decodes_code_and_details() -> TestResult {
        let raw = build_event_packet(*b"FTLP", &[7, 1, 2, 3]);
        let event = EventPacket::decode(&raw)?;
        assert_eq!(event.code_str(), "FTLP");
        assert_eq!(event.vehicle_index(), Some(7));
        assert_eq!(event.details.get(..4), Some(&[7u8, 1, 2, 3][..]));
        Ok(())
    }

    #[test]
    fn session_start_has_no_vehicle() -> TestResult {
        let raw = build_event_packet(*b"SSTA", &[]);
        assert_eq!(EventPacket::decode(&raw)?.vehicle_index(), None);
        Ok(())
    }
}
