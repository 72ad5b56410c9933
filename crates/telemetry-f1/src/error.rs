//! Error types for packet decoding.

use thiserror::Error;

use crate::catalog::PacketKind;

/// Reasons a datagram or a record inside it is rejected.
///
/// Every variant is recoverable: the receive loop drops the datagram, bumps the
/// matching counter in [`crate::ReceiverStats`] and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Zero-length datagram.
    #[error("empty datagram")]
    Empty,

    /// Buffer is shorter than the fixed packet header.
    #[error("packet too short for header: {len} bytes (need {min})")]
    TooShort {
        /// Actual buffer length.
        len: usize,
        /// Required minimum.
        min: usize,
    },

    /// Header carries a packet format other than the supported one.
    #[error("unsupported packet format {found} (expected {expected})")]
    UnsupportedFormat {
        /// Value found in the header.
        found: u16,
        /// The single supported value.
        expected: u16,
    },

    /// Total length does not match the catalog entry for a known kind.
    #[error(
        "{kind} packet has {len} bytes (expected {expected}..{})",
        .expected + .tolerance
    )]
    LengthMismatch {
        /// Packet kind from the header.
        kind: PacketKind,
        /// Actual buffer length.
        len: usize,
        /// Catalog length.
        expected: usize,
        /// Accepted trailing padding.
        tolerance: usize,
    },

    /// A field read ran past the end of the buffer.
    #[error("out of bounds: {needed}-byte read at offset {offset} (buffer is {len} bytes)")]
    OutOfBounds {
        /// Offset the read started at.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Buffer length.
        len: usize,
    },

    /// A vehicle slot index beyond the fixed grid size.
    #[error("vehicle slot {index} out of range (max {max})")]
    SlotOutOfRange {
        /// Requested slot.
        index: usize,
        /// Largest valid slot.
        max: usize,
    },
}

impl DecodeError {
    /// True for rejections of the datagram as a whole (as opposed to a single
    /// field or slot inside an otherwise valid datagram).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Empty
                | Self::TooShort { .. }
                | Self::UnsupportedFormat { .. }
                | Self::LengthMismatch { .. }
        )
    }
}

/// Result alias for decoding operations.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
