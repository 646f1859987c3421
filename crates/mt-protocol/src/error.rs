//! Protocol error types.
//!
//! Framing, decoding and encoding failures are kept apart so callers can tell
//! a corrupt byte stream from a well-framed payload they cannot interpret.

use thiserror::Error;

use crate::data_id::DataIdentifier;
use crate::precision::Precision;

/// A frame broke one of the wire format invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Invalid preamble: expected 0xFA, got 0x{0:02X}")]
    InvalidPreamble(u8),

    #[error("Invalid bus address: expected 0xFF, got 0x{0:02X}")]
    InvalidBusAddress(u8),

    #[error("Invalid extended length: {0} not in 255..=2048")]
    InvalidExtendedLength(usize),

    #[error("Frame length mismatch: header declares {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Checksum mismatch: byte sum is 0x{sum:02X}, expected 0x00")]
    ChecksumMismatch { sum: u8 },
}

/// A payload is well framed but does not have the layout its identifier implies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(
        "Invalid data length for {identifier} ({precision}): expected {expected} bytes, got {actual}"
    )]
    InvalidDataLength {
        identifier: DataIdentifier,
        precision: Precision,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid {precision} value width: expected {expected} bytes, got {actual}")]
    InvalidValueWidth {
        precision: Precision,
        expected: usize,
        actual: usize,
    },

    #[error("Truncated sub-packet at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedSubPacket {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid {what} payload length: {actual} bytes")]
    InvalidPayloadLength { what: &'static str, actual: usize },

    #[error("Unexpected end of data at offset {offset}")]
    UnexpectedEnd { offset: usize },
}

/// A value cannot be put on the wire.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("Payload too long: {0} bytes (max 2048)")]
    PayloadTooLong(usize),

    #[error("Sub-packet data too long: {0} bytes (max 255)")]
    SubPacketTooLong(usize),

    #[error("Too many configuration entries: {actual} (max {max})")]
    TooManyEntries { actual: usize, max: usize },

    #[error("{measurement} measurement cannot be encoded as {identifier}")]
    KindMismatch {
        measurement: &'static str,
        identifier: DataIdentifier,
    },
}

/// A textual name did not match any known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {what}: {value:?}")]
pub struct ParseNameError {
    pub what: &'static str,
    pub value: String,
}

pub type FrameResult<T> = Result<T, FrameError>;
pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_id::{CoordinateSystem, DataKind};

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::TooShort {
            expected: 5,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Frame too short: expected at least 5 bytes, got 3"
        );
        assert_eq!(
            FrameError::InvalidBusAddress(0x01).to_string(),
            "Invalid bus address: expected 0xFF, got 0x01"
        );
    }

    #[test]
    fn test_decode_error_names_identifier_and_precision() {
        let identifier = DataIdentifier::new(
            DataKind::Quaternion,
            CoordinateSystem::NorthWestUp,
            Precision::Float64,
        );
        let err = DecodeError::InvalidDataLength {
            identifier,
            precision: identifier.precision,
            expected: 32,
            actual: 16,
        };
        assert_eq!(
            err.to_string(),
            "Invalid data length for Quaternion(NorthWestUp,Float64) (Float64): expected 32 bytes, got 16"
        );
    }
}
