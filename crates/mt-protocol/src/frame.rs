//! MT frames.
//!
//! Standard frame (up to 254 payload bytes):
//!
//! ```text
//! +----------+-----+-----+-----+---------+----------+
//! | PREAMBLE | BID | MID | LEN | PAYLOAD | CHECKSUM |
//! +----------+-----+-----+-----+---------+----------+
//! ```
//!
//! Extended frame (255 to 2048 payload bytes), signalled by `LEN == 0xFF`:
//!
//! ```text
//! +----------+-----+-----+------+--------+--------+---------+----------+
//! | PREAMBLE | BID | MID | 0xFF | LEN_HI | LEN_LO | PAYLOAD | CHECKSUM |
//! +----------+-----+-----+------+--------+--------+---------+----------+
//! ```
//!
//! The checksum makes the sum of every byte after the preamble zero modulo 256.

use std::fmt;

use crate::error::{EncodeError, EncodeResult, FrameError, FrameResult};
use crate::error_code::ErrorCode;
use crate::message_id::MessageId;

pub const PREAMBLE: u8 = 0xFA;
/// Bus identifier used by host requests and device-originated frames.
pub const BUS_ADDRESS: u8 = 0xFF;
/// `LEN` value announcing a two-byte extended length.
pub const EXTENDED_LENGTH: u8 = 0xFF;

pub const STANDARD_HEADER_LEN: usize = 4;
pub const EXTENDED_HEADER_LEN: usize = 6;
pub const CHECKSUM_LEN: usize = 1;
pub const MIN_FRAME_LEN: usize = STANDARD_HEADER_LEN + CHECKSUM_LEN;

pub const MAX_STANDARD_PAYLOAD_LEN: usize = 254;
pub const MIN_EXTENDED_PAYLOAD_LEN: usize = 255;
pub const MAX_EXTENDED_PAYLOAD_LEN: usize = 2048;
pub const MAX_FRAME_LEN: usize = EXTENDED_HEADER_LEN + MAX_EXTENDED_PAYLOAD_LEN + CHECKSUM_LEN;

/// Checksum byte for `bytes`, which run from the bus address up to, not
/// including, the checksum position.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    0u8.wrapping_sub(sum)
}

/// Checks every wire invariant of a complete frame.
pub fn validate(bytes: &[u8]) -> FrameResult<()> {
    let [preamble, bus_address, mid, len, rest @ ..] = bytes else {
        return Err(FrameError::TooShort {
            expected: MIN_FRAME_LEN,
            actual: bytes.len(),
        });
    };
    if rest.is_empty() {
        return Err(FrameError::TooShort {
            expected: MIN_FRAME_LEN,
            actual: bytes.len(),
        });
    }
    if *preamble != PREAMBLE {
        return Err(FrameError::InvalidPreamble(*preamble));
    }
    if *bus_address != BUS_ADDRESS {
        return Err(FrameError::InvalidBusAddress(*bus_address));
    }

    let (header_len, payload_len) = if *len == EXTENDED_LENGTH {
        let [hi, lo, ..] = rest else {
            return Err(FrameError::TooShort {
                expected: EXTENDED_HEADER_LEN + CHECKSUM_LEN,
                actual: bytes.len(),
            });
        };
        let extended = usize::from(u16::from_be_bytes([*hi, *lo]));
        if !(MIN_EXTENDED_PAYLOAD_LEN..=MAX_EXTENDED_PAYLOAD_LEN).contains(&extended) {
            return Err(FrameError::InvalidExtendedLength(extended));
        }
        (EXTENDED_HEADER_LEN, extended)
    } else {
        (STANDARD_HEADER_LEN, usize::from(*len))
    };

    let expected = header_len + payload_len + CHECKSUM_LEN;
    if bytes.len() != expected {
        return Err(FrameError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let sum = rest
        .iter()
        .fold(bus_address.wrapping_add(*mid).wrapping_add(*len), |acc, b| {
            acc.wrapping_add(*b)
        });
    if sum != 0 {
        return Err(FrameError::ChecksumMismatch { sum });
    }
    Ok(())
}

/// One validated, immutable frame.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: Vec<u8>,
    header_len: usize,
}

impl Frame {
    /// Builds a frame around `payload`, choosing the extended layout for
    /// payloads longer than 254 bytes.
    pub fn new(identifier: MessageId, payload: &[u8]) -> EncodeResult<Self> {
        let payload_len = payload.len();
        if payload_len > MAX_EXTENDED_PAYLOAD_LEN {
            return Err(EncodeError::PayloadTooLong(payload_len));
        }

        let mut bytes = Vec::with_capacity(EXTENDED_HEADER_LEN + payload_len + CHECKSUM_LEN);
        bytes.extend_from_slice(&[PREAMBLE, BUS_ADDRESS, identifier.value()]);
        let header_len = match u8::try_from(payload_len) {
            Ok(len) if usize::from(len) <= MAX_STANDARD_PAYLOAD_LEN => {
                bytes.push(len);
                STANDARD_HEADER_LEN
            }
            _ => {
                let len = u16::try_from(payload_len)
                    .map_err(|_| EncodeError::PayloadTooLong(payload_len))?;
                bytes.push(EXTENDED_LENGTH);
                bytes.extend_from_slice(&len.to_be_bytes());
                EXTENDED_HEADER_LEN
            }
        };
        bytes.extend_from_slice(payload);
        let cs = checksum(bytes.get(1..).unwrap_or_default());
        bytes.push(cs);

        Ok(Self { bytes, header_len })
    }

    /// A frame without payload, e.g. `GotoConfig`.
    pub fn empty(identifier: MessageId) -> Self {
        let bytes = vec![
            PREAMBLE,
            BUS_ADDRESS,
            identifier.value(),
            0,
            checksum(&[BUS_ADDRESS, identifier.value(), 0]),
        ];
        Self {
            bytes,
            header_len: STANDARD_HEADER_LEN,
        }
    }

    /// An error report carrying one error code byte.
    pub fn error(code: ErrorCode) -> Self {
        let mid = MessageId::ERROR.value();
        let code = code.to_u8();
        let bytes = vec![
            PREAMBLE,
            BUS_ADDRESS,
            mid,
            1,
            code,
            checksum(&[BUS_ADDRESS, mid, 1, code]),
        ];
        Self {
            bytes,
            header_len: STANDARD_HEADER_LEN,
        }
    }

    /// Validates `bytes` and takes ownership of them.
    pub fn parse(bytes: impl Into<Vec<u8>>) -> FrameResult<Self> {
        let bytes = bytes.into();
        validate(&bytes)?;
        let header_len = if bytes.get(3) == Some(&EXTENDED_LENGTH) {
            EXTENDED_HEADER_LEN
        } else {
            STANDARD_HEADER_LEN
        };
        Ok(Self { bytes, header_len })
    }

    pub fn identifier(&self) -> MessageId {
        MessageId(self.bytes.get(2).copied().unwrap_or_default())
    }

    pub fn is_extended(&self) -> bool {
        self.header_len == EXTENDED_HEADER_LEN
    }

    /// Payload length as announced in the header.
    pub fn length(&self) -> usize {
        self.payload().len()
    }

    pub fn payload(&self) -> &[u8] {
        let end = self.bytes.len().saturating_sub(CHECKSUM_LEN);
        self.bytes.get(self.header_len..end).unwrap_or_default()
    }

    pub fn checksum(&self) -> u8 {
        self.bytes.last().copied().unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// True for a standard `Error` frame with a single error code byte.
    pub fn is_error(&self) -> bool {
        self.identifier() == MessageId::ERROR && !self.is_extended() && self.length() == 1
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        if !self.is_error() {
            return None;
        }
        self.payload().first().copied().map(ErrorCode::from_u8)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<Vec<u8>> for Frame {
    type Error = FrameError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Frame::parse(bytes)
    }
}

pub(crate) fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.error_code() {
            return write!(f, "{}({})", self.identifier(), code);
        }
        write!(f, "{}(", self.identifier())?;
        write_hex(f, self.payload())?;
        f.write_str(")")
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(")?;
        write_hex(f, &self.bytes)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_config_bytes() {
        let frame = Frame::empty(MessageId::GOTO_CONFIG);
        assert_eq!(frame.as_bytes(), &[0xFA, 0xFF, 0x30, 0x00, 0xD1]);
        assert_eq!(
            Frame::new(MessageId::GOTO_CONFIG, &[]).map(Frame::into_bytes),
            Ok(vec![0xFA, 0xFF, 0x30, 0x00, 0xD1])
        );
    }

    #[test]
    fn test_error_frame_bytes() {
        let frame = Frame::error(ErrorCode::InvalidMessage);
        assert_eq!(frame.as_bytes(), &[0xFA, 0xFF, 0x42, 0x01, 0x04, 0xBA]);
        assert!(frame.is_error());
        assert_eq!(frame.error_code(), Some(ErrorCode::InvalidMessage));
        assert_eq!(frame.to_string(), "Error(InvalidMessage)");
    }

    #[test]
    fn test_validate_too_short() {
        assert_eq!(
            validate(&[0xFA, 0xFF, 0x30, 0x00]),
            Err(FrameError::TooShort {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_validate_bad_preamble_and_address() {
        assert_eq!(
            validate(&[0xFB, 0xFF, 0x30, 0x00, 0xD1]),
            Err(FrameError::InvalidPreamble(0xFB))
        );
        assert_eq!(
            validate(&[0xFA, 0x01, 0x30, 0x00, 0xD1]),
            Err(FrameError::InvalidBusAddress(0x01))
        );
    }

    #[test]
    fn test_validate_bad_checksum() {
        assert_eq!(
            validate(&[0xFA, 0xFF, 0x30, 0x00, 0xD2]),
            Err(FrameError::ChecksumMismatch { sum: 0x01 })
        );
    }

    #[test]
    fn test_validate_extended_bounds() {
        // extended length 10 is below the extended minimum
        let mut bytes = vec![0xFA, 0xFF, 0x36, 0xFF, 0x00, 0x0A];
        bytes.extend_from_slice(&[0u8; 10]);
        bytes.push(0x00);
        assert_eq!(validate(&bytes), Err(FrameError::InvalidExtendedLength(10)));

        let bytes = [0xFA, 0xFF, 0x36, 0xFF, 0x08, 0x01, 0x00];
        assert_eq!(
            validate(&bytes),
            Err(FrameError::InvalidExtendedLength(2049))
        );
    }

    #[test]
    fn test_validate_length_mismatch() {
        assert_eq!(
            validate(&[0xFA, 0xFF, 0x42, 0x02, 0x04, 0xBA]),
            Err(FrameError::LengthMismatch {
                expected: 7,
                actual: 6
            })
        );
    }

    #[test]
    fn test_extended_construction() -> Result<(), Box<dyn std::error::Error>> {
        let payload = vec![0x11u8; 300];
        let frame = Frame::new(MessageId::MT_DATA2, &payload)?;
        assert!(frame.is_extended());
        assert_eq!(frame.as_bytes().get(..6), Some(&[0xFA, 0xFF, 0x36, 0xFF, 0x01, 0x2C][..]));
        assert_eq!(frame.payload(), payload.as_slice());
        validate(frame.as_bytes())?;
        assert_eq!(Frame::parse(frame.as_bytes().to_vec())?, frame);
        Ok(())
    }

    #[test]
    fn test_payload_too_long() {
        let payload = vec![0u8; 2049];
        assert_eq!(
            Frame::new(MessageId::MT_DATA2, &payload),
            Err(EncodeError::PayloadTooLong(2049))
        );
    }

    #[test]
    fn test_display_hex_payload() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(MessageId::MT_DATA2, &[0x10, 0x20, 0x02, 0xAB, 0xCD])?;
        assert_eq!(frame.to_string(), "MTData2(102002abcd)");
        assert_eq!(format!("{frame:?}"), "Frame(faff3605102002abcd1c)");
        Ok(())
    }

    #[test]
    fn test_error_identifier_with_longer_payload_is_not_error_report() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(MessageId::ERROR, &[0x04, 0x00])?;
        assert!(!frame.is_error());
        assert_eq!(frame.error_code(), None);
        Ok(())
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(500))]

        #[test]
        fn prop_constructed_frames_sum_to_zero(mid in any::<u8>(), payload in proptest::collection::vec(any::<u8>(), 0..600)) {
            let frame = Frame::new(MessageId(mid), &payload)?;
            let sum = frame.as_bytes().iter().skip(1).fold(0u8, |acc, b| acc.wrapping_add(*b));
            prop_assert_eq!(sum, 0);
            prop_assert!(validate(frame.as_bytes()).is_ok());
            prop_assert_eq!(frame.payload(), payload.as_slice());
        }

        #[test]
        fn prop_single_payload_mutation_fails_validation(
            mid in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 1..300),
            index in any::<prop::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let frame = Frame::new(MessageId(mid), &payload)?;
            let header_len = if frame.is_extended() { EXTENDED_HEADER_LEN } else { STANDARD_HEADER_LEN };
            let mut bytes = frame.into_bytes();
            let position = header_len + index.index(payload.len());
            if let Some(byte) = bytes.get_mut(position) {
                *byte = byte.wrapping_add(delta);
            }
            prop_assert!(validate(&bytes).is_err());
        }
    }
}
