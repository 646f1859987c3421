//! Device identity replies.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};

/// Device serial number.
///
/// Older devices reply with 4 bytes; newer ones with 8 bytes of which the low
/// 4 carry the identifier.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

impl DeviceId {
    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        match payload {
            [a, b, c, d] | [_, _, _, _, a, b, c, d] => {
                Ok(Self(u32::from_be_bytes([*a, *b, *c, *d])))
            }
            _ => Err(DecodeError::InvalidPayloadLength {
                what: "device id",
                actual: payload.len(),
            }),
        }
    }

    pub fn encode(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// Eight lowercase hex digits, e.g. `037003f8`.
impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// ASCII product code with surrounding whitespace removed.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductCode(pub String);

impl ProductCode {
    pub fn decode(payload: &[u8]) -> Self {
        Self(String::from_utf8_lossy(payload).trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl HardwareVersion {
    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let [major, minor] = payload else {
            return Err(DecodeError::InvalidPayloadLength {
                what: "hardware version",
                actual: payload.len(),
            });
        };
        Ok(Self {
            major: *major,
            minor: *minor,
        })
    }

    pub fn encode(&self) -> [u8; 2] {
        [self.major, self.minor]
    }
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
