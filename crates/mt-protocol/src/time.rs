//! UTC timestamps reported by the device.

use std::fmt;

use crate::codec::ByteReader;
use crate::error::DecodeResult;

pub const UTC_TIME_SIZE: usize = 12;

/// Validity flags shared by UTC timestamps and GNSS PVT blocks.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UtcValidity(pub u8);

impl UtcValidity {
    pub const DATE_VALID: u8 = 0x01;
    pub const TIME_OF_DAY_VALID: u8 = 0x02;
    /// No seconds uncertainty left in the time of day.
    pub const FULLY_RESOLVED: u8 = 0x04;

    pub fn is_date_valid(self) -> bool {
        self.0 & Self::DATE_VALID != 0
    }

    pub fn is_time_of_day_valid(self) -> bool {
        self.0 & Self::TIME_OF_DAY_VALID != 0
    }

    pub fn is_fully_resolved(self) -> bool {
        self.0 & Self::FULLY_RESOLVED != 0
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UtcTime {
    /// Nanoseconds of the second.
    pub nanos: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub validity: UtcValidity,
}

impl UtcTime {
    /// The device marks a timestamp trustworthy once it is fully resolved.
    pub fn is_valid(&self) -> bool {
        self.validity.is_fully_resolved()
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            nanos: reader.read_u32()?,
            year: reader.read_u16()?,
            month: reader.read_u8()?,
            day: reader.read_u8()?,
            hour: reader.read_u8()?,
            minute: reader.read_u8()?,
            second: reader.read_u8()?,
            validity: UtcValidity(reader.read_u8()?),
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.nanos.to_be_bytes());
        out.extend_from_slice(&self.year.to_be_bytes());
        out.extend_from_slice(&[
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.validity.0,
        ]);
    }
}

/// RFC 3339 with the fractional second trimmed, e.g. `2018-08-09T13:59:04.7043Z`.
impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.nanos != 0 {
            let fraction = format!("{:09}", self.nanos);
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        f.write_str("Z")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: [u8; 12] = [
        0x29, 0xFA, 0xC3, 0xE0, 0x07, 0xE2, 0x08, 0x09, 0x0D, 0x3B, 0x04, 0xF7,
    ];

    #[test]
    fn test_decode_fixture() -> Result<(), Box<dyn std::error::Error>> {
        let time = UtcTime::read(&mut ByteReader::new(&FIXTURE))?;
        assert_eq!(time.nanos, 704_300_000);
        assert_eq!(time.year, 2018);
        assert_eq!((time.month, time.day), (8, 9));
        assert_eq!((time.hour, time.minute, time.second), (13, 59, 4));
        assert!(time.is_valid());
        assert_eq!(time.to_string(), "2018-08-09T13:59:04.7043Z");

        let mut out = Vec::new();
        time.write(&mut out);
        assert_eq!(out, FIXTURE.to_vec());
        Ok(())
    }

    #[test]
    fn test_validity_flags() {
        let validity = UtcValidity(0x03);
        assert!(validity.is_date_valid());
        assert!(validity.is_time_of_day_valid());
        assert!(!validity.is_fully_resolved());
    }

    #[test]
    fn test_display_whole_second() {
        let time = UtcTime {
            year: 2024,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
            ..UtcTime::default()
        };
        assert_eq!(time.to_string(), "2024-01-02T03:04:05Z");
    }
}
