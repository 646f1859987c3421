//! CAN bus output and interface configuration payloads.

use std::fmt;

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};

pub const CAN_OUTPUT_SETTING_SIZE: usize = 8;
pub const CAN_CONFIGURATION_SIZE: usize = 4;

const CAN_DATA_ID_MASK: u8 = 0x7F;
const CAN_ID_LENGTH_MASK: u8 = 0x01;
const CAN_ID_MASK_MASK: u32 = 0x1FFF_FFFF;
const CAN_FREQUENCY_MASK: u16 = 0x07FF;
const CAN_BAUD_RATE_MASK: u8 = 0x7F;

/// Identifier of a CAN output message.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanDataId(pub u8);

impl CanDataId {
    pub const INVALID: CanDataId = CanDataId(0x00);
    pub const ERROR: CanDataId = CanDataId(0x01);
    pub const WARNING: CanDataId = CanDataId(0x02);
    pub const SAMPLE_TIME: CanDataId = CanDataId(0x05);
    pub const GROUP_COUNTER: CanDataId = CanDataId(0x06);
    pub const UTC_TIME: CanDataId = CanDataId(0x07);
    pub const STATUS_WORD: CanDataId = CanDataId(0x11);
    pub const QUATERNION: CanDataId = CanDataId(0x21);
    pub const EULER_ANGLES: CanDataId = CanDataId(0x22);
    pub const DELTA_V: CanDataId = CanDataId(0x31);
    pub const RATE_OF_TURN: CanDataId = CanDataId(0x32);
    pub const DELTA_Q: CanDataId = CanDataId(0x33);
    pub const ACCELERATION: CanDataId = CanDataId(0x34);
    pub const FREE_ACCELERATION: CanDataId = CanDataId(0x35);
    pub const MAGNETIC_FIELD: CanDataId = CanDataId(0x41);
    pub const TEMPERATURE: CanDataId = CanDataId(0x51);
    pub const BARO_PRESSURE: CanDataId = CanDataId(0x52);
    pub const RATE_OF_TURN_HR: CanDataId = CanDataId(0x61);
    pub const ACCELERATION_HR: CanDataId = CanDataId(0x62);
    pub const LAT_LON: CanDataId = CanDataId(0x71);
    pub const ALTITUDE_ELLIPSOID: CanDataId = CanDataId(0x72);
    pub const POSITION_ECEF_X: CanDataId = CanDataId(0x73);
    pub const POSITION_ECEF_Y: CanDataId = CanDataId(0x74);
    pub const POSITION_ECEF_Z: CanDataId = CanDataId(0x75);
    pub const VELOCITY_XYZ: CanDataId = CanDataId(0x76);
    pub const GNSS_RECEIVER_STATUS: CanDataId = CanDataId(0x79);
    pub const GNSS_RECEIVER_DOP: CanDataId = CanDataId(0x7A);

    const NAMES: [(CanDataId, &'static str); 27] = [
        (Self::INVALID, "Invalid"),
        (Self::ERROR, "Error"),
        (Self::WARNING, "Warning"),
        (Self::SAMPLE_TIME, "SampleTime"),
        (Self::GROUP_COUNTER, "GroupCounter"),
        (Self::UTC_TIME, "UtcTime"),
        (Self::STATUS_WORD, "StatusWord"),
        (Self::QUATERNION, "Quaternion"),
        (Self::EULER_ANGLES, "EulerAngles"),
        (Self::DELTA_V, "DeltaV"),
        (Self::RATE_OF_TURN, "RateOfTurn"),
        (Self::DELTA_Q, "DeltaQ"),
        (Self::ACCELERATION, "Acceleration"),
        (Self::FREE_ACCELERATION, "FreeAcceleration"),
        (Self::MAGNETIC_FIELD, "MagneticField"),
        (Self::TEMPERATURE, "Temperature"),
        (Self::BARO_PRESSURE, "BaroPressure"),
        (Self::RATE_OF_TURN_HR, "RateOfTurnHr"),
        (Self::ACCELERATION_HR, "AccelerationHr"),
        (Self::LAT_LON, "LatLon"),
        (Self::ALTITUDE_ELLIPSOID, "AltitudeEllipsoid"),
        (Self::POSITION_ECEF_X, "PositionEcefX"),
        (Self::POSITION_ECEF_Y, "PositionEcefY"),
        (Self::POSITION_ECEF_Z, "PositionEcefZ"),
        (Self::VELOCITY_XYZ, "VelocityXyz"),
        (Self::GNSS_RECEIVER_STATUS, "GnssReceiverStatus"),
        (Self::GNSS_RECEIVER_DOP, "GnssReceiverDop"),
    ];

    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for CanDataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "CanDataId(0x{:02X})", self.0),
        }
    }
}

impl std::str::FromStr for CanDataId {
    type Err = crate::error::ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(id, _)| *id)
            .ok_or_else(|| crate::error::ParseNameError {
                what: "CAN data identifier",
                value: s.to_string(),
            })
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanOutputSetting {
    pub data_id: CanDataId,
    /// 29-bit identifiers when set, 11-bit otherwise.
    pub extended_id: bool,
    pub id_mask: u32,
    /// Hz, 11 bits on the wire.
    pub frequency: u16,
}

impl CanOutputSetting {
    pub const fn id_bits(&self) -> u8 {
        if self.extended_id { 29 } else { 11 }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push(self.data_id.0 & CAN_DATA_ID_MASK);
        out.push(u8::from(self.extended_id) & CAN_ID_LENGTH_MASK);
        out.extend_from_slice(&(self.id_mask & CAN_ID_MASK_MASK).to_be_bytes());
        out.extend_from_slice(&(self.frequency & CAN_FREQUENCY_MASK).to_be_bytes());
    }

    fn read(entry: &[u8; CAN_OUTPUT_SETTING_SIZE]) -> Self {
        let [data_id, flag, m3, m2, m1, m0, f1, f0] = *entry;
        Self {
            data_id: CanDataId(data_id & CAN_DATA_ID_MASK),
            extended_id: flag & CAN_ID_LENGTH_MASK != 0,
            id_mask: u32::from_be_bytes([m3, m2, m1, m0]) & CAN_ID_MASK_MASK,
            frequency: u16::from_be_bytes([f1, f0]) & CAN_FREQUENCY_MASK,
        }
    }
}

impl fmt::Display for CanOutputSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} Hz, {} bit ids, mask 0x{:08X}",
            self.data_id,
            self.frequency,
            self.id_bits(),
            self.id_mask
        )
    }
}

/// CAN output configuration; 8 bytes per entry on the wire.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CanOutputConfiguration {
    pub settings: Vec<CanOutputSetting>,
}

impl CanOutputConfiguration {
    pub fn new(settings: Vec<CanOutputSetting>) -> Self {
        Self { settings }
    }

    /// Encodes every entry; fails if the payload would not fit one frame.
    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        let len = self.settings.len() * CAN_OUTPUT_SETTING_SIZE;
        if len > crate::frame::MAX_EXTENDED_PAYLOAD_LEN {
            return Err(EncodeError::PayloadTooLong(len));
        }
        let mut out = Vec::with_capacity(len);
        for setting in &self.settings {
            setting.write(&mut out);
        }
        Ok(out)
    }

    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let (entries, rest) = payload.as_chunks::<CAN_OUTPUT_SETTING_SIZE>();
        if !rest.is_empty() {
            return Err(DecodeError::InvalidPayloadLength {
                what: "CAN output configuration",
                actual: payload.len(),
            });
        }
        Ok(Self {
            settings: entries.iter().map(CanOutputSetting::read).collect(),
        })
    }
}

impl fmt::Display for CanOutputConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, setting) in self.settings.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{setting}")?;
        }
        Ok(())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanBaudRate {
    Kbps5,
    Kbps10,
    Kbps20,
    Kbps33_3,
    Kbps50,
    Kbps62_5,
    Kbps83_3,
    Kbps100,
    Kbps125,
    Kbps250,
    Kbps500,
    Kbps800,
    Mbps1,
    Unknown(u8),
}

impl CanBaudRate {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x00 => CanBaudRate::Kbps250,
            0x01 => CanBaudRate::Kbps125,
            0x02 => CanBaudRate::Kbps100,
            0x03 => CanBaudRate::Kbps83_3,
            0x04 => CanBaudRate::Kbps62_5,
            0x05 => CanBaudRate::Kbps50,
            0x06 => CanBaudRate::Kbps33_3,
            0x07 => CanBaudRate::Kbps20,
            0x08 => CanBaudRate::Kbps10,
            0x09 => CanBaudRate::Kbps5,
            0x0A => CanBaudRate::Kbps500,
            0x0B => CanBaudRate::Kbps800,
            0x0C => CanBaudRate::Mbps1,
            other => CanBaudRate::Unknown(other),
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            CanBaudRate::Kbps250 => 0x00,
            CanBaudRate::Kbps125 => 0x01,
            CanBaudRate::Kbps100 => 0x02,
            CanBaudRate::Kbps83_3 => 0x03,
            CanBaudRate::Kbps62_5 => 0x04,
            CanBaudRate::Kbps50 => 0x05,
            CanBaudRate::Kbps33_3 => 0x06,
            CanBaudRate::Kbps20 => 0x07,
            CanBaudRate::Kbps10 => 0x08,
            CanBaudRate::Kbps5 => 0x09,
            CanBaudRate::Kbps500 => 0x0A,
            CanBaudRate::Kbps800 => 0x0B,
            CanBaudRate::Mbps1 => 0x0C,
            CanBaudRate::Unknown(code) => code,
        }
    }

    /// Maps a nominal bit rate to its code; `None` for rates the interface
    /// does not support.
    pub const fn from_bits_per_second(rate: u32) -> Option<Self> {
        let baud = match rate {
            5_000 => CanBaudRate::Kbps5,
            10_000 => CanBaudRate::Kbps10,
            20_000 => CanBaudRate::Kbps20,
            33_300 => CanBaudRate::Kbps33_3,
            50_000 => CanBaudRate::Kbps50,
            62_500 => CanBaudRate::Kbps62_5,
            83_300 => CanBaudRate::Kbps83_3,
            100_000 => CanBaudRate::Kbps100,
            125_000 => CanBaudRate::Kbps125,
            250_000 => CanBaudRate::Kbps250,
            500_000 => CanBaudRate::Kbps500,
            800_000 => CanBaudRate::Kbps800,
            1_000_000 => CanBaudRate::Mbps1,
            _ => return None,
        };
        Some(baud)
    }

    pub const fn bits_per_second(self) -> Option<u32> {
        let rate = match self {
            CanBaudRate::Kbps5 => 5_000,
            CanBaudRate::Kbps10 => 10_000,
            CanBaudRate::Kbps20 => 20_000,
            CanBaudRate::Kbps33_3 => 33_300,
            CanBaudRate::Kbps50 => 50_000,
            CanBaudRate::Kbps62_5 => 62_500,
            CanBaudRate::Kbps83_3 => 83_300,
            CanBaudRate::Kbps100 => 100_000,
            CanBaudRate::Kbps125 => 125_000,
            CanBaudRate::Kbps250 => 250_000,
            CanBaudRate::Kbps500 => 500_000,
            CanBaudRate::Kbps800 => 800_000,
            CanBaudRate::Mbps1 => 1_000_000,
            CanBaudRate::Unknown(_) => return None,
        };
        Some(rate)
    }
}

impl fmt::Display for CanBaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bits_per_second() {
            Some(rate) => write!(f, "{rate} bps"),
            None => write!(f, "CanBaudRate(0x{:02X})", self.code()),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanConfiguration {
    pub enabled: bool,
    pub baud_rate: CanBaudRate,
}

impl CanConfiguration {
    /// `[0, 0, enable, baud]`.
    pub fn encode(&self) -> [u8; CAN_CONFIGURATION_SIZE] {
        [
            0,
            0,
            u8::from(self.enabled),
            self.baud_rate.code() & CAN_BAUD_RATE_MASK,
        ]
    }

    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let [_, _, enable, baud] = payload else {
            return Err(DecodeError::InvalidPayloadLength {
                what: "CAN configuration",
                actual: payload.len(),
            });
        };
        Ok(Self {
            enabled: enable & 0x01 != 0,
            baud_rate: CanBaudRate::from_code(baud & CAN_BAUD_RATE_MASK),
        })
    }
}

impl fmt::Display for CanConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enabled: {}, BaudRate: {}", self.enabled, self.baud_rate)
    }
}
