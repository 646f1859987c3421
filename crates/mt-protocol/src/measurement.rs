//! Typed measurement values.
//!
//! [`Measurement`] has one variant per modeled [`DataKind`]. Floating point
//! variants follow the precision of their data identifier; the remaining
//! variants have fixed integer layouts.

use std::fmt;

use crate::codec::{ByteReader, write_floats};
use crate::data_id::{DataIdentifier, DataKind};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::gnss::{GNSS_SAT_INFO_HEADER_SIZE, GnssPvtData, GnssSatInfo};
use crate::time::UtcTime;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quaternion {
    pub q0: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        q0: 1.0,
        q1: 0.0,
        q2: 0.0,
        q3: 0.0,
    };

    fn to_array(self) -> [f64; 4] {
        [self.q0, self.q1, self.q2, self.q3]
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from([q0, q1, q2, q3]: [f64; 4]) -> Self {
        Self { q0, q1, q2, q3 }
    }
}

/// Row-major 3x3 matrix, elements `a` to `i` in wire order.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationMatrix(pub [f64; 9]);

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatLon {
    /// Degrees.
    pub lat: f64,
    /// Degrees.
    pub lon: f64,
}

/// 32-bit device status word.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatusWord(pub u32);

impl StatusWord {
    const fn bit(self, n: u32) -> bool {
        self.0 & (1 << n) != 0
    }

    pub const fn self_test(self) -> bool {
        self.bit(0)
    }

    pub const fn filter_valid(self) -> bool {
        self.bit(1)
    }

    pub const fn gnss_fix(self) -> bool {
        self.bit(2)
    }

    /// No-rotation update status, bits 3-4.
    pub const fn no_rotation_status(self) -> u8 {
        ((self.0 >> 3) & 0x03) as u8
    }

    pub const fn representative_motion(self) -> bool {
        self.bit(5)
    }

    /// Per-axis clip flags: accelerometer, gyroscope then magnetometer, X/Y/Z each.
    pub const fn clip_flags(self) -> u16 {
        ((self.0 >> 8) & 0x01FF) as u16
    }

    /// One or more sensors are out of range.
    pub const fn clipping(self) -> bool {
        self.bit(19)
    }

    pub const fn sync_in(self) -> bool {
        self.bit(21)
    }

    pub const fn sync_out(self) -> bool {
        self.bit(22)
    }

    /// Filter mode, bits 23-25.
    pub const fn filter_mode(self) -> u8 {
        ((self.0 >> 23) & 0x07) as u8
    }

    /// The status byte is the low byte of the status word.
    pub const fn status_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    /// Degrees Celsius.
    Temperature(f64),
    UtcTime(UtcTime),
    PacketCounter(u16),
    /// 10 kHz ticks.
    SampleTimeFine(u32),
    /// Seconds.
    SampleTimeCoarse(u32),
    Quaternion(Quaternion),
    RotationMatrix(RotationMatrix),
    /// Roll, pitch, yaw in degrees.
    EulerAngles(Vector3),
    /// Pascal.
    BaroPressure(u32),
    DeltaV(Vector3),
    Acceleration(Vector3),
    FreeAcceleration(Vector3),
    AccelerationHr(Vector3),
    /// Metres above the WGS84 ellipsoid.
    AltitudeEllipsoid(f64),
    PositionEcef(Vector3),
    LatLon(LatLon),
    GnssPvtData(Box<GnssPvtData>),
    GnssSatInfo(GnssSatInfo),
    RateOfTurn(Vector3),
    DeltaQ(Quaternion),
    RateOfTurnHr(Vector3),
    MagneticField(Vector3),
    VelocityXyz(Vector3),
    StatusByte(u8),
    StatusWord(StatusWord),
}

impl Measurement {
    pub fn kind(&self) -> DataKind {
        match self {
            Measurement::Temperature(_) => DataKind::Temperature,
            Measurement::UtcTime(_) => DataKind::UtcTime,
            Measurement::PacketCounter(_) => DataKind::PacketCounter,
            Measurement::SampleTimeFine(_) => DataKind::SampleTimeFine,
            Measurement::SampleTimeCoarse(_) => DataKind::SampleTimeCoarse,
            Measurement::Quaternion(_) => DataKind::Quaternion,
            Measurement::RotationMatrix(_) => DataKind::RotationMatrix,
            Measurement::EulerAngles(_) => DataKind::EulerAngles,
            Measurement::BaroPressure(_) => DataKind::BaroPressure,
            Measurement::DeltaV(_) => DataKind::DeltaV,
            Measurement::Acceleration(_) => DataKind::Acceleration,
            Measurement::FreeAcceleration(_) => DataKind::FreeAcceleration,
            Measurement::AccelerationHr(_) => DataKind::AccelerationHr,
            Measurement::AltitudeEllipsoid(_) => DataKind::AltitudeEllipsoid,
            Measurement::PositionEcef(_) => DataKind::PositionEcef,
            Measurement::LatLon(_) => DataKind::LatLon,
            Measurement::GnssPvtData(_) => DataKind::GnssPvtData,
            Measurement::GnssSatInfo(_) => DataKind::GnssSatInfo,
            Measurement::RateOfTurn(_) => DataKind::RateOfTurn,
            Measurement::DeltaQ(_) => DataKind::DeltaQ,
            Measurement::RateOfTurnHr(_) => DataKind::RateOfTurnHr,
            Measurement::MagneticField(_) => DataKind::MagneticField,
            Measurement::VelocityXyz(_) => DataKind::VelocityXyz,
            Measurement::StatusByte(_) => DataKind::StatusByte,
            Measurement::StatusWord(_) => DataKind::StatusWord,
        }
    }

    /// Decodes one sub-packet body. Returns `None` for kinds this crate does
    /// not model.
    pub fn decode(identifier: DataIdentifier, data: &[u8]) -> DecodeResult<Option<Self>> {
        let length_error = |expected: usize| DecodeError::InvalidDataLength {
            identifier,
            precision: identifier.precision,
            expected,
            actual: data.len(),
        };

        let precision = identifier.precision;
        let mut reader = ByteReader::new(data);

        if identifier.kind == DataKind::GnssSatInfo {
            if data.len() < GNSS_SAT_INFO_HEADER_SIZE {
                return Err(length_error(GNSS_SAT_INFO_HEADER_SIZE));
            }
            let (itow, num_svs, reserved) = GnssSatInfo::read_header(&mut reader)?;
            let expected = GnssSatInfo::encoded_len(usize::from(num_svs));
            if data.len() != expected {
                return Err(length_error(expected));
            }
            let satellites = GnssSatInfo::read_satellites(&mut reader, usize::from(num_svs))?;
            return Ok(Some(Measurement::GnssSatInfo(GnssSatInfo {
                itow,
                reserved,
                satellites,
            })));
        }

        if !identifier.kind.is_known() {
            return Ok(None);
        }
        let expected = identifier.data_size();
        if data.len() != expected {
            return Err(length_error(expected));
        }

        let vector = |reader: &mut ByteReader<'_>| -> DecodeResult<Vector3> {
            reader.read_floats::<3>(precision).map(Vector3::from)
        };
        let quaternion = |reader: &mut ByteReader<'_>| -> DecodeResult<Quaternion> {
            reader.read_floats::<4>(precision).map(Quaternion::from)
        };

        let measurement = match identifier.kind {
            DataKind::Temperature => Measurement::Temperature(reader.read_float(precision)?),
            DataKind::UtcTime => Measurement::UtcTime(UtcTime::read(&mut reader)?),
            DataKind::PacketCounter => Measurement::PacketCounter(reader.read_u16()?),
            DataKind::SampleTimeFine => Measurement::SampleTimeFine(reader.read_u32()?),
            DataKind::SampleTimeCoarse => Measurement::SampleTimeCoarse(reader.read_u32()?),
            DataKind::Quaternion => Measurement::Quaternion(quaternion(&mut reader)?),
            DataKind::RotationMatrix => {
                Measurement::RotationMatrix(RotationMatrix(reader.read_floats::<9>(precision)?))
            }
            DataKind::EulerAngles => Measurement::EulerAngles(vector(&mut reader)?),
            DataKind::BaroPressure => Measurement::BaroPressure(reader.read_u32()?),
            DataKind::DeltaV => Measurement::DeltaV(vector(&mut reader)?),
            DataKind::Acceleration => Measurement::Acceleration(vector(&mut reader)?),
            DataKind::FreeAcceleration => Measurement::FreeAcceleration(vector(&mut reader)?),
            DataKind::AccelerationHr => Measurement::AccelerationHr(vector(&mut reader)?),
            DataKind::AltitudeEllipsoid => {
                Measurement::AltitudeEllipsoid(reader.read_float(precision)?)
            }
            DataKind::PositionEcef => Measurement::PositionEcef(vector(&mut reader)?),
            DataKind::LatLon => {
                let [lat, lon] = reader.read_floats::<2>(precision)?;
                Measurement::LatLon(LatLon { lat, lon })
            }
            DataKind::GnssPvtData => {
                Measurement::GnssPvtData(Box::new(GnssPvtData::read(&mut reader)?))
            }
            DataKind::RateOfTurn => Measurement::RateOfTurn(vector(&mut reader)?),
            DataKind::DeltaQ => Measurement::DeltaQ(quaternion(&mut reader)?),
            DataKind::RateOfTurnHr => Measurement::RateOfTurnHr(vector(&mut reader)?),
            DataKind::MagneticField => Measurement::MagneticField(vector(&mut reader)?),
            DataKind::VelocityXyz => Measurement::VelocityXyz(vector(&mut reader)?),
            DataKind::StatusByte => Measurement::StatusByte(reader.read_u8()?),
            DataKind::StatusWord => Measurement::StatusWord(StatusWord(reader.read_u32()?)),
            DataKind::GnssSatInfo | DataKind::Unknown(_) => return Ok(None),
        };
        Ok(Some(measurement))
    }

    /// Appends the sub-packet body for `identifier`, whose kind must match.
    pub fn encode(&self, identifier: DataIdentifier, out: &mut Vec<u8>) -> EncodeResult<()> {
        if identifier.kind != self.kind() {
            return Err(EncodeError::KindMismatch {
                measurement: self.kind().name().unwrap_or("Unknown"),
                identifier,
            });
        }
        let precision = identifier.precision;
        match self {
            Measurement::Temperature(value) | Measurement::AltitudeEllipsoid(value) => {
                precision.encode(*value, out);
            }
            Measurement::UtcTime(time) => time.write(out),
            Measurement::PacketCounter(value) => out.extend_from_slice(&value.to_be_bytes()),
            Measurement::SampleTimeFine(value)
            | Measurement::SampleTimeCoarse(value)
            | Measurement::BaroPressure(value) => out.extend_from_slice(&value.to_be_bytes()),
            Measurement::Quaternion(q) | Measurement::DeltaQ(q) => {
                write_floats(precision, &q.to_array(), out);
            }
            Measurement::RotationMatrix(m) => write_floats(precision, &m.0, out),
            Measurement::EulerAngles(v)
            | Measurement::DeltaV(v)
            | Measurement::Acceleration(v)
            | Measurement::FreeAcceleration(v)
            | Measurement::AccelerationHr(v)
            | Measurement::PositionEcef(v)
            | Measurement::RateOfTurn(v)
            | Measurement::RateOfTurnHr(v)
            | Measurement::MagneticField(v)
            | Measurement::VelocityXyz(v) => write_floats(precision, &v.to_array(), out),
            Measurement::LatLon(ll) => write_floats(precision, &[ll.lat, ll.lon], out),
            Measurement::GnssPvtData(pvt) => pvt.write(out),
            Measurement::GnssSatInfo(info) => info.write(out),
            Measurement::StatusByte(value) => out.push(*value),
            Measurement::StatusWord(word) => out.extend_from_slice(&word.0.to_be_bytes()),
        }
        Ok(())
    }

    /// Encodes a complete `[id_hi][id_lo][len][data]` sub-packet.
    pub fn encode_packet(&self, identifier: DataIdentifier) -> EncodeResult<Vec<u8>> {
        let mut data = Vec::new();
        self.encode(identifier, &mut data)?;
        let len = u8::try_from(data.len()).map_err(|_| EncodeError::SubPacketTooLong(data.len()))?;

        let mut packet = Vec::with_capacity(data.len() + 3);
        packet.extend_from_slice(&identifier.to_u16().to_be_bytes());
        packet.push(len);
        packet.extend_from_slice(&data);
        Ok(packet)
    }
}

fn write_vector(f: &mut fmt::Formatter<'_>, v: &Vector3) -> fmt::Result {
    write!(f, "({}, {}, {})", v.x, v.y, v.z)
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind())?;
        match self {
            Measurement::Temperature(value) | Measurement::AltitudeEllipsoid(value) => {
                write!(f, "{value}")
            }
            Measurement::UtcTime(time) => write!(f, "{time}"),
            Measurement::PacketCounter(value) => write!(f, "{value}"),
            Measurement::SampleTimeFine(value)
            | Measurement::SampleTimeCoarse(value)
            | Measurement::BaroPressure(value) => write!(f, "{value}"),
            Measurement::Quaternion(q) | Measurement::DeltaQ(q) => {
                write!(f, "({}, {}, {}, {})", q.q0, q.q1, q.q2, q.q3)
            }
            Measurement::RotationMatrix(m) => write!(f, "{:?}", m.0),
            Measurement::EulerAngles(v)
            | Measurement::DeltaV(v)
            | Measurement::Acceleration(v)
            | Measurement::FreeAcceleration(v)
            | Measurement::AccelerationHr(v)
            | Measurement::PositionEcef(v)
            | Measurement::RateOfTurn(v)
            | Measurement::RateOfTurnHr(v)
            | Measurement::MagneticField(v)
            | Measurement::VelocityXyz(v) => write_vector(f, v),
            Measurement::LatLon(ll) => write!(f, "({}, {})", ll.lat, ll.lon),
            Measurement::GnssPvtData(pvt) => write!(
                f,
                "fix={:?} sv={} lat={} lon={}",
                pvt.fix_type,
                pvt.num_sv,
                pvt.latitude_deg(),
                pvt.longitude_deg()
            ),
            Measurement::GnssSatInfo(info) => write!(f, "{} satellites", info.satellites.len()),
            Measurement::StatusByte(value) => write!(f, "{value:08b}"),
            Measurement::StatusWord(word) => write!(f, "{word}"),
        }
    }
}
