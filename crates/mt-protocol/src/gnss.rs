//! GNSS receiver blocks: position/velocity/time solution and satellite info.

use crate::codec::ByteReader;
use crate::error::DecodeResult;
use crate::time::UtcValidity;

pub const GNSS_PVT_SIZE: usize = 94;
pub const GNSS_SAT_INFO_HEADER_SIZE: usize = 8;
pub const GNSS_SATELLITE_SIZE: usize = 4;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixType {
    NoFix,
    DeadReckoning,
    Fix2D,
    Fix3D,
    /// GNSS combined with dead reckoning.
    GnssDeadReckoning,
    TimeOnly,
    Unknown(u8),
}

impl FixType {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x00 => FixType::NoFix,
            0x01 => FixType::DeadReckoning,
            0x02 => FixType::Fix2D,
            0x03 => FixType::Fix3D,
            0x04 => FixType::GnssDeadReckoning,
            0x05 => FixType::TimeOnly,
            other => FixType::Unknown(other),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            FixType::NoFix => 0x00,
            FixType::DeadReckoning => 0x01,
            FixType::Fix2D => 0x02,
            FixType::Fix3D => 0x03,
            FixType::GnssDeadReckoning => 0x04,
            FixType::TimeOnly => 0x05,
            FixType::Unknown(value) => value,
        }
    }
}

/// Navigation solution as reported by the GNSS receiver.
///
/// Integer fields keep their wire scaling; the accessor methods convert to
/// degrees and metres.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GnssPvtData {
    /// GPS time of week, ms.
    pub itow: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub validity: UtcValidity,
    /// Time accuracy estimate, ns.
    pub time_accuracy: u32,
    /// Fraction of second, ns.
    pub nano: i32,
    pub fix_type: FixType,
    pub flags: u8,
    pub num_sv: u8,
    pub reserved: u8,
    /// 1e-7 deg
    pub lon: i32,
    /// 1e-7 deg
    pub lat: i32,
    /// Height above ellipsoid, mm.
    pub height: i32,
    /// Height above mean sea level, mm.
    pub height_msl: i32,
    pub horizontal_accuracy: u32,
    pub vertical_accuracy: u32,
    /// NED velocity, mm/s.
    pub vel_north: i32,
    pub vel_east: i32,
    pub vel_down: i32,
    pub ground_speed: i32,
    /// 1e-5 deg
    pub heading_motion: i32,
    pub speed_accuracy: u32,
    pub heading_accuracy: u32,
    /// 1e-5 deg
    pub heading_vehicle: u32,
    /// Dilutions of precision, scale 0.01.
    pub gdop: u16,
    pub pdop: u16,
    pub tdop: u16,
    pub vdop: u16,
    pub hdop: u16,
    pub ndop: u16,
    pub edop: u16,
}

impl GnssPvtData {
    pub const FLAG_FIX_OK: u8 = 0x01;
    pub const FLAG_DIFFERENTIAL: u8 = 0x02;
    pub const FLAG_HEADING_VALID: u8 = 0x20;

    pub fn latitude_deg(&self) -> f64 {
        f64::from(self.lat) * 1e-7
    }

    pub fn longitude_deg(&self) -> f64 {
        f64::from(self.lon) * 1e-7
    }

    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 1000.0
    }

    pub fn has_valid_fix(&self) -> bool {
        self.flags & Self::FLAG_FIX_OK != 0
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            itow: reader.read_u32()?,
            year: reader.read_u16()?,
            month: reader.read_u8()?,
            day: reader.read_u8()?,
            hour: reader.read_u8()?,
            minute: reader.read_u8()?,
            second: reader.read_u8()?,
            validity: UtcValidity(reader.read_u8()?),
            time_accuracy: reader.read_u32()?,
            nano: reader.read_i32()?,
            fix_type: FixType::from_u8(reader.read_u8()?),
            flags: reader.read_u8()?,
            num_sv: reader.read_u8()?,
            reserved: reader.read_u8()?,
            lon: reader.read_i32()?,
            lat: reader.read_i32()?,
            height: reader.read_i32()?,
            height_msl: reader.read_i32()?,
            horizontal_accuracy: reader.read_u32()?,
            vertical_accuracy: reader.read_u32()?,
            vel_north: reader.read_i32()?,
            vel_east: reader.read_i32()?,
            vel_down: reader.read_i32()?,
            ground_speed: reader.read_i32()?,
            heading_motion: reader.read_i32()?,
            speed_accuracy: reader.read_u32()?,
            heading_accuracy: reader.read_u32()?,
            heading_vehicle: reader.read_u32()?,
            gdop: reader.read_u16()?,
            pdop: reader.read_u16()?,
            tdop: reader.read_u16()?,
            vdop: reader.read_u16()?,
            hdop: reader.read_u16()?,
            ndop: reader.read_u16()?,
            edop: reader.read_u16()?,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.itow.to_be_bytes());
        out.extend_from_slice(&self.year.to_be_bytes());
        out.extend_from_slice(&[
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.validity.0,
        ]);
        out.extend_from_slice(&self.time_accuracy.to_be_bytes());
        out.extend_from_slice(&self.nano.to_be_bytes());
        out.extend_from_slice(&[self.fix_type.to_u8(), self.flags, self.num_sv, self.reserved]);
        for value in [self.lon, self.lat, self.height, self.height_msl] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        for value in [self.horizontal_accuracy, self.vertical_accuracy] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        for value in [
            self.vel_north,
            self.vel_east,
            self.vel_down,
            self.ground_speed,
            self.heading_motion,
        ] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        for value in [
            self.speed_accuracy,
            self.heading_accuracy,
            self.heading_vehicle,
        ] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        for value in [
            self.gdop, self.pdop, self.tdop, self.vdop, self.hdop, self.ndop, self.edop,
        ] {
            out.extend_from_slice(&value.to_be_bytes());
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GnssSatellite {
    /// 0 GPS, 1 SBAS, 2 Galileo, 3 BeiDou, 4 IMES, 5 QZSS, 6 GLONASS.
    pub gnss_id: u8,
    pub sv_id: u8,
    /// Carrier to noise ratio, dBHz.
    pub cno: u8,
    pub flags: u8,
}

impl GnssSatellite {
    /// Signal quality indicator, 0 (no signal) to 7 (code and carrier locked).
    pub fn signal_quality(&self) -> u8 {
        self.flags & 0x07
    }

    pub fn is_used_for_navigation(&self) -> bool {
        self.flags & 0x08 != 0
    }

    /// 0 unknown, 1 healthy, 2 unhealthy.
    pub fn health(&self) -> u8 {
        (self.flags >> 4) & 0x03
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GnssSatInfo {
    /// GPS time of week, ms.
    pub itow: u32,
    pub reserved: [u8; 3],
    pub satellites: Vec<GnssSatellite>,
}

impl GnssSatInfo {
    /// Byte count of a block carrying `count` satellites.
    pub const fn encoded_len(count: usize) -> usize {
        GNSS_SAT_INFO_HEADER_SIZE + count * GNSS_SATELLITE_SIZE
    }

    /// Reads the header only, returning the announced satellite count.
    pub(crate) fn read_header(reader: &mut ByteReader<'_>) -> DecodeResult<(u32, u8, [u8; 3])> {
        let itow = reader.read_u32()?;
        let num_svs = reader.read_u8()?;
        let reserved = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];
        Ok((itow, num_svs, reserved))
    }

    pub(crate) fn read_satellites(
        reader: &mut ByteReader<'_>,
        count: usize,
    ) -> DecodeResult<Vec<GnssSatellite>> {
        let mut satellites = Vec::with_capacity(count);
        for _ in 0..count {
            satellites.push(GnssSatellite {
                gnss_id: reader.read_u8()?,
                sv_id: reader.read_u8()?,
                cno: reader.read_u8()?,
                flags: reader.read_u8()?,
            });
        }
        Ok(satellites)
    }

    /// Writes the block; the satellite count byte saturates at 255 entries.
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        let count = u8::try_from(self.satellites.len()).unwrap_or(u8::MAX);
        out.extend_from_slice(&self.itow.to_be_bytes());
        out.push(count);
        out.extend_from_slice(&self.reserved);
        for sat in self.satellites.iter().take(usize::from(count)) {
            out.extend_from_slice(&[sat.gnss_id, sat.sv_id, sat.cno, sat.flags]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pvt() -> GnssPvtData {
        GnssPvtData {
            itow: 395_000_000,
            year: 2018,
            month: 8,
            day: 9,
            hour: 13,
            minute: 59,
            second: 2,
            validity: UtcValidity(0x07),
            time_accuracy: 25,
            nano: -120_000,
            fix_type: FixType::Fix3D,
            flags: GnssPvtData::FLAG_FIX_OK | GnssPvtData::FLAG_HEADING_VALID,
            num_sv: 12,
            reserved: 0,
            lon: 133_700_000,
            lat: 420_000_000,
            height: 54_321,
            height_msl: 12_345,
            horizontal_accuracy: 800,
            vertical_accuracy: 1200,
            vel_north: -150,
            vel_east: 300,
            vel_down: 5,
            ground_speed: 335,
            heading_motion: 11_650_000,
            speed_accuracy: 90,
            heading_accuracy: 400_000,
            heading_vehicle: 11_600_000,
            gdop: 150,
            pdop: 120,
            tdop: 80,
            vdop: 100,
            hdop: 70,
            ndop: 50,
            edop: 60,
        }
    }

    #[test]
    fn test_pvt_layout_is_94_bytes() -> Result<(), Box<dyn std::error::Error>> {
        let pvt = sample_pvt();
        let mut out = Vec::new();
        pvt.write(&mut out);
        assert_eq!(out.len(), GNSS_PVT_SIZE);
        // fix type sits right after tacc and nano
        assert_eq!(out.get(20), Some(&0x03));

        let mut reader = ByteReader::new(&out);
        assert_eq!(GnssPvtData::read(&mut reader)?, pvt);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_pvt_scaled_accessors() {
        let pvt = sample_pvt();
        assert!((pvt.latitude_deg() - 42.0).abs() < 1e-9);
        assert!((pvt.longitude_deg() - 13.37).abs() < 1e-9);
        assert!((pvt.height_m() - 54.321).abs() < 1e-9);
        assert!(pvt.has_valid_fix());
    }

    #[test]
    fn test_fix_type_roundtrip() {
        for value in 0..=u8::MAX {
            assert_eq!(FixType::from_u8(value).to_u8(), value);
        }
        assert_eq!(FixType::from_u8(3), FixType::Fix3D);
    }

    #[test]
    fn test_satellite_flags() {
        let sat = GnssSatellite {
            gnss_id: 0,
            sv_id: 8,
            cno: 0x1F,
            flags: 0x1F,
        };
        assert_eq!(sat.signal_quality(), 7);
        assert!(sat.is_used_for_navigation());
        assert_eq!(sat.health(), 1);
    }
}
