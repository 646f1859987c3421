//! Data identifiers.
//!
//! A data identifier is a 16-bit descriptor made of three disjoint subfields:
//!
//! ```text
//! | 15 .. 11 | 10 .. 8  | 7 .. 4 | 3 .. 2     | 1 .. 0    |
//! | group    | reserved | type   | coord. sys | precision |
//! ```
//!
//! Group and type together form the measurement kind (mask `0xF8F0`).

use std::fmt;
use std::str::FromStr;

use crate::error::ParseNameError;
use crate::precision::{PRECISION_MASK, Precision};

pub const KIND_MASK: u16 = 0xF8F0;
pub const COORDINATE_SYSTEM_MASK: u16 = 0x000C;

/// Raw kind bits the crate does not model.
///
/// Only obtainable by masking a raw identifier, so it always lies inside
/// [`KIND_MASK`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnknownKind(u16);

impl UnknownKind {
    pub const fn bits(self) -> u16 {
        self.0
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Temperature,
    UtcTime,
    PacketCounter,
    SampleTimeFine,
    SampleTimeCoarse,
    Quaternion,
    RotationMatrix,
    EulerAngles,
    BaroPressure,
    DeltaV,
    Acceleration,
    FreeAcceleration,
    AccelerationHr,
    AltitudeEllipsoid,
    PositionEcef,
    LatLon,
    GnssPvtData,
    GnssSatInfo,
    RateOfTurn,
    DeltaQ,
    RateOfTurnHr,
    MagneticField,
    VelocityXyz,
    StatusByte,
    StatusWord,
    Unknown(UnknownKind),
}

impl DataKind {
    pub const KNOWN: [DataKind; 25] = [
        DataKind::Temperature,
        DataKind::UtcTime,
        DataKind::PacketCounter,
        DataKind::SampleTimeFine,
        DataKind::SampleTimeCoarse,
        DataKind::Quaternion,
        DataKind::RotationMatrix,
        DataKind::EulerAngles,
        DataKind::BaroPressure,
        DataKind::DeltaV,
        DataKind::Acceleration,
        DataKind::FreeAcceleration,
        DataKind::AccelerationHr,
        DataKind::AltitudeEllipsoid,
        DataKind::PositionEcef,
        DataKind::LatLon,
        DataKind::GnssPvtData,
        DataKind::GnssSatInfo,
        DataKind::RateOfTurn,
        DataKind::DeltaQ,
        DataKind::RateOfTurnHr,
        DataKind::MagneticField,
        DataKind::VelocityXyz,
        DataKind::StatusByte,
        DataKind::StatusWord,
    ];

    /// Extracts the kind subfield from a raw data identifier.
    pub const fn from_bits(raw: u16) -> Self {
        match raw & KIND_MASK {
            0x0810 => DataKind::Temperature,
            0x1010 => DataKind::UtcTime,
            0x1020 => DataKind::PacketCounter,
            0x1060 => DataKind::SampleTimeFine,
            0x1070 => DataKind::SampleTimeCoarse,
            0x2010 => DataKind::Quaternion,
            0x2020 => DataKind::RotationMatrix,
            0x2030 => DataKind::EulerAngles,
            0x3010 => DataKind::BaroPressure,
            0x4010 => DataKind::DeltaV,
            0x4020 => DataKind::Acceleration,
            0x4030 => DataKind::FreeAcceleration,
            0x4040 => DataKind::AccelerationHr,
            0x5020 => DataKind::AltitudeEllipsoid,
            0x5030 => DataKind::PositionEcef,
            0x5040 => DataKind::LatLon,
            0x7010 => DataKind::GnssPvtData,
            0x7020 => DataKind::GnssSatInfo,
            0x8020 => DataKind::RateOfTurn,
            0x8030 => DataKind::DeltaQ,
            0x8040 => DataKind::RateOfTurnHr,
            0xC020 => DataKind::MagneticField,
            0xD010 => DataKind::VelocityXyz,
            0xE010 => DataKind::StatusByte,
            0xE020 => DataKind::StatusWord,
            other => DataKind::Unknown(UnknownKind(other)),
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            DataKind::Temperature => 0x0810,
            DataKind::UtcTime => 0x1010,
            DataKind::PacketCounter => 0x1020,
            DataKind::SampleTimeFine => 0x1060,
            DataKind::SampleTimeCoarse => 0x1070,
            DataKind::Quaternion => 0x2010,
            DataKind::RotationMatrix => 0x2020,
            DataKind::EulerAngles => 0x2030,
            DataKind::BaroPressure => 0x3010,
            DataKind::DeltaV => 0x4010,
            DataKind::Acceleration => 0x4020,
            DataKind::FreeAcceleration => 0x4030,
            DataKind::AccelerationHr => 0x4040,
            DataKind::AltitudeEllipsoid => 0x5020,
            DataKind::PositionEcef => 0x5030,
            DataKind::LatLon => 0x5040,
            DataKind::GnssPvtData => 0x7010,
            DataKind::GnssSatInfo => 0x7020,
            DataKind::RateOfTurn => 0x8020,
            DataKind::DeltaQ => 0x8030,
            DataKind::RateOfTurnHr => 0x8040,
            DataKind::MagneticField => 0xC020,
            DataKind::VelocityXyz => 0xD010,
            DataKind::StatusByte => 0xE010,
            DataKind::StatusWord => 0xE020,
            DataKind::Unknown(unknown) => unknown.bits(),
        }
    }

    pub const fn name(self) -> Option<&'static str> {
        let name = match self {
            DataKind::Temperature => "Temperature",
            DataKind::UtcTime => "UtcTime",
            DataKind::PacketCounter => "PacketCounter",
            DataKind::SampleTimeFine => "SampleTimeFine",
            DataKind::SampleTimeCoarse => "SampleTimeCoarse",
            DataKind::Quaternion => "Quaternion",
            DataKind::RotationMatrix => "RotationMatrix",
            DataKind::EulerAngles => "EulerAngles",
            DataKind::BaroPressure => "BaroPressure",
            DataKind::DeltaV => "DeltaV",
            DataKind::Acceleration => "Acceleration",
            DataKind::FreeAcceleration => "FreeAcceleration",
            DataKind::AccelerationHr => "AccelerationHr",
            DataKind::AltitudeEllipsoid => "AltitudeEllipsoid",
            DataKind::PositionEcef => "PositionEcef",
            DataKind::LatLon => "LatLon",
            DataKind::GnssPvtData => "GnssPvtData",
            DataKind::GnssSatInfo => "GnssSatInfo",
            DataKind::RateOfTurn => "RateOfTurn",
            DataKind::DeltaQ => "DeltaQ",
            DataKind::RateOfTurnHr => "RateOfTurnHr",
            DataKind::MagneticField => "MagneticField",
            DataKind::VelocityXyz => "VelocityXyz",
            DataKind::StatusByte => "StatusByte",
            DataKind::StatusWord => "StatusWord",
            DataKind::Unknown(_) => return None,
        };
        Some(name)
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, DataKind::Unknown(_))
    }

    /// Kinds whose output precision is configurable.
    pub const fn has_precision(self) -> bool {
        matches!(
            self,
            DataKind::Temperature
                | DataKind::Quaternion
                | DataKind::RotationMatrix
                | DataKind::EulerAngles
                | DataKind::DeltaV
                | DataKind::Acceleration
                | DataKind::FreeAcceleration
                | DataKind::AccelerationHr
                | DataKind::AltitudeEllipsoid
                | DataKind::PositionEcef
                | DataKind::LatLon
                | DataKind::RateOfTurn
                | DataKind::DeltaQ
                | DataKind::RateOfTurnHr
                | DataKind::VelocityXyz
                | DataKind::MagneticField
        )
    }

    /// Kinds whose output coordinate system is configurable.
    pub const fn has_coordinate_system(self) -> bool {
        matches!(
            self,
            DataKind::Quaternion
                | DataKind::RotationMatrix
                | DataKind::EulerAngles
                | DataKind::VelocityXyz
        )
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown(0x{:04X})", self.bits()),
        }
    }
}

impl FromStr for DataKind {
    type Err = ParseNameError;

    /// Accepts a kind name (case-insensitive) or a raw hex value such as `0x2010`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
            && let Ok(raw) = u16::from_str_radix(hex, 16)
            && raw & !KIND_MASK == 0
        {
            return Ok(DataKind::from_bits(raw));
        }
        DataKind::KNOWN
            .into_iter()
            .find(|kind| kind.name().is_some_and(|name| name.eq_ignore_ascii_case(s)))
            .ok_or_else(|| ParseNameError {
                what: "data kind",
                value: s.to_string(),
            })
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CoordinateSystem {
    #[default]
    EastNorthUp = 0x0,
    NorthEastDown = 0x4,
    NorthWestUp = 0x8,
    /// Unassigned subfield value, kept so raw identifiers round-trip.
    Reserved = 0xC,
}

impl CoordinateSystem {
    pub const ALL: [CoordinateSystem; 3] = [
        CoordinateSystem::EastNorthUp,
        CoordinateSystem::NorthEastDown,
        CoordinateSystem::NorthWestUp,
    ];

    pub const fn from_bits(raw: u16) -> Self {
        match raw & COORDINATE_SYSTEM_MASK {
            0x0 => CoordinateSystem::EastNorthUp,
            0x4 => CoordinateSystem::NorthEastDown,
            0x8 => CoordinateSystem::NorthWestUp,
            _ => CoordinateSystem::Reserved,
        }
    }

    pub const fn bits(self) -> u16 {
        self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            CoordinateSystem::EastNorthUp => "EastNorthUp",
            CoordinateSystem::NorthEastDown => "NorthEastDown",
            CoordinateSystem::NorthWestUp => "NorthWestUp",
            CoordinateSystem::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CoordinateSystem {
    type Err = ParseNameError;

    /// Accepts the full name or the ENU/NED/NWU abbreviation, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let abbreviations = [
            ("ENU", CoordinateSystem::EastNorthUp),
            ("NED", CoordinateSystem::NorthEastDown),
            ("NWU", CoordinateSystem::NorthWestUp),
        ];
        abbreviations
            .into_iter()
            .find(|(abbr, _)| abbr.eq_ignore_ascii_case(s))
            .map(|(_, cs)| cs)
            .or_else(|| {
                CoordinateSystem::ALL
                    .into_iter()
                    .find(|cs| cs.name().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| ParseNameError {
                what: "coordinate system",
                value: s.to_string(),
            })
    }
}

/// Decoded form of a 16-bit data identifier.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataIdentifier {
    pub kind: DataKind,
    pub coordinate_system: CoordinateSystem,
    pub precision: Precision,
}

impl DataIdentifier {
    pub const fn new(
        kind: DataKind,
        coordinate_system: CoordinateSystem,
        precision: Precision,
    ) -> Self {
        Self {
            kind,
            coordinate_system,
            precision,
        }
    }

    /// Identifier with the default coordinate system and precision.
    pub const fn of(kind: DataKind) -> Self {
        Self::new(kind, CoordinateSystem::EastNorthUp, Precision::Float32)
    }

    pub const fn from_u16(raw: u16) -> Self {
        Self {
            kind: DataKind::from_bits(raw),
            coordinate_system: CoordinateSystem::from_bits(raw),
            precision: Precision::from_bits(raw),
        }
    }

    pub const fn to_u16(self) -> u16 {
        self.kind.bits() | self.coordinate_system.bits() | self.precision.bits()
    }

    /// Byte count of one sub-packet body for this identifier.
    pub const fn data_size(self) -> usize {
        data_size(self.kind, self.precision)
    }
}

impl From<u16> for DataIdentifier {
    fn from(raw: u16) -> Self {
        Self::from_u16(raw)
    }
}

impl From<DataIdentifier> for u16 {
    fn from(id: DataIdentifier) -> Self {
        id.to_u16()
    }
}

impl fmt::Display for DataIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind;
        if kind.has_coordinate_system() && kind.has_precision() {
            write!(f, "{}({},{})", kind, self.coordinate_system, self.precision)
        } else if kind.has_precision() {
            write!(f, "{}({})", kind, self.precision)
        } else {
            write!(f, "{kind}")
        }
    }
}

/// Payload width in bytes for one sub-packet of `kind` in `precision`.
///
/// For [`DataKind::GnssSatInfo`] this is the fixed header only; each satellite
/// adds [`crate::gnss::GNSS_SATELLITE_SIZE`] bytes. Unknown kinds return 0.
pub const fn data_size(kind: DataKind, precision: Precision) -> usize {
    let width = precision.size();
    match kind {
        DataKind::Temperature | DataKind::AltitudeEllipsoid => width,
        DataKind::LatLon => 2 * width,
        DataKind::EulerAngles
        | DataKind::DeltaV
        | DataKind::Acceleration
        | DataKind::FreeAcceleration
        | DataKind::AccelerationHr
        | DataKind::PositionEcef
        | DataKind::RateOfTurn
        | DataKind::RateOfTurnHr
        | DataKind::MagneticField
        | DataKind::VelocityXyz => 3 * width,
        DataKind::Quaternion | DataKind::DeltaQ => 4 * width,
        DataKind::RotationMatrix => 9 * width,
        DataKind::UtcTime => 12,
        DataKind::PacketCounter => 2,
        DataKind::SampleTimeFine
        | DataKind::SampleTimeCoarse
        | DataKind::BaroPressure
        | DataKind::StatusWord => 4,
        DataKind::StatusByte => 1,
        DataKind::GnssPvtData => 94,
        DataKind::GnssSatInfo => 8,
        DataKind::Unknown(_) => 0,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(500))]

        #[test]
        fn prop_u16_roundtrip(raw in any::<u16>()) {
            prop_assert_eq!(DataIdentifier::from_u16(raw).to_u16(), raw & (KIND_MASK | COORDINATE_SYSTEM_MASK | PRECISION_MASK));
        }

        #[test]
        fn prop_identifier_roundtrip(
            kind_idx in 0usize..25,
            cs_idx in 0usize..3,
            precision_idx in 0usize..4,
        ) {
            let id = DataIdentifier::new(
                DataKind::KNOWN[kind_idx],
                CoordinateSystem::ALL[cs_idx],
                Precision::ALL[precision_idx],
            );
            prop_assert_eq!(DataIdentifier::from_u16(id.to_u16()), id);
        }
    }
}
