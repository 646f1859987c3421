//! Output configuration: which measurements the device emits and how often.

use std::fmt;

use crate::data_id::DataIdentifier;
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};

/// Upper bound the device accepts in one configuration.
pub const MAX_OUTPUT_SETTINGS: usize = 32;
pub const OUTPUT_SETTING_SIZE: usize = 4;

/// Output rate in Hz. `0` and `0xFFFF` both select the device maximum.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputFrequency(pub u16);

impl OutputFrequency {
    pub const MAX: OutputFrequency = OutputFrequency(0xFFFF);

    pub const fn hz(rate: u16) -> Self {
        Self(rate)
    }

    pub const fn is_max(self) -> bool {
        matches!(self.0, 0x0000 | 0xFFFF)
    }
}

impl fmt::Display for OutputFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            f.write_str("Max")
        } else {
            write!(f, "{} Hz", self.0)
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSetting {
    pub identifier: DataIdentifier,
    pub frequency: OutputFrequency,
}

impl OutputSetting {
    pub const fn new(identifier: DataIdentifier, frequency: OutputFrequency) -> Self {
        Self {
            identifier,
            frequency,
        }
    }
}

impl fmt::Display for OutputSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.frequency)
    }
}

/// Ordered list of output settings, at most [`MAX_OUTPUT_SETTINGS`] long.
///
/// Wire form is 4 bytes per entry: identifier then frequency, both big-endian.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OutputConfiguration {
    settings: Vec<OutputSetting>,
}

impl OutputConfiguration {
    pub fn new(settings: Vec<OutputSetting>) -> EncodeResult<Self> {
        if settings.len() > MAX_OUTPUT_SETTINGS {
            return Err(EncodeError::TooManyEntries {
                actual: settings.len(),
                max: MAX_OUTPUT_SETTINGS,
            });
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &[OutputSetting] {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputSetting> {
        self.settings.iter()
    }

    pub fn push(&mut self, setting: OutputSetting) -> EncodeResult<()> {
        if self.settings.len() >= MAX_OUTPUT_SETTINGS {
            return Err(EncodeError::TooManyEntries {
                actual: self.settings.len() + 1,
                max: MAX_OUTPUT_SETTINGS,
            });
        }
        self.settings.push(setting);
        Ok(())
    }

    /// First setting whose kind matches `kind`.
    pub fn find(&self, kind: crate::data_id::DataKind) -> Option<&OutputSetting> {
        self.settings.iter().find(|s| s.identifier.kind == kind)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.settings.len() * OUTPUT_SETTING_SIZE);
        for setting in &self.settings {
            out.extend_from_slice(&setting.identifier.to_u16().to_be_bytes());
            out.extend_from_slice(&setting.frequency.0.to_be_bytes());
        }
        out
    }

    /// Decodes a configuration payload. A trailing partial entry or more than
    /// [`MAX_OUTPUT_SETTINGS`] entries is an error.
    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        if payload.len() % OUTPUT_SETTING_SIZE != 0
            || payload.len() / OUTPUT_SETTING_SIZE > MAX_OUTPUT_SETTINGS
        {
            return Err(DecodeError::InvalidPayloadLength {
                what: "output configuration",
                actual: payload.len(),
            });
        }
        let settings = payload
            .chunks_exact(OUTPUT_SETTING_SIZE)
            .map(|entry| match entry {
                [id_hi, id_lo, f_hi, f_lo] => Some(OutputSetting {
                    identifier: DataIdentifier::from_u16(u16::from_be_bytes([*id_hi, *id_lo])),
                    frequency: OutputFrequency(u16::from_be_bytes([*f_hi, *f_lo])),
                }),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(DecodeError::InvalidPayloadLength {
                what: "output configuration",
                actual: payload.len(),
            })?;
        Ok(Self { settings })
    }
}

impl TryFrom<Vec<OutputSetting>> for OutputConfiguration {
    type Error = EncodeError;

    fn try_from(settings: Vec<OutputSetting>) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

impl<'a> IntoIterator for &'a OutputConfiguration {
    type Item = &'a OutputSetting;
    type IntoIter = std::slice::Iter<'a, OutputSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.iter()
    }
}

/// One line per setting, e.g. `EulerAngles(NorthEastDown,Float32): 100 Hz`.
impl fmt::Display for OutputConfiguration {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_id::{CoordinateSystem, DataKind};
    use crate::precision::Precision;

    fn sample() -> Result<OutputConfiguration, EncodeError> {
        OutputConfiguration::new(vec![
            OutputSetting::new(
                DataIdentifier::of(DataKind::PacketCounter),
                OutputFrequency::MAX,
            ),
            OutputSetting::new(
                DataIdentifier::new(
                    DataKind::EulerAngles,
                    CoordinateSystem::NorthEastDown,
                    Precision::Float32,
                ),
                OutputFrequency::hz(100),
            ),
            OutputSetting::new(
                DataIdentifier::new(
                    DataKind::Acceleration,
                    CoordinateSystem::EastNorthUp,
                    Precision::Fp1632,
                ),
                OutputFrequency(0),
            ),
        ])
    }

    #[test]
    fn test_encode_layout() -> Result<(), Box<dyn std::error::Error>> {
        let config = sample()?;
        assert_eq!(
            config.encode(),
            vec![
                0x10, 0x20, 0xFF, 0xFF, 0x20, 0x34, 0x00, 0x64, 0x40, 0x22, 0x00, 0x00
            ]
        );
        assert_eq!(OutputConfiguration::decode(&config.encode())?, config);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            sample()?.to_string(),
            "PacketCounter: Max\nEulerAngles(NorthEastDown,Float32): 100 Hz\nAcceleration(Fp1632): Max"
        );
        Ok(())
    }

    #[test]
    fn test_partial_entry_rejected() {
        let err = OutputConfiguration::decode(&[0x10, 0x20, 0xFF]);
        assert_eq!(
            err,
            Err(DecodeError::InvalidPayloadLength {
                what: "output configuration",
                actual: 3,
            })
        );
    }

    #[test]
    fn test_too_many_entries() -> Result<(), Box<dyn std::error::Error>> {
        let setting = OutputSetting::new(
            DataIdentifier::of(DataKind::StatusWord),
            OutputFrequency::MAX,
        );
        let mut config = OutputConfiguration::new(vec![setting; MAX_OUTPUT_SETTINGS])?;
        assert_eq!(
            config.push(setting),
            Err(EncodeError::TooManyEntries {
                actual: 33,
                max: 32,
            })
        );
        assert!(OutputConfiguration::new(vec![setting; 33]).is_err());
        assert!(OutputConfiguration::decode(&[0u8; 33 * 4]).is_err());
        Ok(())
    }

    #[test]
    fn test_find_by_kind() -> Result<(), Box<dyn std::error::Error>> {
        let config = sample()?;
        let found = config.find(DataKind::EulerAngles).ok_or("missing")?;
        assert_eq!(found.frequency, OutputFrequency(100));
        assert!(config.find(DataKind::LatLon).is_none());
        Ok(())
    }

    #[test]
    fn test_frequency_display() {
        assert_eq!(OutputFrequency(0).to_string(), "Max");
        assert_eq!(OutputFrequency::MAX.to_string(), "Max");
        assert_eq!(OutputFrequency(400).to_string(), "400 Hz");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(500))]

        #[test]
        fn prop_wire_roundtrip(entries in prop::collection::vec((any::<u16>(), any::<u16>()), 0..=32)) {
            let mut payload = Vec::new();
            for (id, freq) in &entries {
                payload.extend_from_slice(&(id & 0xF8FF).to_be_bytes());
                payload.extend_from_slice(&freq.to_be_bytes());
            }
            let config = OutputConfiguration::decode(&payload)?;
            prop_assert_eq!(config.len(), entries.len());
            prop_assert_eq!(config.encode(), payload);
        }
    }
}
