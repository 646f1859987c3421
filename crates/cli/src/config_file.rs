//! JSON output configuration files.
//!
//! ```json
//! [
//!   { "kind": "PacketCounter", "frequency": "max" },
//!   { "kind": "Quaternion", "coordinate_system": "NED", "precision": "Float64", "frequency": 100 }
//! ]
//! ```
//!
//! `coordinate_system` defaults to EastNorthUp, `precision` to Float32 and
//! `frequency` to the device maximum.

use mtlink_protocol::{
    CoordinateSystem, DataIdentifier, DataKind, OutputConfiguration, OutputFrequency,
    OutputSetting, Precision,
};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingEntry {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frequency {
    Hz(u16),
    Named(String),
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Named("max".to_string())
    }
}

impl Frequency {
    fn to_output_frequency(&self) -> Result<OutputFrequency, CliError> {
        match self {
            Frequency::Hz(rate) => Ok(OutputFrequency(*rate)),
            Frequency::Named(name) if name.eq_ignore_ascii_case("max") => Ok(OutputFrequency::MAX),
            Frequency::Named(other) => Err(CliError::InvalidConfiguration(format!(
                "frequency must be a number or \"max\", got {other:?}"
            ))),
        }
    }
}

impl SettingEntry {
    pub fn to_setting(&self) -> Result<OutputSetting, CliError> {
        let kind: DataKind = self.kind.parse()?;
        let coordinate_system = match &self.coordinate_system {
            Some(name) => name.parse::<CoordinateSystem>()?,
            None => CoordinateSystem::default(),
        };
        let precision = match &self.precision {
            Some(name) => name.parse::<Precision>()?,
            None => Precision::Float32,
        };
        Ok(OutputSetting::new(
            DataIdentifier::new(kind, coordinate_system, precision),
            self.frequency.to_output_frequency()?,
        ))
    }

    pub fn from_setting(setting: &OutputSetting) -> Self {
        let identifier = setting.identifier;
        let kind = identifier.kind;
        let name = kind
            .name()
            .map_or_else(|| format!("0x{:04X}", kind.bits()), str::to_string);
        let frequency = if setting.frequency.is_max() {
            Frequency::default()
        } else {
            Frequency::Hz(setting.frequency.0)
        };
        Self {
            kind: name,
            coordinate_system: kind
                .has_coordinate_system()
                .then(|| identifier.coordinate_system.to_string()),
            precision: kind
                .has_precision()
                .then(|| identifier.precision.to_string()),
            frequency,
        }
    }
}

pub fn parse(text: &str) -> Result<OutputConfiguration, CliError> {
    let entries: Vec<SettingEntry> = serde_json::from_str(text)?;
    let settings = entries
        .iter()
        .map(SettingEntry::to_setting)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OutputConfiguration::new(settings)?)
}

pub fn to_entries(config: &OutputConfiguration) -> Vec<SettingEntry> {
    config.iter().map(SettingEntry::from_setting).collect()
}
