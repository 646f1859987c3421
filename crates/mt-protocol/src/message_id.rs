//! Message identifiers (MID) and their acknowledgement pairing.

use std::fmt;

/// An 8-bit message identifier.
///
/// Modeled as a newtype rather than an enum: request and set variants of a
/// configuration item share one wire value, and devices may send identifiers
/// this crate has no name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u8);

impl MessageId {
    // State
    pub const WAKE_UP: MessageId = MessageId(0x3E);
    pub const WAKE_UP_ACK: MessageId = MessageId(0x3F);
    pub const GOTO_CONFIG: MessageId = MessageId(0x30);
    pub const GOTO_CONFIG_ACK: MessageId = MessageId(0x31);
    pub const GOTO_MEASUREMENT: MessageId = MessageId(0x10);
    pub const GOTO_MEASUREMENT_ACK: MessageId = MessageId(0x11);
    pub const RESET: MessageId = MessageId(0x40);
    pub const RESET_ACK: MessageId = MessageId(0x41);

    // Informational
    pub const REQ_DID: MessageId = MessageId(0x00);
    pub const DEVICE_ID: MessageId = MessageId(0x01);
    pub const REQ_FW_REV: MessageId = MessageId(0x12);
    pub const FIRMWARE_REV: MessageId = MessageId(0x13);
    pub const REQ_PRODUCT_CODE: MessageId = MessageId(0x1C);
    pub const PRODUCT_CODE: MessageId = MessageId(0x1D);
    pub const REQ_HARDWARE_VERSION: MessageId = MessageId(0x1E);
    pub const HARDWARE_VERSION: MessageId = MessageId(0x1F);
    pub const ERROR: MessageId = MessageId(0x42);
    pub const WARNING: MessageId = MessageId(0x43);

    // Configuration
    pub const REQ_BAUDRATE: MessageId = MessageId(0x18);
    pub const SET_BAUDRATE: MessageId = MessageId(0x18);
    pub const BAUDRATE_ACK: MessageId = MessageId(0x19);
    pub const REQ_OPTION_FLAGS: MessageId = MessageId(0x48);
    pub const SET_OPTION_FLAGS: MessageId = MessageId(0x48);
    pub const OPTION_FLAGS_ACK: MessageId = MessageId(0x49);
    pub const REQ_OUTPUT_CONFIGURATION: MessageId = MessageId(0xC0);
    pub const SET_OUTPUT_CONFIGURATION: MessageId = MessageId(0xC0);
    pub const OUTPUT_CONFIGURATION_ACK: MessageId = MessageId(0xC1);
    pub const REQ_CAN_CONFIG: MessageId = MessageId(0xE6);
    pub const SET_CAN_CONFIG: MessageId = MessageId(0xE6);
    pub const CAN_CONFIG_ACK: MessageId = MessageId(0xE7);
    pub const REQ_CAN_OUTPUT_CONFIG: MessageId = MessageId(0xE8);
    pub const SET_CAN_OUTPUT_CONFIG: MessageId = MessageId(0xE8);
    pub const CAN_OUTPUT_CONFIG_ACK: MessageId = MessageId(0xE9);

    // Data
    pub const MT_DATA2: MessageId = MessageId(0x36);

    /// Request to acknowledgement pairs. Lookups go through this table only.
    const ACK_TABLE: [(MessageId, MessageId); 13] = [
        (Self::WAKE_UP, Self::WAKE_UP_ACK),
        (Self::GOTO_CONFIG, Self::GOTO_CONFIG_ACK),
        (Self::GOTO_MEASUREMENT, Self::GOTO_MEASUREMENT_ACK),
        (Self::RESET, Self::RESET_ACK),
        (Self::REQ_DID, Self::DEVICE_ID),
        (Self::REQ_FW_REV, Self::FIRMWARE_REV),
        (Self::REQ_PRODUCT_CODE, Self::PRODUCT_CODE),
        (Self::REQ_HARDWARE_VERSION, Self::HARDWARE_VERSION),
        (Self::REQ_BAUDRATE, Self::BAUDRATE_ACK),
        (Self::REQ_OPTION_FLAGS, Self::OPTION_FLAGS_ACK),
        (Self::REQ_OUTPUT_CONFIGURATION, Self::OUTPUT_CONFIGURATION_ACK),
        (Self::REQ_CAN_CONFIG, Self::CAN_CONFIG_ACK),
        (Self::REQ_CAN_OUTPUT_CONFIG, Self::CAN_OUTPUT_CONFIG_ACK),
    ];

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Reply identifier for a request, if the request has one.
    pub fn ack(self) -> Option<MessageId> {
        Self::ACK_TABLE
            .iter()
            .find(|(request, _)| *request == self)
            .map(|(_, ack)| *ack)
    }

    pub fn is_ack(self) -> bool {
        Self::ACK_TABLE.iter().any(|(_, ack)| *ack == self)
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::WAKE_UP => "WakeUp",
            Self::WAKE_UP_ACK => "WakeUpAck",
            Self::GOTO_CONFIG => "GotoConfig",
            Self::GOTO_CONFIG_ACK => "GotoConfigAck",
            Self::GOTO_MEASUREMENT => "GotoMeasurement",
            Self::GOTO_MEASUREMENT_ACK => "GotoMeasurementAck",
            Self::RESET => "Reset",
            Self::RESET_ACK => "ResetAck",
            Self::REQ_DID => "ReqDID",
            Self::DEVICE_ID => "DeviceID",
            Self::REQ_FW_REV => "ReqFWRev",
            Self::FIRMWARE_REV => "FirmwareRev",
            Self::REQ_PRODUCT_CODE => "ReqProductCode",
            Self::PRODUCT_CODE => "ProductCode",
            Self::REQ_HARDWARE_VERSION => "ReqHardwareVersion",
            Self::HARDWARE_VERSION => "HardwareVersion",
            Self::ERROR => "Error",
            Self::WARNING => "Warning",
            Self::REQ_BAUDRATE => "Baudrate",
            Self::BAUDRATE_ACK => "BaudrateAck",
            Self::REQ_OPTION_FLAGS => "OptionFlags",
            Self::OPTION_FLAGS_ACK => "OptionFlagsAck",
            Self::REQ_OUTPUT_CONFIGURATION => "OutputConfiguration",
            Self::OUTPUT_CONFIGURATION_ACK => "OutputConfigurationAck",
            Self::REQ_CAN_CONFIG => "CanConfig",
            Self::CAN_CONFIG_ACK => "CanConfigAck",
            Self::REQ_CAN_OUTPUT_CONFIG => "CanOutputConfig",
            Self::CAN_OUTPUT_CONFIG_ACK => "CanOutputConfigAck",
            Self::MT_DATA2 => "MTData2",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u8> for MessageId {
    fn from(value: u8) -> Self {
        MessageId(value)
    }
}

impl From<MessageId> for u8 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "MessageId(0x{:02X})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_pairs() {
        assert_eq!(MessageId::GOTO_CONFIG.ack(), Some(MessageId::GOTO_CONFIG_ACK));
        assert_eq!(
            MessageId::SET_OUTPUT_CONFIGURATION.ack(),
            Some(MessageId::OUTPUT_CONFIGURATION_ACK)
        );
        assert_eq!(MessageId::REQ_DID.ack(), Some(MessageId::DEVICE_ID));
        assert_eq!(
            MessageId::SET_CAN_CONFIG.ack(),
            Some(MessageId::CAN_CONFIG_ACK)
        );
    }

    #[test]
    fn test_no_arithmetic_fallback() {
        assert_eq!(MessageId(0xFE).ack(), None);
        assert_eq!(MessageId::MT_DATA2.ack(), None);
        assert_eq!(MessageId::ERROR.ack(), None);
    }

    #[test]
    fn test_is_ack() {
        assert!(!MessageId::GOTO_CONFIG.is_ack());
        assert!(MessageId::GOTO_CONFIG_ACK.is_ack());
        assert!(MessageId::OUTPUT_CONFIGURATION_ACK.is_ack());
        assert!(!MessageId::ERROR.is_ack());
        assert!(!MessageId(0xFF).is_ack());
    }

    #[test]
    fn test_display() {
        assert_eq!(MessageId::MT_DATA2.to_string(), "MTData2");
        assert_eq!(MessageId(0xAB).to_string(), "MessageId(0xAB)");
    }
}
