//! Device error codes carried by `Error` frames.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    /// No bus communication possible.
    NoBus,
    /// InitBus and/or SetBID were not issued.
    BusNotReady,
    InvalidPeriod,
    /// Message is invalid or not implemented.
    InvalidMessage,
    InitBusFail1,
    InitBusFail2,
    InitBusFail3,
    SetBidFail1,
    SetBidFail2,
    MeasurementFail1,
    MeasurementFail2,
    MeasurementFail3,
    MeasurementFail4,
    MeasurementFail5,
    MeasurementFail6,
    TimerOverflow,
    BaudrateInvalid,
    InvalidParam,
    /// Transmit buffer full.
    MeasurementFail7,
    /// Transmit buffer overflow, message did not fit.
    MeasurementFail8,
    /// Internal device failure; a firmware update may help.
    DeviceError,
    /// The device produces more data than the link can carry.
    DataOverflow,
    /// Sample buffer filled up during a communication outage.
    BufferOverflow,
    Unknown(u8),
}

impl ErrorCode {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => ErrorCode::Ok,
            1 => ErrorCode::NoBus,
            2 => ErrorCode::BusNotReady,
            3 => ErrorCode::InvalidPeriod,
            4 => ErrorCode::InvalidMessage,
            16 => ErrorCode::InitBusFail1,
            17 => ErrorCode::InitBusFail2,
            18 => ErrorCode::InitBusFail3,
            20 => ErrorCode::SetBidFail1,
            21 => ErrorCode::SetBidFail2,
            24 => ErrorCode::MeasurementFail1,
            25 => ErrorCode::MeasurementFail2,
            26 => ErrorCode::MeasurementFail3,
            27 => ErrorCode::MeasurementFail4,
            28 => ErrorCode::MeasurementFail5,
            29 => ErrorCode::MeasurementFail6,
            30 => ErrorCode::TimerOverflow,
            32 => ErrorCode::BaudrateInvalid,
            33 => ErrorCode::InvalidParam,
            35 => ErrorCode::MeasurementFail7,
            36 => ErrorCode::MeasurementFail8,
            40 => ErrorCode::DeviceError,
            41 => ErrorCode::DataOverflow,
            42 => ErrorCode::BufferOverflow,
            other => ErrorCode::Unknown(other),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::NoBus => 1,
            ErrorCode::BusNotReady => 2,
            ErrorCode::InvalidPeriod => 3,
            ErrorCode::InvalidMessage => 4,
            ErrorCode::InitBusFail1 => 16,
            ErrorCode::InitBusFail2 => 17,
            ErrorCode::InitBusFail3 => 18,
            ErrorCode::SetBidFail1 => 20,
            ErrorCode::SetBidFail2 => 21,
            ErrorCode::MeasurementFail1 => 24,
            ErrorCode::MeasurementFail2 => 25,
            ErrorCode::MeasurementFail3 => 26,
            ErrorCode::MeasurementFail4 => 27,
            ErrorCode::MeasurementFail5 => 28,
            ErrorCode::MeasurementFail6 => 29,
            ErrorCode::TimerOverflow => 30,
            ErrorCode::BaudrateInvalid => 32,
            ErrorCode::InvalidParam => 33,
            ErrorCode::MeasurementFail7 => 35,
            ErrorCode::MeasurementFail8 => 36,
            ErrorCode::DeviceError => 40,
            ErrorCode::DataOverflow => 41,
            ErrorCode::BufferOverflow => 42,
            ErrorCode::Unknown(value) => value,
        }
    }
}

impl From<u8> for ErrorCode {
    fn from(value: u8) -> Self {
        ErrorCode::from_u8(value)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unknown(value) => write!(f, "ErrorCode(0x{value:02X})"),
            known => fmt::Debug::fmt(known, f),
        }
    }
}
