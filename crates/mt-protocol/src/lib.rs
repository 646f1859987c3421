//! Xsens MT binary protocol codecs.
//!
//! This crate is I/O-free apart from [`FrameScanner`], which wraps any
//! [`std::io::Read`]. Everything else is pure functions and value types that
//! can be tested and fuzzed without a device attached.
//!
//! # Key Features
//! - Frame construction, validation and stream splitting with resync
//! - 16-bit data identifiers and the four numeric wire precisions
//! - MTData2 sub-packet walking into typed [`Measurement`] values
//! - Output, CAN output and CAN interface configuration payloads
//! - Device identity replies

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

mod codec;

pub mod can;
pub mod data_id;
pub mod device_info;
pub mod error;
pub mod error_code;
pub mod frame;
pub mod gnss;
pub mod measurement;
pub mod message_id;
pub mod mtdata2;
pub mod output_config;
pub mod precision;
pub mod scanner;
pub mod time;

pub use can::{CanBaudRate, CanConfiguration, CanDataId, CanOutputConfiguration, CanOutputSetting};
pub use data_id::{CoordinateSystem, DataIdentifier, DataKind, UnknownKind, data_size};
pub use device_info::{DeviceId, HardwareVersion, ProductCode};
pub use error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, FrameError, FrameResult, ParseNameError,
};
pub use error_code::ErrorCode;
pub use frame::{Frame, checksum, validate};
pub use gnss::{FixType, GnssPvtData, GnssSatInfo, GnssSatellite};
pub use measurement::{LatLon, Measurement, Quaternion, RotationMatrix, StatusWord, Vector3};
pub use message_id::MessageId;
pub use mtdata2::{Measurements, Sample, SubPacket, SubPackets, encode_payload};
pub use output_config::{
    MAX_OUTPUT_SETTINGS, OutputConfiguration, OutputFrequency, OutputSetting,
};
pub use precision::{Fp1220, Fp1632, Precision};
pub use scanner::{FrameScanner, Split, split_frame};
pub use time::{UtcTime, UtcValidity};
