//! Emulator error types.

use std::io;

use mtlink_protocol::{DataKind, DecodeError, EncodeError, FrameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("Not in measurement mode")]
    NotInMeasurementMode,

    #[error("{0} is not in the output configuration")]
    NotInOutputConfiguration(DataKind),

    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Invalid payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cannot encode reply: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),
}

pub type EmulatorResult<T> = Result<T, EmulatorError>;
