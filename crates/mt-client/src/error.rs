//! Client error types.

use std::io;

use mtlink_protocol::{DecodeError, EncodeError, ErrorCode, FrameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{op}: transport error: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Invalid payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cannot encode request: {0}")]
    Encode(#[from] EncodeError),

    #[error("{op}: device reported error {code}")]
    Device { op: &'static str, code: ErrorCode },

    #[error("{op}: end of stream while awaiting reply")]
    EndOfStream { op: &'static str },

    #[error("{op}: deadline exceeded")]
    DeadlineExceeded { op: &'static str },
}

impl ClientError {
    /// Classifies an I/O failure, folding timeouts into [`ClientError::DeadlineExceeded`].
    pub(crate) fn from_io(op: &'static str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                ClientError::DeadlineExceeded { op }
            }
            io::ErrorKind::UnexpectedEof => ClientError::EndOfStream { op },
            _ => ClientError::Transport { op, source },
        }
    }

    /// Device error code, if the device rejected the request.
    pub fn device_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Device { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
