//! Error types for mtctl

use mtlink_client::ClientError;
use mtlink_protocol::{EncodeError, ParseNameError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(#[source] ClientError),

    #[error("Device error: {0}")]
    DeviceError(#[source] ClientError),

    #[error("Protocol error: {0}")]
    ProtocolError(#[source] ClientError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport { .. }
            | ClientError::EndOfStream { .. }
            | ClientError::DeadlineExceeded { .. } => CliError::DeviceUnavailable(err),
            ClientError::Device { .. } => CliError::DeviceError(err),
            ClientError::Frame(_) | ClientError::Decode(_) | ClientError::Encode(_) => {
                CliError::ProtocolError(err)
            }
        }
    }
}

impl From<ParseNameError> for CliError {
    fn from(err: ParseNameError) -> Self {
        CliError::InvalidConfiguration(err.to_string())
    }
}

impl From<EncodeError> for CliError {
    fn from(err: EncodeError) -> Self {
        CliError::InvalidConfiguration(err.to_string())
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DeviceNotFound(_) => 2,
            CliError::InvalidConfiguration(_) | CliError::JsonError(_) => 4,
            CliError::DeviceUnavailable(_) => 5,
            CliError::DeviceError(_) => 6,
            CliError::ProtocolError(_) => 7,
            CliError::IoError(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtlink_protocol::ErrorCode;

    #[test]
    fn client_errors_map_to_exit_codes() {
        let timeout: CliError = ClientError::DeadlineExceeded { op: "go to config" }.into();
        assert_eq!(timeout.exit_code(), 5);

        let rejected: CliError = ClientError::Device {
            op: "set output configuration",
            code: ErrorCode::InvalidMessage,
        }
        .into();
        assert_eq!(rejected.exit_code(), 6);
        assert_eq!(
            rejected.to_string(),
            "Device error: set output configuration: device reported error InvalidMessage"
        );
    }
}
