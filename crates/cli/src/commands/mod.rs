//! Command implementations for mtctl

pub mod decode;
pub mod device;
pub mod output_config;
pub mod read;

use std::fs::OpenOptions;
use std::io;
use std::net::TcpStream;
use std::time::Duration;

use mtlink_client::{Client, ClientConfig, Transport};
use tracing::debug;

use crate::error::CliError;

/// Prefix selecting a TCP serial bridge instead of a device node.
pub const TCP_PREFIX: &str = "tcp://";

pub type DeviceClient = Client<Box<dyn Transport>>;

/// Opens `target` and wraps it in a client.
///
/// `target` is either a device node such as `/dev/ttyUSB0`, already set to
/// the right baud rate, or `tcp://host:port`.
pub fn connect(target: &str, timeout_ms: Option<u64>) -> Result<DeviceClient, CliError> {
    let transport: Box<dyn Transport> = match target.strip_prefix(TCP_PREFIX) {
        Some(address) => Box::new(TcpStream::connect(address).map_err(|e| not_found(target, e))?),
        None => Box::new(
            OpenOptions::new()
                .read(true)
                .write(true)
                .open(target)
                .map_err(|e| not_found(target, e))?,
        ),
    };
    let config = client_config(timeout_ms);
    debug!(target, timeout = ?config.timeout, "connected");
    Ok(Client::with_config(transport, config))
}

/// `--timeout-ms` wins over `MTLINK_TIMEOUT_MS`; `0` disables the timeout.
pub fn client_config(timeout_ms: Option<u64>) -> ClientConfig {
    match timeout_ms {
        Some(0) => ClientConfig::new(),
        Some(ms) => ClientConfig::new().with_timeout(Duration::from_millis(ms)),
        None => ClientConfig::from_env(),
    }
}

fn not_found(target: &str, err: io::Error) -> CliError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => {
            CliError::DeviceNotFound(target.to_string())
        }
        _ => CliError::IoError(err),
    }
}
