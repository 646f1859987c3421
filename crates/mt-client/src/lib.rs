//! Blocking host-side client for Xsens MT devices.
//!
//! [`Client`] drives one device over any [`Transport`]: serial device nodes,
//! TCP bridges, or the in-memory pipes used by the emulator tests.
//!
//! ```no_run
//! use std::fs::OpenOptions;
//! use mtlink_client::{Client, ClientConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = OpenOptions::new().read(true).write(true).open("/dev/ttyUSB0")?;
//! let mut client = Client::with_config(port, ClientConfig::from_env());
//! client.go_to_config()?;
//! let config = client.get_output_configuration()?;
//! println!("{config}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{Client, SessionState, measurements};
pub use config::{ClientConfig, TIMEOUT_ENV};
pub use error::{ClientError, ClientResult};
pub use transport::Transport;
