//! Emulated Xsens MT device for host-side tests.
//!
//! [`Emulator`] answers configuration requests and streams frames handed to
//! [`Emulator::transmit`]. Pair it with [`duplex`] to run a real
//! `mtlink_client::Client` against it without hardware.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

pub mod duplex;
pub mod emulator;
pub mod error;

pub use duplex::{DuplexEnd, DuplexReader, DuplexWriter, duplex};
pub use emulator::{DeviceIdentity, Emulator, Mode};
pub use error::{EmulatorError, EmulatorResult};
