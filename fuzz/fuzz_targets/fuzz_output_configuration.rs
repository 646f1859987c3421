//! Fuzzes output configuration payload decoding.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_output_configuration

#![no_main]

use libfuzzer_sys::fuzz_target;
use mtlink_protocol::{CanConfiguration, CanOutputConfiguration, OutputConfiguration};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = OutputConfiguration::decode(data) {
        let _ = config.encode();
    }
    let _ = CanOutputConfiguration::decode(data);
    let _ = CanConfiguration::decode(data);
});
