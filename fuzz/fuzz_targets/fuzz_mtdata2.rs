//! Fuzzes MTData2 payload walking and measurement decoding.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_mtdata2

#![no_main]

use libfuzzer_sys::fuzz_target;
use mtlink_protocol::Measurements;

fuzz_target!(|data: &[u8]| {
    // Walking arbitrary payloads must terminate without panicking.
    for sample in Measurements::new(data) {
        if sample.is_err() {
            break;
        }
    }
});
