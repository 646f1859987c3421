//! Fuzzes frame splitting and validation over arbitrary byte streams.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_split_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use mtlink_protocol::{Frame, split_frame, validate};

fuzz_target!(|data: &[u8]| {
    let mut rest = data;
    loop {
        let split = split_frame(rest, true);
        if let Some(token) = split.token
            && validate(token).is_ok()
        {
            // A validated token must parse and re-encode to the same bytes.
            if let Ok(frame) = Frame::parse(token) {
                assert_eq!(frame.as_bytes(), token);
            }
        }
        if split.advance == 0 {
            break;
        }
        rest = rest.get(split.advance..).unwrap_or_default();
    }
});
