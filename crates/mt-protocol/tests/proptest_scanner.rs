//! Property tests for stream splitting.

use std::io::{self, Read};

use mtlink_protocol::{Frame, FrameScanner, MessageId, validate};
use proptest::prelude::*;

/// Serves the input in fixed-size pieces to exercise partial reads.
struct Chunked {
    data: Vec<u8>,
    position: usize,
    chunk: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.get(self.position..).unwrap_or_default();
        let n = remaining.len().min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

/// Garbage never contains the bus address byte, so it cannot form a marker,
/// though it may well contain stray preambles.
fn garbage() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![Just(0xFAu8), any::<u8>().prop_map(|b| if b == 0xFF { 0xFE } else { b })],
        0..64,
    )
}

fn frame() -> impl Strategy<Value = Frame> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..400)).prop_filter_map(
        "frame must build",
        |(mid, payload)| Frame::new(MessageId(mid), &payload).ok(),
    )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    #[test]
    fn prop_scanner_resynchronizes_between_garbage(
        lead in garbage(),
        first in frame(),
        middle in garbage(),
        second in frame(),
        tail in garbage(),
        chunk in 1usize..16,
    ) {
        let mut stream = lead;
        stream.extend_from_slice(first.as_bytes());
        stream.extend_from_slice(&middle);
        stream.extend_from_slice(second.as_bytes());
        stream.extend_from_slice(&tail);

        let scanner = FrameScanner::new(Chunked { data: stream, position: 0, chunk });
        let frames = scanner.collect::<Result<Vec<_>, _>>()?;
        prop_assert_eq!(frames.len(), 2);
        prop_assert_eq!(frames[0].as_slice(), first.as_bytes());
        prop_assert_eq!(frames[1].as_slice(), second.as_bytes());
        for raw in &frames {
            prop_assert!(validate(raw).is_ok());
        }
    }
}
