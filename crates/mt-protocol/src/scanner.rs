//! Splitting a byte stream into frames.
//!
//! [`split_frame`] is a pure function over a growing buffer; [`FrameScanner`]
//! drives it from any [`Read`] source.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::frame::{
    BUS_ADDRESS, CHECKSUM_LEN, EXTENDED_HEADER_LEN, EXTENDED_LENGTH, MAX_EXTENDED_PAYLOAD_LEN,
    PREAMBLE, STANDARD_HEADER_LEN,
};

const READ_CHUNK_LEN: usize = 1024;

/// Outcome of one [`split_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Bytes at the front of the buffer that can be dropped.
    pub advance: usize,
    /// The exact bytes of the next frame, if one is complete.
    pub token: Option<&'a [u8]>,
}

impl<'a> Split<'a> {
    const fn need_more(advance: usize) -> Self {
        Self {
            advance,
            token: None,
        }
    }
}

/// Locates the next frame candidate in `data`.
///
/// Garbage in front of the `[0xFA, 0xFF]` marker is dropped. A trailing lone
/// preamble byte is kept since the bus address may follow in the next read.
/// An incomplete frame is never dropped; the caller should append more input
/// and call again. Tokens are not validated.
pub fn split_frame(data: &[u8], at_eof: bool) -> Split<'_> {
    if data.is_empty() {
        return Split::need_more(0);
    }

    let Some(start) = data
        .windows(2)
        .position(|w| w == [PREAMBLE, BUS_ADDRESS])
    else {
        if data.last() == Some(&PREAMBLE) && !at_eof {
            return Split::need_more(data.len() - 1);
        }
        return Split::need_more(data.len());
    };

    let Some(candidate) = data.get(start..) else {
        return Split::need_more(start);
    };
    let Some(&len) = candidate.get(STANDARD_HEADER_LEN - 1) else {
        return Split::need_more(start);
    };

    let (header_len, payload_len) = if len == EXTENDED_LENGTH {
        let Some(&[hi, lo]) = candidate.get(STANDARD_HEADER_LEN..EXTENDED_HEADER_LEN) else {
            return Split::need_more(start);
        };
        let extended = usize::from(u16::from_be_bytes([hi, lo]));
        if extended > MAX_EXTENDED_PAYLOAD_LEN {
            // Cannot be a real frame; step past this marker and rescan.
            debug!(offset = start, extended, "skipping marker with oversized extended length");
            return Split::need_more(start + 1);
        }
        (EXTENDED_HEADER_LEN, extended)
    } else {
        (STANDARD_HEADER_LEN, usize::from(len))
    };

    let frame_len = header_len + payload_len + CHECKSUM_LEN;
    match candidate.get(..frame_len) {
        Some(token) => Split {
            advance: start + frame_len,
            token: Some(token),
        },
        None => Split::need_more(start),
    }
}

/// Lazily yields raw frame bytes from a reader.
///
/// Read errors are returned to the caller with the buffered bytes kept, so a
/// timed out read can simply be retried.
pub struct FrameScanner<R> {
    reader: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> FrameScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(READ_CHUNK_LEN),
            eof: false,
        }
    }

    /// Returns the next frame candidate, or `None` once the reader is exhausted.
    pub fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            let split = split_frame(&self.buffer, self.eof);
            let token = split.token.map(<[u8]>::to_vec);
            let advance = split.advance;
            if advance > 0 {
                if token.is_none() {
                    trace!(discarded = advance, "discarding bytes outside any frame");
                }
                self.buffer.drain(..advance);
            }
            if token.is_some() {
                return Ok(token);
            }
            if self.eof {
                if advance == 0 {
                    if !self.buffer.is_empty() {
                        trace!(
                            remaining = self.buffer.len(),
                            "end of stream inside a partial frame"
                        );
                    }
                    return Ok(None);
                }
                continue;
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; READ_CHUNK_LEN];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buffer.extend_from_slice(chunk.get(..n).unwrap_or_default());
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// True once the underlying reader reported end of stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Bytes read but not yet returned as a frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for FrameScanner<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
