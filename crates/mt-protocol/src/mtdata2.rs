//! MTData2 payload walking.
//!
//! An MTData2 payload is a concatenation of `[id_hi][id_lo][len][data]`
//! sub-packets. [`SubPackets`] splits the payload without interpreting the
//! data; [`Measurements`] additionally decodes every modeled kind.

use tracing::trace;

use crate::data_id::DataIdentifier;
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::measurement::Measurement;

/// Identifier (2 bytes) plus length (1 byte).
pub const SUB_PACKET_HEADER_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPacket<'a> {
    pub identifier: DataIdentifier,
    pub data: &'a [u8],
}

impl SubPacket<'_> {
    /// Header plus data.
    pub fn encoded_len(&self) -> usize {
        SUB_PACKET_HEADER_LEN + self.data.len()
    }

    pub fn decode(&self) -> DecodeResult<Option<Measurement>> {
        Measurement::decode(self.identifier, self.data)
    }
}

/// Iterator over the raw sub-packets of a payload.
///
/// A truncated header or body yields [`DecodeError::TruncatedSubPacket`] once,
/// after which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct SubPackets<'a> {
    payload: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> SubPackets<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_complete(&self) -> bool {
        !self.failed && self.offset >= self.payload.len()
    }
}

impl<'a> Iterator for SubPackets<'a> {
    type Item = DecodeResult<SubPacket<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let payload = self.payload;
        let rest = payload.get(self.offset..)?;
        if rest.is_empty() {
            return None;
        }

        let truncated = |needed: usize| DecodeError::TruncatedSubPacket {
            offset: self.offset,
            needed,
            available: rest.len(),
        };

        let [id_hi, id_lo, len, body @ ..] = rest else {
            self.failed = true;
            return Some(Err(truncated(SUB_PACKET_HEADER_LEN)));
        };
        let len = usize::from(*len);
        let Some(data) = body.get(..len) else {
            self.failed = true;
            return Some(Err(truncated(SUB_PACKET_HEADER_LEN + len)));
        };

        let identifier = DataIdentifier::from_u16(u16::from_be_bytes([*id_hi, *id_lo]));
        self.offset += SUB_PACKET_HEADER_LEN + len;
        Some(Ok(SubPacket { identifier, data }))
    }
}

impl std::iter::FusedIterator for SubPackets<'_> {}

/// One decoded sub-packet.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub identifier: DataIdentifier,
    pub measurement: Measurement,
}

/// Iterator over the decoded samples of one MTData2 payload.
///
/// Unknown kinds are skipped. The first malformed sub-packet is reported once
/// and ends the walk; [`Measurements::offset`] then points at it.
#[derive(Debug, Clone)]
pub struct Measurements<'a> {
    packets: SubPackets<'a>,
    done: bool,
}

impl<'a> Measurements<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            packets: SubPackets::new(payload),
            done: false,
        }
    }

    pub fn offset(&self) -> usize {
        self.packets.offset()
    }
}

impl Iterator for Measurements<'_> {
    type Item = DecodeResult<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let packet = match self.packets.next()? {
                Ok(packet) => packet,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            match packet.decode() {
                Ok(Some(measurement)) => {
                    return Some(Ok(Sample {
                        identifier: packet.identifier,
                        measurement,
                    }));
                }
                Ok(None) => {
                    trace!(
                        identifier = %packet.identifier,
                        raw = packet.identifier.to_u16(),
                        len = packet.data.len(),
                        "skipping unknown sub-packet"
                    );
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Measurements<'_> {}

/// Concatenates encoded sub-packets into an MTData2 payload.
pub fn encode_payload<'a, I>(samples: I) -> EncodeResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a Measurement, DataIdentifier)>,
{
    let mut payload = Vec::new();
    for (measurement, identifier) in samples {
        payload.extend(measurement.encode_packet(identifier)?);
    }
    Ok(payload)
}
