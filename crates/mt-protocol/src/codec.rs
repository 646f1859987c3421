//! Big-endian cursor over fixed-layout payloads.

use crate::error::{DecodeError, DecodeResult};
use crate::precision::Precision;

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> DecodeResult<&'a [u8]> {
        let end = self.position.saturating_add(count);
        let bytes = self
            .data
            .get(self.position..end)
            .ok_or(DecodeError::UnexpectedEnd {
                offset: self.position,
            })?;
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let offset = self.position;
        self.read_bytes(N)?
            .try_into()
            .map_err(|_| DecodeError::UnexpectedEnd { offset })
    }

    pub(crate) fn read_u8(&mut self) -> DecodeResult<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub(crate) fn read_u16(&mut self) -> DecodeResult<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub(crate) fn read_u32(&mut self) -> DecodeResult<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub(crate) fn read_i32(&mut self) -> DecodeResult<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    pub(crate) fn read_float(&mut self, precision: Precision) -> DecodeResult<f64> {
        let bytes = self.read_bytes(precision.size())?;
        precision.decode(bytes)
    }

    pub(crate) fn read_floats<const N: usize>(
        &mut self,
        precision: Precision,
    ) -> DecodeResult<[f64; N]> {
        let mut values = [0.0; N];
        for value in &mut values {
            *value = self.read_float(precision)?;
        }
        Ok(values)
    }
}

pub(crate) fn write_floats(precision: Precision, values: &[f64], out: &mut Vec<u8>) {
    for value in values {
        precision.encode(*value, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() -> Result<(), DecodeError> {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u16()?, 0x1234);
        assert_eq!(reader.read_u32()?, 0x5678_9ABC);
        assert_eq!(reader.read_u8()?, 0xDE);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_unexpected_end_reports_offset() {
        let mut reader = ByteReader::new(&[0x01, 0x02, 0x03]);
        assert!(reader.read_u16().is_ok());
        assert_eq!(
            reader.read_u32(),
            Err(DecodeError::UnexpectedEnd { offset: 2 })
        );
    }

    #[test]
    fn test_read_floats() -> Result<(), DecodeError> {
        let mut out = Vec::new();
        write_floats(Precision::Float32, &[1.0, -2.0], &mut out);
        let mut reader = ByteReader::new(&out);
        let values: [f64; 2] = reader.read_floats(Precision::Float32)?;
        assert_eq!(values, [1.0, -2.0]);
        Ok(())
    }
}
