//! In-memory byte link between a host and an emulated device.

use std::io::{self, Read, Write};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use mtlink_client::Transport;

/// Creates two connected ends. Bytes written to one are read from the other.
pub fn duplex() -> (DuplexEnd, DuplexEnd) {
    let (a_tx, a_rx) = channel::unbounded();
    let (b_tx, b_rx) = channel::unbounded();
    (
        DuplexEnd {
            reader: DuplexReader::new(b_rx),
            writer: DuplexWriter { tx: a_tx },
        },
        DuplexEnd {
            reader: DuplexReader::new(a_rx),
            writer: DuplexWriter { tx: b_tx },
        },
    )
}

/// Reading half. Reports end of stream once the peer's writer is dropped and
/// everything it sent has been read.
#[derive(Debug)]
pub struct DuplexReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    timeout: Option<Duration>,
}

impl DuplexReader {
    fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            timeout: None,
        }
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let chunk = match self.timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(chunk) => Some(chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::from(io::ErrorKind::TimedOut));
                }
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.rx.recv().ok(),
        };
        Ok(chunk)
    }
}

impl Read for DuplexReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pending.is_empty() {
            match self.next_chunk()? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), self.pending.get(..n)) {
            dst.copy_from_slice(src);
        }
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Writing half. Fails with `BrokenPipe` once the peer's reader is dropped.
#[derive(Debug, Clone)]
pub struct DuplexWriter {
    tx: Sender<Vec<u8>>,
}

impl Write for DuplexWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .send(buf.to_vec())
            .map_err(|_closed| io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One end of a [`duplex`] link.
#[derive(Debug)]
pub struct DuplexEnd {
    reader: DuplexReader,
    writer: DuplexWriter,
}

impl DuplexEnd {
    pub fn split(self) -> (DuplexReader, DuplexWriter) {
        (self.reader, self.writer)
    }
}

impl Read for DuplexEnd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Write for DuplexEnd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Writes never block, so only the read timeout is honored.
impl Transport for DuplexEnd {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.reader.set_timeout(timeout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_cross_the_link() -> io::Result<()> {
        let (mut host, mut device) = duplex();
        host.write_all(&[0xFA, 0xFF, 0x30])?;
        host.write_all(&[0x00, 0xD1])?;

        let mut buf = [0u8; 4];
        assert_eq!(device.read(&mut buf)?, 3);
        assert_eq!(buf.get(..3), Some(&[0xFA, 0xFF, 0x30][..]));
        let mut rest = [0u8; 8];
        assert_eq!(device.read(&mut rest)?, 2);
        assert_eq!(rest.get(..2), Some(&[0x00, 0xD1][..]));
        Ok(())
    }

    #[test]
    fn test_partial_reads_keep_remainder() -> io::Result<()> {
        let (mut host, mut device) = duplex();
        host.write_all(&[1, 2, 3, 4, 5])?;
        let mut buf = [0u8; 2];
        assert_eq!(device.read(&mut buf)?, 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(device.read(&mut buf)?, 2);
        assert_eq!(buf, [3, 4]);
        assert_eq!(device.read(&mut buf)?, 1);
        assert_eq!(buf.first(), Some(&5));
        Ok(())
    }

    #[test]
    fn test_drop_reads_as_end_of_stream() -> io::Result<()> {
        let (mut host, device) = duplex();
        drop(device);
        let mut buf = [0u8; 4];
        assert_eq!(host.read(&mut buf)?, 0);
        assert_eq!(
            host.write(&[0x00]).map_err(|e| e.kind()),
            Err(io::ErrorKind::BrokenPipe)
        );
        Ok(())
    }

    #[test]
    fn test_read_timeout() -> io::Result<()> {
        let (mut host, _device) = duplex();
        host.set_read_timeout(Some(Duration::from_millis(10)))?;
        let mut buf = [0u8; 4];
        assert_eq!(
            host.read(&mut buf).map_err(|e| e.kind()),
            Err(io::ErrorKind::TimedOut)
        );
        Ok(())
    }

    #[test]
    fn test_split_halves() -> io::Result<()> {
        let (host, device) = duplex();
        let (mut device_reader, _device_writer) = device.split();
        let (_host_reader, mut host_writer) = host.split();
        host_writer.write_all(&[0xAB])?;
        drop(host_writer);
        let mut out = Vec::new();
        device_reader.read_to_end(&mut out)?;
        assert_eq!(out, vec![0xAB]);
        Ok(())
    }
}
