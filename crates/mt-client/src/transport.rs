//! Byte transports the client can drive.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// A bidirectional byte stream to a device.
///
/// Timeouts are best effort. Transports that cannot bound a blocking call keep
/// the default no-op implementations; the client still checks its deadline
/// between frames.
pub trait Transport: Read + Write {
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn set_write_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

/// Serial device nodes opened as plain files, e.g. `/dev/ttyUSB0`.
impl Transport for File {}

/// `TcpStream` rejects a zero duration, so very short budgets are rounded up.
impl Transport for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout.map(at_least_one_ms))
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout.map(at_least_one_ms))
    }
}

fn at_least_one_ms(timeout: Duration) -> Duration {
    timeout.max(Duration::from_millis(1))
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_write_timeout(timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_write_timeout(timeout)
    }
}

pub mod mock {
    //! Scripted transport for tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays queued bytes and records every write.
    ///
    /// Clones share state, so a test can keep a handle after moving the port
    /// into a client. An empty read queue reads as end of stream unless
    /// [`MockPort::stall`] is set, in which case reads time out.
    #[derive(Clone)]
    pub struct MockPort {
        read_queue: Arc<Mutex<VecDeque<u8>>>,
        write_history: Arc<Mutex<Vec<Vec<u8>>>>,
        read_timeouts: Arc<Mutex<Vec<Option<Duration>>>>,
        stalled: Arc<Mutex<bool>>,
        connected: Arc<Mutex<bool>>,
    }

    impl MockPort {
        pub fn new() -> Self {
            Self {
                read_queue: Arc::new(Mutex::new(VecDeque::new())),
                write_history: Arc::new(Mutex::new(Vec::new())),
                read_timeouts: Arc::new(Mutex::new(Vec::new())),
                stalled: Arc::new(Mutex::new(false)),
                connected: Arc::new(Mutex::new(true)),
            }
        }

        pub fn queue_read(&self, data: &[u8]) {
            let mut queue = self.read_queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.extend(data.iter().copied());
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            let history = self.write_history.lock().unwrap_or_else(|e| e.into_inner());
            history.clone()
        }

        /// Every timeout the client applied before a read, in order.
        pub fn read_timeouts(&self) -> Vec<Option<Duration>> {
            let timeouts = self.read_timeouts.lock().unwrap_or_else(|e| e.into_inner());
            timeouts.clone()
        }

        pub fn stall(&self) {
            *self.stalled.lock().unwrap_or_else(|e| e.into_inner()) = true;
        }

        pub fn disconnect(&self) {
            *self.connected.lock().unwrap_or_else(|e| e.into_inner()) = false;
        }

        fn is_connected(&self) -> bool {
            *self.connected.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Default for MockPort {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.is_connected() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed"));
            }
            let mut queue = self.read_queue.lock().unwrap_or_else(|e| e.into_inner());
            if queue.is_empty() {
                if *self.stalled.lock().unwrap_or_else(|e| e.into_inner()) {
                    return Err(io::Error::from(io::ErrorKind::TimedOut));
                }
                return Ok(0);
            }
            let mut n = 0;
            for slot in buf.iter_mut() {
                let Some(byte) = queue.pop_front() else {
                    break;
                };
                *slot = byte;
                n += 1;
            }
            Ok(n)
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.is_connected() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed"));
            }
            let mut history = self.write_history.lock().unwrap_or_else(|e| e.into_inner());
            history.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockPort {
        fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
            let mut timeouts = self.read_timeouts.lock().unwrap_or_else(|e| e.into_inner());
            timeouts.push(timeout);
            Ok(())
        }
    }
}
