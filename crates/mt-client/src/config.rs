//! Client configuration.

use std::time::{Duration, Instant};

/// Environment variable holding the per-operation timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "MTLINK_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one request/acknowledge exchange. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads [`TIMEOUT_ENV`]. Unset, empty or unparsable values leave the
    /// timeout disabled; `0` also disables it.
    pub fn from_env() -> Self {
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|value| parse_timeout_ms(&value));
        Self { timeout }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }
}

fn parse_timeout_ms(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}
