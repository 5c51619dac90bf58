//! Wall-clock source for countdown arithmetic.

use chrono::Utc;
use tokio::time::Instant;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Epoch pinned at construction, advanced by tokio's clock.
///
/// Under a paused tokio runtime this follows virtual time, so countdown
/// behaviour can be driven deterministically.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    epoch_ms: i64,
    started: Instant,
}

impl AnchoredClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            epoch_ms,
            started: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now_ms(&self) -> i64 {
        self.epoch_ms + self.started.elapsed().as_millis() as i64
    }
}
