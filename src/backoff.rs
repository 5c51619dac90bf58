//! Reconnect delay policy: exponential base, capped, plus random jitter.

use rand::Rng;
use std::time::Duration;

const BASE_DELAY_MS: u64 = 1_000;
const MAX_DELAY_MS: u64 = 30_000;
const MAX_JITTER_MS: u64 = 300;

/// Delay before jitter for a given attempt: `min(30s, 1s * 2^attempt)`.
pub fn base_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
}

/// Tracks consecutive connection failures.
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Called once a connection opens.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Count a close and return how long to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        self.next_delay_with(&mut rand::thread_rng())
    }

    pub fn next_delay_with<R: Rng>(&mut self, rng: &mut R) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        base_delay(self.attempt) + Duration::from_millis(rng.gen_range(0..MAX_JITTER_MS))
    }
}
