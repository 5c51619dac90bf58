//! Second-aligned countdown timing.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

pub const TICK: Duration = Duration::from_secs(1);

/// Time until the next wall-clock second boundary; a full second when
/// `now_ms` already sits on one.
pub fn first_tick_delay(now_ms: i64) -> Duration {
    Duration::from_millis((1_000 - now_ms.rem_euclid(1_000)) as u64)
}

pub fn aligned_interval(now_ms: i64) -> Interval {
    let mut ticker = interval_at(Instant::now() + first_tick_delay(now_ms), TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Time left until funding, split for display. Hours are not wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub fn from_ms(ms: i64) -> Self {
        Self {
            hours: ms / 3_600_000,
            minutes: (ms % 3_600_000) / 60_000,
            seconds: (ms % 60_000) / 1_000,
        }
    }
}
