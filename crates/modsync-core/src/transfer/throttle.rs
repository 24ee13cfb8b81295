use std::time::{Duration, Instant};

/// Minimum spacing between progress events while bytes are flowing.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Rate limiter for progress events.
///
/// The clock starts when the job starts, so the first event goes out one
/// interval in. The final event on stream end bypasses the throttle.
#[derive(Debug, Clone, Copy)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Instant,
}

impl ProgressThrottle {
    pub fn new(started: Instant) -> Self {
        Self::with_interval(started, PROGRESS_INTERVAL)
    }

    pub fn with_interval(started: Instant, interval: Duration) -> Self {
        Self {
            interval,
            last_emit: started,
        }
    }

    /// Whether an event is due at `now` given the previous emit.
    pub fn is_due(last_emit: Instant, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(last_emit) >= interval
    }

    /// Record an emit and return true if one is due at `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        if Self::is_due(self.last_emit, now, self.interval) {
            self.last_emit = now;
            true
        } else {
            false
        }
    }
}
