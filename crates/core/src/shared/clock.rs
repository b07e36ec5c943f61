use std::time::{Duration, Instant};

/// Time source for the cooperative session loop.
///
/// Production uses the monotonic system clock; tests drive a manual
/// clock so countdown and pacing behavior is fully deterministic.
pub trait Clock: Send {
    /// Time elapsed since the clock's origin.
    fn now(&mut self) -> Duration;

    /// Blocks (or simulates blocking) for the given duration.
    fn sleep(&mut self, duration: Duration);
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Test clock that only moves when told to (or when "slept" on).
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}
