//! Time sources and a pausable stopwatch.

use std::time::{Duration, Instant};

/// Monotonic time source, as an offset from an arbitrary origin.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Clock anchored at the current instant.
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Accumulates time only while running.
pub struct Stopwatch<'c> {
    clock: &'c dyn Clock,
    started: Option<Duration>,
    elapsed: Duration,
}

impl<'c> Stopwatch<'c> {
    /// A stopwatch that starts paused.
    pub fn paused(clock: &'c dyn Clock) -> Self {
        Self {
            clock,
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Start accumulating time again. No-op when already running.
    pub fn resume(&mut self) {
        if self.started.is_none() {
            self.started = Some(self.clock.now());
        }
    }

    /// Stop accumulating time. No-op when already paused.
    pub fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += self.clock.now().saturating_sub(started);
        }
    }

    /// Whether time is currently being accumulated.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Pause and return the time accumulated since the previous lap.
    pub fn lap(&mut self) -> Duration {
        self.pause();
        std::mem::take(&mut self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn test_only_running_time_counts() {
        let clock = ManualClock::default();
        let mut watch = Stopwatch::paused(&clock);

        clock.advance(Duration::from_millis(50));
        watch.resume();
        assert!(watch.is_running());
        clock.advance(Duration::from_millis(3));
        watch.pause();
        clock.advance(Duration::from_millis(100));
        watch.resume();
        watch.resume();
        clock.advance(Duration::from_millis(2));

        assert_eq!(watch.lap(), Duration::from_millis(5));
        assert!(!watch.is_running());
        assert_eq!(watch.lap(), Duration::ZERO);
    }

    #[test]
    fn test_monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
