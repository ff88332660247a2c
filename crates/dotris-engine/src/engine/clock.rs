use std::time::Duration;

/// Frequency-driven tick source for gravity.
///
/// Elapsed time is fed in through [`Self::accumulate`] and drained one period
/// at a time by [`Self::take_tick`]. A stopped clock ignores elapsed time, and
/// starting it always discards whatever was accumulated, so resuming from a
/// pause never releases a burst of ticks. Assigning a frequency also discards
/// it, even when the value is unchanged, which restarts the current period.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use dotris_engine::GravityClock;
///
/// let mut clock = GravityClock::new(4);
/// clock.start();
/// clock.accumulate(Duration::from_millis(600));
/// assert!(clock.take_tick());
/// assert!(clock.take_tick());
/// assert!(!clock.take_tick());
/// ```
#[derive(Debug, Clone)]
pub struct GravityClock {
    frequency: u32,
    accumulated: Duration,
    running: bool,
    resets: u64,
}

impl GravityClock {
    /// Creates a stopped clock ticking `frequency` times per second.
    ///
    /// # Panics
    ///
    /// Panics if `frequency` is zero.
    #[must_use]
    pub fn new(frequency: u32) -> Self {
        assert!(frequency > 0, "clock frequency must be positive");
        Self {
            frequency,
            accumulated: Duration::ZERO,
            running: false,
            resets: 0,
        }
    }

    #[must_use]
    pub const fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Length of one tick.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.frequency
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
        self.reset();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Discards accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.resets += 1;
    }

    /// Number of resets so far. Callers compare two readings to tell whether
    /// the clock was reset in between.
    #[must_use]
    pub const fn resets(&self) -> u64 {
        self.resets
    }

    /// Sets the tick frequency and discards accumulated time.
    ///
    /// # Panics
    ///
    /// Panics if `frequency` is zero.
    pub fn set_frequency(&mut self, frequency: u32) {
        assert!(frequency > 0, "clock frequency must be positive");
        self.frequency = frequency;
        self.reset();
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        if self.running {
            self.accumulated += elapsed;
        }
    }

    /// Consumes one period of accumulated time, returning whether a tick fired.
    pub fn take_tick(&mut self) -> bool {
        let period = self.period();
        if !self.running || self.accumulated < period {
            return false;
        }
        self.accumulated -= period;
        true
    }
}
