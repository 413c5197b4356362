//! Round timer.
//!
//! A countdown with a zero timeout is untimed: it never expires and only
//! reports elapsed time. All comparisons use the monotonic clock.

use std::time::{Duration, Instant};

use crate::core::GameConfig;
use crate::display::GameDisplay;

/// Round deadline plus tick-interval selection.
#[derive(Clone, Debug)]
pub struct Countdown {
    timeout: Option<Duration>,
    warning: Duration,
    fast_tick: Duration,
    slow_tick: Duration,
    started: Instant,
}

impl Countdown {
    /// Start a countdown. A zero `timeout` gives an untimed round.
    #[must_use]
    pub fn new(timeout: Duration, warning: Duration) -> Self {
        Self {
            timeout: (!timeout.is_zero()).then_some(timeout),
            warning,
            fast_tick: Duration::from_millis(10),
            slow_tick: Duration::from_millis(100),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.turn_timeout(), config.turn_timeout_warning())
            .with_ticks(config.fast_tick(), config.slow_tick())
    }

    #[must_use]
    pub fn with_ticks(mut self, fast: Duration, slow: Duration) -> Self {
        self.fast_tick = fast;
        self.slow_tick = slow;
        self
    }

    /// Restart from the full timeout.
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.timeout.is_some()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left, or `None` for an untimed round.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.timeout.map(|t| t.saturating_sub(self.elapsed()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }

    /// Whether the remaining time is within the warning threshold.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.remaining().is_some_and(|r| r <= self.warning)
    }

    /// Sleep length for the next tick.
    ///
    /// Fast when close to the deadline or right after a card placement.
    /// Never sleeps past the deadline.
    #[must_use]
    pub fn tick_interval(&self, card_placed: bool) -> Duration {
        let tick = if card_placed || self.is_warning() {
            self.fast_tick
        } else {
            self.slow_tick
        };
        match self.remaining() {
            Some(remaining) if !remaining.is_zero() => tick.min(remaining),
            _ => tick,
        }
    }

    /// Push the current timer value to the display.
    pub fn publish(&self, display: &dyn GameDisplay) {
        match self.remaining() {
            Some(remaining) => display.set_countdown(remaining.as_millis() as u64, self.is_warning()),
            None => display.set_elapsed(self.elapsed().as_millis() as u64),
        }
    }
}
