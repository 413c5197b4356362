//! Generation-counting wake signal.
//!
//! Waiters snapshot the generation *before* checking their own predicates
//! and then wait for it to move past that snapshot. A notify that lands
//! between the check and the wait is therefore never lost, and a spurious
//! wakeup only costs one extra predicate check.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use set_engine::actors::Signal;
//!
//! let signal = Arc::new(Signal::new());
//! let seen = signal.generation();
//!
//! let notifier = {
//!     let signal = Arc::clone(&signal);
//!     thread::spawn(move || signal.notify())
//! };
//!
//! signal.wait_past(seen);
//! notifier.join().unwrap();
//! assert!(signal.generation() > seen);
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Broadcast wake-up primitive.
#[derive(Debug, Default)]
pub struct Signal {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl Signal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation, to be passed to `wait_past`.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Advance the generation and wake every waiter.
    pub fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Block until the generation differs from `seen`.
    pub fn wait_past(&self, seen: u64) {
        let mut generation = self.generation.lock();
        while *generation == seen {
            self.cond.wait(&mut generation);
        }
    }

    /// Block until the generation differs from `seen` or `timeout` elapses.
    ///
    /// Returns true if woken by a notify.
    pub fn wait_past_timeout(&self, seen: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        while *generation == seen {
            if self.cond.wait_until(&mut generation, deadline).timed_out() {
                return *generation != seen;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_notify_before_wait_is_not_lost() {
        let signal = Signal::new();
        let seen = signal.generation();
        signal.notify();

        // Returns immediately: the generation already moved.
        signal.wait_past(seen);
        assert!(signal.wait_past_timeout(seen, Duration::from_millis(1)));
    }

    #[test]
    fn test_timeout_without_notify() {
        let signal = Signal::new();
        let seen = signal.generation();

        let start = Instant::now();
        assert!(!signal.wait_past_timeout(seen, Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wakes_all_waiters() {
        let signal = Arc::new(Signal::new());
        let seen = signal.generation();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = Arc::clone(&signal);
                thread::spawn(move || signal.wait_past(seen))
            })
            .collect();

        thread::sleep(Duration::from_millis(10));
        signal.notify();
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }
}
