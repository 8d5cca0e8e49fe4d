//! Deadline based coalescing of bursts of events

use std::time::Duration;
use tokio::time::Instant;

/// A timer that fires once after a quiet period
///
/// Each [`Debounce::schedule`] pushes the deadline to `now + window`, so of
/// a burst of calls only the last one decides when the work runs. Nothing
/// runs by itself: the owner asks [`Debounce::fire`] whether the deadline
/// passed, typically after sleeping until [`Debounce::deadline`].
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the deadline has passed; the timer is then disarmed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
