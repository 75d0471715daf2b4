//! Debounce timer
//!
//! Delays an action until a burst of trigger events has quieted. Every
//! `schedule` call restarts the timer, which is the input-coalescing
//! mechanism: only the state at fire time is ever used, so intermediate
//! values never produce work.
//!
//! The timer is polled (`fire_if_due`) rather than callback-driven, matching
//! the immediate-mode shell where a tick runs every frame.

use std::time::{Duration, Instant};

/// A restartable single-shot timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or restart) the timer: it becomes due `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm the timer without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is armed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, disarming
    /// the timer.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time until the deadline, if armed. Lets the shell request a repaint
    /// at the right moment instead of spinning.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_pending_initially() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_if_due(Instant::now()));
    }

    #[test]
    fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        debouncer.schedule(start);

        assert!(!debouncer.fire_if_due(start));
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(99)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(100)));
        // Fires exactly once
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_reschedule_restarts_the_clock() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(80));

        // The original deadline has passed, but the restart moved it
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(120)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel_disarms() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_time_remaining() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        assert!(debouncer.time_remaining(start).is_none());

        debouncer.schedule(start);
        assert_eq!(
            debouncer.time_remaining(start + Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
        // Past the deadline it saturates to zero
        assert_eq!(
            debouncer.time_remaining(start + Duration::from_millis(150)),
            Some(Duration::ZERO)
        );
    }
}
