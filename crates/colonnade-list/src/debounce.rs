#![forbid(unsafe_code)]

//! Fixed-delay, latest-wins debouncing.
//!
//! Resize and scroll streams arrive as bursts; acting on every event would
//! reflow the grid dozens of times per second. A [`Debouncer`] coalesces a
//! burst into a single firing once the burst settles: each trigger
//! reschedules the deadline, so only the most recent trigger in a burst
//! survives.
//!
//! Timer state lives on the owning controller, not in a process-wide
//! global, and is dropped (cancelled) with it. Time is injected through
//! `_at` method variants so tests stay deterministic; the plain variants
//! wrap `Instant::now()`.

use std::time::{Duration, Instant};

/// Coalesces a burst of triggers into one firing after `delay` of quiet.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet-period delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured quiet-period delay.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a trigger now.
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Record a trigger at `now`, rescheduling any pending deadline.
    pub fn trigger_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Poll the debouncer; fires at most once per settled burst.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Poll at `now`. Returns true exactly once when the deadline of the
    /// most recent trigger has passed, clearing the pending state.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending trigger without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a trigger is waiting for its quiet period to elapse.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time remaining until the pending trigger fires, if any.
    ///
    /// Useful for hosts that schedule their next poll instead of polling
    /// every frame.
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(50);

    #[test]
    fn fires_after_quiet_period() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);

        d.trigger_at(base);
        assert!(!d.poll_at(base));
        assert!(!d.poll_at(base + Duration::from_millis(49)));
        assert!(d.poll_at(base + DELAY));
    }

    #[test]
    fn fires_at_most_once_per_burst() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);

        d.trigger_at(base);
        assert!(d.poll_at(base + DELAY));
        assert!(!d.poll_at(base + 2 * DELAY));
    }

    #[test]
    fn retrigger_reschedules_deadline() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);

        d.trigger_at(base);
        d.trigger_at(base + Duration::from_millis(40));
        // The first deadline has passed, but the burst was extended.
        assert!(!d.poll_at(base + DELAY));
        assert!(d.poll_at(base + Duration::from_millis(90)));
    }

    #[test]
    fn cancel_drops_pending_trigger() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);

        d.trigger_at(base);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll_at(base + 2 * DELAY));
    }

    #[test]
    fn idle_poll_never_fires() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);
        assert!(!d.poll_at(base + 10 * DELAY));
    }

    #[test]
    fn time_until_fire_counts_down() {
        let base = Instant::now();
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.time_until_fire(base), None);

        d.trigger_at(base);
        assert_eq!(d.time_until_fire(base), Some(DELAY));
        assert_eq!(
            d.time_until_fire(base + Duration::from_millis(30)),
            Some(Duration::from_millis(20))
        );
        // Past the deadline: saturates to zero rather than underflowing.
        assert_eq!(
            d.time_until_fire(base + Duration::from_millis(80)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn zero_delay_fires_on_next_poll() {
        let base = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.trigger_at(base);
        assert!(d.poll_at(base));
    }
}
