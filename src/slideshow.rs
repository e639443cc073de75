//! Slideshow timing.
//!
//! A slideshow is a chain of one-shot timers. A timer never reschedules
//! itself: when it fires the viewer advances, and the *display* of the new
//! image arms the next timer. That way a slow decode simply delays the next
//! slide instead of piling up ticks.
//!
//! ```text
//! display ──arm──▶ [timer pending] ──fires──▶ advance ──▶ display ──arm──▶ …
//! ```
//!
//! At most one timer is outstanding. A delay of zero turns the slideshow off
//! and cancels a pending timer; a timer that fires anyway re-checks the delay
//! and does nothing.

use std::time::{Duration, Instant};

/// Something that can fire a single deferred wake-up.
pub trait Scheduler {
    /// Arrange for one wake-up after `delay`.
    fn schedule(&mut self, delay: Duration);

    /// Drop the outstanding wake-up, if any.
    fn cancel(&mut self);

    fn is_pending(&self) -> bool;
}

/// Scheduler for a polling event loop: it only remembers a deadline, and the
/// loop asks how long it may sleep and whether the deadline has passed.
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    deadline: Option<Instant>,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long until the wake-up is due; zero if already overdue, `None` if
    /// nothing is scheduled.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consume the wake-up if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Slideshow state on top of a [`Scheduler`].
#[derive(Debug)]
pub struct Slideshow<S> {
    delay: Duration,
    pending: bool,
    scheduler: S,
}

impl<S: Scheduler> Slideshow<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self {
            delay,
            pending: false,
            scheduler,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Change the delay. Zero cancels the slideshow, including a pending timer.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
        if delay.is_zero() && self.pending {
            tracing::debug!("slideshow cancelled");
            self.scheduler.cancel();
            self.pending = false;
        }
    }

    /// Called after an image has been displayed. Schedules the next advance
    /// if the slideshow is on, nothing is pending, and there is somewhere to
    /// advance to. Returns whether a timer was scheduled.
    pub fn arm(&mut self, more_ahead: bool) -> bool {
        if !self.is_enabled() || !more_ahead || self.pending || self.scheduler.is_pending() {
            return false;
        }
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "slideshow timer armed");
        self.scheduler.schedule(self.delay);
        self.pending = true;
        true
    }

    /// Called when the timer fires. Returns whether the viewer should advance.
    pub fn fire(&mut self) -> bool {
        self.pending = false;
        self.is_enabled()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ManualScheduler;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn disabled_slideshow_never_arms() {
        let mut show = Slideshow::new(ManualScheduler::default(), Duration::ZERO);
        assert!(!show.arm(true));
        assert!(show.scheduler().scheduled.is_empty());
    }

    #[test]
    fn arms_once_while_pending() {
        let mut show = Slideshow::new(ManualScheduler::default(), secs(3));
        assert!(show.arm(true));
        assert!(!show.arm(true));
        assert_eq!(show.scheduler().scheduled, vec![secs(3)]);
    }

    #[test]
    fn does_not_arm_at_end_of_ring() {
        let mut show = Slideshow::new(ManualScheduler::default(), secs(3));
        assert!(!show.arm(false));
        assert!(!show.is_pending());
    }

    #[test]
    fn fire_clears_pending_and_allows_rearm() {
        let mut show = Slideshow::new(ManualScheduler::default(), secs(2));
        show.arm(true);
        show.scheduler_mut().pending = false;
        assert!(show.fire());
        assert!(show.arm(true));
        assert_eq!(show.scheduler().scheduled.len(), 2);
    }

    #[test]
    fn zero_delay_cancels_pending_timer() {
        let mut show = Slideshow::new(ManualScheduler::default(), secs(2));
        show.arm(true);
        show.set_delay(Duration::ZERO);
        assert!(!show.is_pending());
        assert_eq!(show.scheduler().cancelled, 1);
    }

    #[test]
    fn timer_firing_after_cancel_is_a_no_op() {
        let mut show = Slideshow::new(ManualScheduler::default(), secs(2));
        show.arm(true);
        show.set_delay(Duration::ZERO);
        assert!(!show.fire());
    }

    #[test]
    fn deadline_scheduler_reports_remaining_time() {
        let mut scheduler = DeadlineScheduler::new();
        let now = Instant::now();
        assert_eq!(scheduler.time_remaining(now), None);

        scheduler.schedule(secs(60));
        let remaining = scheduler.time_remaining(now).unwrap();
        assert!(remaining > secs(59) && remaining <= secs(61));
        assert!(!scheduler.take_due(now));
        assert!(scheduler.is_pending());
    }

    #[test]
    fn deadline_scheduler_fires_once_when_due() {
        let mut scheduler = DeadlineScheduler::new();
        scheduler.schedule(Duration::ZERO);
        let later = Instant::now() + Duration::from_millis(1);
        assert!(scheduler.take_due(later));
        assert!(!scheduler.take_due(later));
        assert!(!scheduler.is_pending());
    }
}
