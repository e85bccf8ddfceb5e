//! Restartable debounce timer as plain state.

use std::time::Duration;

use tokio::time::Instant;

/// Every `schedule` pushes the deadline out to `now + delay`; the timer fires
/// once when the deadline passes with no further changes.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
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

    /// Consume the deadline if it has passed.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_pushes_the_deadline_out() {
        let t0 = Instant::now();
        let mut d = Debounce::new(Duration::from_millis(200));
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(150));

        assert!(!d.take_due(t0 + Duration::from_millis(200)));
        assert!(d.take_due(t0 + Duration::from_millis(350)));
        assert!(!d.is_pending());
        assert!(!d.take_due(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_clears_pending_deadline() {
        let t0 = Instant::now();
        let mut d = Debounce::new(Duration::from_millis(200));
        d.schedule(t0);
        d.cancel();
        assert_eq!(d.deadline(), None);
        assert!(!d.take_due(t0 + Duration::from_secs(1)));
    }
}
