use std::time::Duration;

use tokio::time::Instant;

/// Minimum spacing between interpreted snapshots.
///
/// Snapshots refused here are coalesced by the worker: only the newest one
/// is kept and interpreted once the interval has passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            last_accepted: None,
        }
    }

    /// Earliest instant the next snapshot may be interpreted.
    pub fn ready_at(&self, now: Instant) -> Instant {
        match self.last_accepted {
            Some(last) => (last + self.min_interval).max(now),
            None => now,
        }
    }

    /// Accept a snapshot arriving at `now` if the interval has passed.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        if self.ready_at(now) > now {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuses_within_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(250);

        assert!(throttle.try_accept(start));
        assert!(!throttle.try_accept(start + Duration::from_millis(100)));
        assert_eq!(
            throttle.ready_at(start + Duration::from_millis(100)),
            start + Duration::from_millis(250)
        );
        assert!(throttle.try_accept(start + Duration::from_millis(250)));
    }

    #[test]
    fn test_zero_interval_accepts_everything() {
        let start = Instant::now();
        let mut throttle = Throttle::new(0);
        assert!(throttle.try_accept(start));
        assert!(throttle.try_accept(start));
    }
}
