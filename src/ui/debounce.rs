//! Trailing-edge debounce.

use std::time::{Duration, Instant};

/// Delay applied to search inputs before a list is refetched.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest value until `delay` passes without a newer one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    pending_since: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            pending_since: None,
        }
    }

    /// Replaces any pending value and restarts the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.pending_since = Some(now);
    }

    /// Releases the pending value once the delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.delay {
            return None;
        }
        self.pending_since = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.pending_since = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.delay)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_value_is_released() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.push("a", start);
        debouncer.push("ab", start + Duration::from_millis(120));

        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(420)), Some("ab"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn cancel_drops_the_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.push(1, start);
        debouncer.cancel();

        assert!(!debouncer.has_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
