//! Unread notification badge kept fresh by polling.

use std::time::{Duration, Instant};

/// Interval between unread count requests.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Issues unread count requests, e.g. `GET /api/v1/notifications/unread-count`.
pub trait UnreadCountSource {
    fn request_unread_count(&mut self);

    /// Aborts an outstanding request, if the transport supports it.
    fn cancel(&mut self) {}
}

pub struct NotificationPoller<S: UnreadCountSource> {
    source: S,
    interval: Duration,
    next_poll: Option<Instant>,
    unread: usize,
}

impl<S: UnreadCountSource> NotificationPoller<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(source, POLL_INTERVAL)
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            next_poll: None,
            unread: 0,
        }
    }

    /// Requests the count right away and schedules the next poll.
    pub fn start(&mut self, now: Instant) {
        self.source.request_unread_count();
        self.next_poll = Some(now + self.interval);
    }

    pub fn tick(&mut self, now: Instant) {
        let Some(due) = self.next_poll else {
            return;
        };
        if now >= due {
            self.source.request_unread_count();
            self.next_poll = Some(now + self.interval);
        }
    }

    /// Applies a fetched count; ignored once stopped.
    pub fn count_loaded(&mut self, count: usize) {
        if self.is_running() {
            self.unread = count;
        }
    }

    /// Updates the badge after the user read notifications locally.
    pub fn mark_read(&mut self, count: usize) {
        self.unread = self.unread.saturating_sub(count);
    }

    pub fn stop(&mut self) {
        if self.next_poll.take().is_some() {
            self.source.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_poll.is_some()
    }

    pub fn unread(&self) -> usize {
        self.unread
    }
}

impl<S: UnreadCountSource> Drop for NotificationPoller<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct Counter {
        requests: Rc<Cell<usize>>,
        cancels: Rc<Cell<usize>>,
    }

    impl UnreadCountSource for Counter {
        fn request_unread_count(&mut self) {
            self.requests.set(self.requests.get() + 1);
        }

        fn cancel(&mut self) {
            self.cancels.set(self.cancels.get() + 1);
        }
    }

    #[test]
    fn polls_every_thirty_seconds() {
        let start = Instant::now();
        let counter = Counter::default();
        let mut poller = NotificationPoller::new(counter.clone());

        poller.start(start);
        poller.tick(start + Duration::from_secs(29));
        assert_eq!(counter.requests.get(), 1);

        poller.tick(start + Duration::from_secs(30));
        poller.tick(start + Duration::from_secs(45));
        assert_eq!(counter.requests.get(), 2);

        poller.count_loaded(4);
        poller.mark_read(1);
        assert_eq!(poller.unread(), 3);
    }

    #[test]
    fn stopped_poller_is_silent() {
        let start = Instant::now();
        let counter = Counter::default();
        let mut poller = NotificationPoller::new(counter.clone());
        poller.start(start);
        poller.stop();

        poller.tick(start + Duration::from_secs(120));
        poller.count_loaded(9);
        assert_eq!(counter.requests.get(), 1);
        assert_eq!(poller.unread(), 0);
    }

    #[test]
    fn dropping_cancels_outstanding_requests() {
        let counter = Counter::default();
        {
            let mut poller = NotificationPoller::new(counter.clone());
            poller.start(Instant::now());
        }
        assert_eq!(counter.cancels.get(), 1);
    }
}
