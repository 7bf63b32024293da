use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

pub type Event = DateTime<Utc>;

// Sliding window of request timestamps. Events are always appended
// as "now", so the deque stays in chronological order and the oldest
// entry is at the front.
#[derive(Debug)]
pub struct TimeWindowCounter {
    retention: Duration,
    events: Mutex<VecDeque<Event>>,
}

impl TimeWindowCounter {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Records a request at the current time and returns how many
    /// requests fall inside the window afterwards.
    pub fn record_event(&self) -> usize {
        self.record_event_at(Utc::now())
    }

    /// Append, prune and count happen under a single lock so that no
    /// caller ever sees a half-applied update from another request.
    ///
    /// The wall clock can step backwards; `now` is clamped to the newest
    /// recorded event so the window stays in chronological order.
    pub fn record_event_at(&self, now: Event) -> usize {
        let mut events = self.lock();
        let now = match events.back() {
            Some(newest) if *newest > now => *newest,
            _ => now,
        };
        events.push_back(now);

        if let Some(cutoff) = self.cutoff(now) {
            while let Some(oldest) = events.front() {
                if *oldest < cutoff {
                    events.pop_front();
                } else {
                    break;
                }
            }
        }

        events.len()
    }

    /// Number of events inside the window right now. Does not prune.
    pub fn count_in_window(&self) -> usize {
        self.count_in_window_at(Utc::now())
    }

    pub fn count_in_window_at(&self, now: Event) -> usize {
        let events = self.lock();
        match self.cutoff(now) {
            Some(cutoff) => events.len() - events.partition_point(|event| *event < cutoff),
            None => events.len(),
        }
    }

    /// Copy of the window in chronological order. Entries that went
    /// stale since the last record are included.
    pub fn snapshot(&self) -> Vec<Event> {
        self.lock().iter().copied().collect()
    }

    /// Replaces the window wholesale. Meant to be called before the
    /// server starts accepting requests. Out-of-order input is sorted.
    pub fn restore(&self, mut events: Vec<Event>) {
        events.sort();
        *self.lock() = VecDeque::from(events);
    }

    fn cutoff(&self, now: Event) -> Option<Event> {
        now.checked_sub_signed(self.retention)
    }

    // The deque is consistent after any push or pop, so a panic in
    // another holder leaves nothing to repair.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
