//! Time-windowed duplicate detection for inbound messages.
//!
//! Owned by the caller, one per conversation or observer. Nothing in this
//! crate keeps process-wide state.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Default window within which a repeated message counts as a duplicate.
pub const DEFAULT_WINDOW_MS: i64 = 1000;

/// Default number of recent messages remembered.
pub const DEFAULT_CAPACITY: usize = 64;

/// Remembers recently seen message keys for a bounded time window.
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    window: Duration,
    capacity: usize,
    recent: VecDeque<(String, DateTime<Utc>)>,
}

impl DuplicateFilter {
    /// Create a filter. A capacity of zero is treated as one.
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            recent: VecDeque::new(),
        }
    }

    /// Check a key against the wall clock. See [`check_at`](Self::check_at).
    pub fn check(&mut self, key: &str) -> bool {
        self.check_at(key, Utc::now())
    }

    /// Returns `true` and remembers the key if it was not seen within the
    /// window before `now`, `false` if it is a duplicate.
    pub fn check_at(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        self.expire(now);

        if self.recent.iter().any(|(seen, _)| seen == key) {
            tracing::debug!(key, "Duplicate message within window");
            return false;
        }

        if self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back((key.to_string(), now));
        true
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn clear(&mut self) {
        self.recent.clear();
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        while let Some((_, at)) = self.recent.front() {
            if now - *at < self.window {
                break;
            }
            self.recent.pop_front();
        }
    }
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_WINDOW_MS), DEFAULT_CAPACITY)
    }
}
