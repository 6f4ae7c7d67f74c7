//! Fixed-window counter state.

use chrono::{DateTime, Duration, Utc};

/// Per-key counter state for one fixed window.
///
/// The window is reset lazily: an expired entry is rolled over the next time
/// it is observed, never eagerly expired by a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Requests observed in the current window, including the one that
    /// triggered the most recent observation.
    pub count: u64,
    /// Absolute time at which the current window ends and the count resets.
    pub reset_at: DateTime<Utc>,
}

impl WindowState {
    /// Create a fresh window starting at `now`.
    pub fn new(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    /// Whether the current window has ended as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }

    /// Record one request at `now`, rolling over to a new window first if the
    /// current one has expired.
    pub fn observe(&mut self, now: DateTime<Utc>, window: Duration) {
        if self.is_expired(now) {
            self.count = 0;
            self.reset_at = now + window;
        }
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_new_window_starts_empty() {
        let state = WindowState::new(at(100), Duration::seconds(60));
        assert_eq!(state.count, 0);
        assert_eq!(state.reset_at, at(160));
    }

    #[test]
    fn test_observe_increments_count() {
        let mut state = WindowState::new(at(100), Duration::seconds(60));
        state.observe(at(101), Duration::seconds(60));
        state.observe(at(102), Duration::seconds(60));
        assert_eq!(state.count, 2);
        assert_eq!(state.reset_at, at(160));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let state = WindowState::new(at(100), Duration::seconds(60));
        assert!(!state.is_expired(at(159)));
        assert!(state.is_expired(at(160)));
        assert!(state.is_expired(at(200)));
    }

    #[test]
    fn test_observe_after_expiry_rolls_window() {
        let window = Duration::seconds(60);
        let mut state = WindowState::new(at(100), window);
        state.observe(at(101), window);
        state.observe(at(102), window);

        // Past reset_at: the next observation starts a new window.
        state.observe(at(161), window);
        assert_eq!(state.count, 1);
        assert_eq!(state.reset_at, at(221));
    }
}
