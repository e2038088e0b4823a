//! Nullable clock: deterministic time for testing.

use chef_types::{Clock, Timestamp, SECONDS_PER_DAY};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Share it with the engine through an
/// `Arc` and keep a handle to move time forward between operations.
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.fetch_add(secs, Ordering::SeqCst);
    }

    /// Advance time by whole days.
    pub fn advance_days(&self, days: u64) {
        self.advance(days * SECONDS_PER_DAY);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn time_moves_only_when_told() {
        let clock = NullClock::new(1_000);
        assert_eq!(clock.now(), Timestamp::new(1_000));
        assert_eq!(clock.now(), Timestamp::new(1_000));
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::new(1_005));
        clock.advance_days(1);
        assert_eq!(clock.now(), Timestamp::new(1_005 + 86_400));
        clock.set(3);
        assert_eq!(clock.now(), Timestamp::new(3));
    }

    #[test]
    fn shared_handle_sees_advances() {
        let clock = Arc::new(NullClock::new(0));
        let engine_side: Arc<NullClock> = Arc::clone(&clock);
        clock.advance(60);
        assert_eq!(engine_side.now(), Timestamp::new(60));
    }
}
