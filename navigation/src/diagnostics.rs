use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::DIAGNOSTIC_LOG_EVERY;

// ============================================================================
// Throttled Diagnostics
// ============================================================================

/// Occurrence counter for hot-path diagnostics.
///
/// `tick` returns the running count on the first occurrence and on every
/// `every`-th one after that, and `None` otherwise, so callers can wrap their
/// log statement in `if let Some(count) = ...`.
#[derive(Debug)]
pub struct ThrottledLog {
    every: u64,
    count: AtomicU64,
}

impl Default for ThrottledLog {
    fn default() -> Self {
        Self::new(DIAGNOSTIC_LOG_EVERY)
    }
}

impl Clone for ThrottledLog {
    fn clone(&self) -> Self {
        Self {
            every: self.every,
            count: AtomicU64::new(self.count()),
        }
    }
}

impl ThrottledLog {
    #[must_use]
    pub const fn new(every: u64) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
            count: AtomicU64::new(0),
        }
    }

    pub fn tick(&self) -> Option<u64> {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        (count == 1 || count % self.every == 0).then_some(count)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_then_every_nth() {
        let log = ThrottledLog::new(3);
        let emitted: Vec<u64> = (0..10).filter_map(|_| log.tick()).collect();
        assert_eq!(emitted, vec![1, 3, 6, 9]);
        assert_eq!(log.count(), 10);
    }

    #[test]
    fn test_zero_interval_logs_everything() {
        let log = ThrottledLog::new(0);
        assert_eq!((0..4).filter_map(|_| log.tick()).count(), 4);
    }
}
