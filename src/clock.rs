//! # Time source shared by every timing decision.
//!
//! Deadlines are monotonic [`Instant`]s taken from `tokio::time`, so the runtime
//! follows a paused/advanced test clock exactly like real time. Wall-clock
//! values are kept only for display.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Monotonic and wall-clock time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock;

impl Clock {
    /// Current monotonic instant.
    #[inline]
    pub fn now() -> Instant {
        Instant::now()
    }

    /// Current wall-clock time.
    #[inline]
    pub fn wall() -> SystemTime {
        SystemTime::now()
    }

    /// Instant `secs` seconds after `from`, saturating far in the future.
    pub fn deadline_after(from: Instant, secs: u64) -> Instant {
        from.checked_add(Duration::from_secs(secs))
            .unwrap_or_else(|| far_future(from))
    }

    /// Whole seconds since the Unix epoch (`0` for pre-epoch clocks).
    pub fn epoch_secs(at: SystemTime) -> u64 {
        at.duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

// Roughly thirty years; same cap tokio applies to its own far-future sleeps.
fn far_future(from: Instant) -> Instant {
    from + Duration::from_secs(86_400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_after_follows_paused_clock() {
        let start = Clock::now();
        let deadline = Clock::deadline_after(start, 5);
        assert_eq!(deadline - start, Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(Clock::now() >= deadline);
    }

    #[test]
    fn test_deadline_after_saturates() {
        let start = Instant::now();
        let deadline = Clock::deadline_after(start, u64::MAX);
        assert!(deadline > start);
    }

    #[test]
    fn test_epoch_secs() {
        assert_eq!(Clock::epoch_secs(UNIX_EPOCH), 0);
        let later = UNIX_EPOCH + Duration::from_secs(42);
        assert_eq!(Clock::epoch_secs(later), 42);
    }
}
