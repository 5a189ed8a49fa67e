//! # Tracker of running workers.
//!
//! Each worker wrapper marks itself alive before the first poll and stopped
//! once its future returns or unwinds. On shutdown the runtime reads the
//! snapshot to name the workers that outlived the grace period.
//!
//! ```text
//! spawn_worker("scheduler") ──► started ──► run(..) ──► stopped
//!                                                         │
//! wait_all_with_grace ── timeout ──► snapshot() ──────────┘ (names still alive)
//! ```

use std::collections::BTreeSet;

use tokio::sync::RwLock;

/// Thread-safe set of alive worker names.
#[derive(Debug, Default)]
pub struct AliveTracker {
    alive: RwLock<BTreeSet<&'static str>>,
}

impl AliveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn started(&self, name: &'static str) {
        self.alive.write().await.insert(name);
    }

    pub async fn stopped(&self, name: &'static str) {
        self.alive.write().await.remove(name);
    }

    /// Sorted names of workers still running.
    pub async fn snapshot(&self) -> Vec<String> {
        self.alive
            .read()
            .await
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_is_sorted_and_tracks_stops() {
        let tracker = AliveTracker::new();
        tracker.started("scheduler").await;
        tracker.started("consumer").await;
        tracker.started("presenter").await;
        tracker.stopped("consumer").await;

        assert_eq!(tracker.snapshot().await, vec!["presenter", "scheduler"]);
    }
}
