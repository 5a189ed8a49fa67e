//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for [`AlarmRuntime`](crate::AlarmRuntime).
//!
//! ## Sentinel values
//! - `channel_capacity = 0` → clamped to 1 (a zero-slot hand-off would never move)
//! - `display_interval = 0s` → clamped to 1ms (tokio intervals reject zero)
//! - `grace = 0s` → no wait on shutdown, stuck workers are reported immediately

use std::time::Duration;

/// Global configuration for the alarm runtime.
///
/// ## Field semantics
/// - `channel_capacity`: slots in the scheduler → consumer hand-off (min 1)
/// - `display_interval`: period between presenter scans
/// - `grace`: maximum wait for workers to stop on shutdown
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the bounded display hand-off.
    ///
    /// When full, the scheduler blocks on send; intake keeps accepting requests.
    pub channel_capacity: usize,

    /// Period of the presenter's scan of the active display list.
    pub display_interval: Duration,

    /// Maximum time to wait for workers on shutdown before giving up.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Hand-off capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }

    /// Presenter period clamped to a minimum of 1ms.
    #[inline]
    pub fn display_interval_clamped(&self) -> Duration {
        self.display_interval.max(Duration::from_millis(1))
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `channel_capacity = 4`
    /// - `display_interval = 3s`
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            channel_capacity: 4,
            display_interval: Duration::from_secs(3),
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
