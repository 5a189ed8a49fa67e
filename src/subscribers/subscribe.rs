//! # Event subscribers
//!
//! A [`Subscribe`] implementation sees every [`Event`] the alarm runtime
//! publishes: intake results, fires, displays, cancels and shutdown progress.
//! The [`SubscriberSet`](crate::subscribers::SubscriberSet) gives each
//! subscriber its own bounded queue and worker, so a slow subscriber never
//! delays the scheduler or the display consumer.
//!
//! When a queue is full the event is dropped for that subscriber only and a
//! `SubscriberOverflow` event is published in its place.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use alarmvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts alarms that reached the display list.
//! #[derive(Default)]
//! struct Displayed(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Displayed {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::AlarmDisplayed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "displayed" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Receives runtime events on a dedicated worker.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` and `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    #[async_trait]
    impl Subscribe for Quiet {
        async fn on_event(&self, _event: &Event) {}
    }

    #[test]
    fn test_defaults_name_the_type() {
        assert!(Quiet.name().ends_with("Quiet"));
        assert_eq!(Quiet.queue_capacity(), 1024);
    }
}
