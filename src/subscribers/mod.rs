//! # Event subscribers for the alarm runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Scheduler/Consumer ── publish(Event) ──► Bus ──► runtime listener ──► SubscriberSet
//!                                                                  ┌──────┼──────┐
//!                                                                  ▼      ▼      ▼
//!                                                              LogWriter Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use alarmvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FiredCounter;
//!
//! #[async_trait]
//! impl Subscribe for FiredCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::AlarmFired {
//!             // increment a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "fired-counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_info;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
