//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by intake, scheduler, consumer and the
//! runtime itself.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `AlarmRuntime` (intake, shutdown), `Scheduler`, `DisplayConsumer`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the runtime's subscriber listener (fans out to `SubscriberSet`)
//!   and any caller of `AlarmRuntime::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
