//! # alarmvisor
//!
//! **Alarmvisor** is a concurrent alarm scheduling and notification pipeline.
//!
//! Clients submit timed alarms (create or cancel). A create fires at or after
//! its deadline, travels through a bounded hand-off to a display stage, and is
//! shown periodically until cancelled. The scheduler always waits for the
//! *earliest* pending deadline, including one inserted mid-wait.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   "5 Message(1) hi"   "Cancel: Message(1)"      AlarmRequest
//!          │                    │                      │
//!          ▼                    ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  AlarmRuntime                                                     │
//! │  - submit_line / submit  (Command parser, intake events)          │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - AliveTracker (names stuck workers on shutdown)                 │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼
//!  PendingQueue ─ Mutex<PendingRegistry> (sorted by due) + Notify
//!        │
//!        ▼
//!  Scheduler ── Idle / Waiting{deadline} / Processing ──┐
//!        │ create                                       │ cancel
//!        ▼                                              ▼
//!  BoundedChannel (capacity C) ─► DisplayConsumer ─► ActiveDisplay ◄─ remove by id
//!                                                       │
//!                                                       ▼
//!                                         PeriodicPresenter ─► Render
//! ```
//!
//! ### Events
//! ```text
//! intake/scheduler/consumer/runtime ── publish(Event) ──► Bus
//!                                                          │
//!                                              subscriber_listener
//!                                                          ▼
//!                                                   SubscriberSet
//!                                            ┌─────────┼─────────┐
//!                                            ▼         ▼         ▼
//!                                        LogWriter   sub2  ...  subN
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Spawn the pipeline, submit requests, shut down gracefully.   | [`AlarmRuntime`], [`RuntimeBuilder`]        |
//! | **Requests**      | Create/cancel requests and the textual command grammar.      | [`AlarmRequest`], [`Command`]               |
//! | **Pipeline**      | Pending registry, scheduler, bounded hand-off, display list. | [`PendingQueue`], [`Scheduler`], [`BoundedChannel`], [`ActiveDisplay`] |
//! | **Presentation**  | Periodic frames, rows in pairs.                              | [`Render`], [`Frame`], [`TextRender`]       |
//! | **Subscriber API**| Hook into lifecycle events.                                  | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors with stable labels.                             | [`RuntimeError`], [`ParseError`], [`SubmitError`] |
//! | **Configuration** | Centralized runtime settings.                                | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] and the binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use alarmvisor::{AlarmRuntime, Config, Frame, Render};
//!
//! struct Quiet;
//!
//! #[async_trait::async_trait]
//! impl Render for Quiet {
//!     async fn render(&self, _frame: &Frame) -> std::io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = AlarmRuntime::builder(Config::default())
//!         .with_render(Arc::new(Quiet))
//!         .build();
//!     rt.start().await?;
//!
//!     rt.submit_line("2 Message(1) first").await?;
//!     rt.submit_line("1 Message(2) second").await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!
//!     let ids: Vec<u64> = rt.active_snapshot().await.iter().map(|a| a.id().0).collect();
//!     assert_eq!(ids, vec![1, 2]);
//!
//!     rt.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod alarms;
mod clock;
mod core;
mod error;
mod events;
mod intake;
mod render;
mod subscribers;

// ---- Public re-exports ----

pub use alarms::{AlarmId, AlarmKind, AlarmRequest, AlarmText, Command};
pub use clock::Clock;
pub use self::core::{
    ActiveDisplay, ActiveDisplayList, Admitted, AlarmRuntime, BoundedChannel, CancelOutcome,
    Config, Insertion, Materialized, PendingQueue, PendingRegistry, RuntimeBuilder, Scheduler,
    SchedulerState, wait_for_shutdown_signal,
};
pub use self::core::{consumer::DisplayConsumer, presenter::PeriodicPresenter};
pub use error::{ChannelClosed, ParseError, RuntimeError, SubmitError};
pub use events::{Bus, Event, EventKind};
pub use intake::{IntakeStats, pump};
pub use render::{Frame, Render, Row, TextRender};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in logger subscriber.
// Enabled by default with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
