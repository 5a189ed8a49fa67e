//! Runtime core: the alarm pipeline and its lifecycle.
//!
//! The public entry point is [`AlarmRuntime`] (built with [`RuntimeBuilder`]).
//! The pipeline pieces are public too so they can be driven on their own.
//!
//! Modules:
//! - [`pending`]: deadline-sorted registry, its lock and the scheduler wake;
//! - [`scheduler`]: wait/fire loop with preemptible waits;
//! - [`channel`]: bounded hand-off between scheduler and consumer;
//! - [`display`]: active display list with in-transit cancel tracking;
//! - [`consumer`]: drains the channel into the display list;
//! - [`presenter`]: periodic scans rendered through [`Render`](crate::Render);
//! - `runtime`: wiring, intake and graceful shutdown.

mod alive;
mod builder;
pub mod channel;
mod config;
pub mod consumer;
pub mod display;
pub mod pending;
pub mod presenter;
mod runtime;
pub mod scheduler;
mod shutdown;

pub use builder::RuntimeBuilder;
pub use channel::BoundedChannel;
pub use config::Config;
pub use display::{ActiveDisplay, ActiveDisplayList, CancelOutcome, Materialized};
pub use pending::{Admitted, Insertion, PendingQueue, PendingRegistry};
pub use runtime::AlarmRuntime;
pub use scheduler::{Scheduler, SchedulerState};
pub use shutdown::wait_for_shutdown_signal;
