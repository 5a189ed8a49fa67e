//! # Alarm data model and intake commands.
//!
//! - [`AlarmRequest`] - immutable create/cancel request with its ordering key
//! - [`AlarmId`] - identifier pairing a create with its cancel
//! - [`AlarmText`] - bounded (64-byte) message text
//! - [`Command`] - textual intake command (`FromStr`)

mod command;
mod request;
mod text;

pub use command::Command;
pub use request::{AlarmId, AlarmKind, AlarmRequest};
pub use text::AlarmText;
