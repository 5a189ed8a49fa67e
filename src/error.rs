//! Error types used by the alarm runtime and its intake.
//!
//! - [`RuntimeError`]: failures of the runtime itself (fatal worker panic, shutdown over grace).
//! - [`ParseError`]: malformed intake lines; reported, never fatal.
//! - [`SubmitError`]: a request could not be accepted.
//! - [`ChannelClosed`]: the display hand-off channel was closed.
//!
//! Every enum offers `as_label` for stable snake_case labels in logs.
//! A cancel for an unknown id is **not** an error and has no type here.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the alarm runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some workers did not stop in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Workers that did not stop in time.
        stuck: Vec<String>,
    },

    /// A worker panicked; the shared state it guarded can no longer be trusted.
    #[error("worker {worker} panicked: {info}")]
    WorkerPanicked {
        /// Worker name (`scheduler`, `consumer`, `presenter`).
        worker: String,
        /// Panic payload rendered as text.
        info: String,
    },

    /// `start` was called on a runtime whose workers are already running.
    #[error("runtime already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use alarmvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }
}

/// # Malformed intake line.
///
/// The line is discarded and no state changes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// Line matches neither the create nor the cancel form.
    #[error("bad command: {line:?}")]
    Unrecognized {
        /// Offending input (trimmed).
        line: String,
    },

    /// Create with a negative delay.
    #[error("negative delay {delay}s")]
    NegativeDelay {
        /// Parsed delay.
        delay: i64,
    },

    /// `Message(<id>)` with a non-numeric or negative id.
    #[error("invalid message id {token:?}")]
    InvalidId {
        /// Text found between the parentheses.
        token: String,
    },

    /// Create without message text.
    #[error("missing message text for alarm {id}")]
    MissingText {
        /// Parsed alarm id.
        id: u64,
    },
}

impl ParseError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseError::Empty => "parse_empty",
            ParseError::Unrecognized { .. } => "parse_unrecognized",
            ParseError::NegativeDelay { .. } => "parse_negative_delay",
            ParseError::InvalidId { .. } => "parse_invalid_id",
            ParseError::MissingText { .. } => "parse_missing_text",
        }
    }
}

/// # A request could not be accepted by the runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Runtime is shutting down; no new requests are taken.
    #[error("runtime closed")]
    Closed,

    /// Intake line could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Closed => "submit_closed",
            SubmitError::Parse(e) => e.as_label(),
        }
    }
}

/// The display hand-off channel was closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("channel closed")]
pub struct ChannelClosed;
