//! # Alarm requests.
//!
//! An [`AlarmRequest`] is either a **create** (fires after `delay_secs`) or a
//! **cancel** (removes the create with the same id). Requests are immutable once
//! built; collections move them, snapshots clone them.
//!
//! ## Ordering key
//! ```text
//! Create → deadline = submitted_at + delay_secs
//! Cancel → submitted_at                       (due immediately)
//! ```

use std::fmt;
use std::time::SystemTime;

use tokio::time::Instant;

use crate::alarms::text::AlarmText;
use crate::clock::Clock;

/// Identifier shared by a create and the cancel that targets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlarmId(pub u64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AlarmId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// What a request asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlarmKind {
    /// Fire `message` once `deadline` has passed.
    Create {
        /// Requested delay in whole seconds.
        delay_secs: u64,
        /// Absolute instant at which the alarm becomes due.
        deadline: Instant,
        /// Text shown by the presenter.
        message: AlarmText,
    },
    /// Remove the create with the same id from wherever it lives.
    Cancel,
}

/// A single create or cancel request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlarmRequest {
    id: AlarmId,
    kind: AlarmKind,
    submitted_at: Instant,
    submitted_wall: SystemTime,
}

impl AlarmRequest {
    /// Builds a create request due `delay_secs` seconds from now.
    pub fn create(id: u64, delay_secs: u64, message: impl Into<AlarmText>) -> Self {
        let now = Clock::now();
        Self {
            id: AlarmId(id),
            kind: AlarmKind::Create {
                delay_secs,
                deadline: Clock::deadline_after(now, delay_secs),
                message: message.into(),
            },
            submitted_at: now,
            submitted_wall: Clock::wall(),
        }
    }

    /// Builds a cancel request for `id`.
    pub fn cancel(id: u64) -> Self {
        Self {
            id: AlarmId(id),
            kind: AlarmKind::Cancel,
            submitted_at: Clock::now(),
            submitted_wall: Clock::wall(),
        }
    }

    #[inline]
    pub fn id(&self) -> AlarmId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &AlarmKind {
        &self.kind
    }

    #[inline]
    pub fn is_cancel(&self) -> bool {
        matches!(self.kind, AlarmKind::Cancel)
    }

    #[inline]
    pub fn is_create(&self) -> bool {
        !self.is_cancel()
    }

    /// Instant at which the scheduler must process this request.
    pub fn due(&self) -> Instant {
        match &self.kind {
            AlarmKind::Create { deadline, .. } => *deadline,
            AlarmKind::Cancel => self.submitted_at,
        }
    }

    /// Deadline of a create; `None` for a cancel.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.kind {
            AlarmKind::Create { deadline, .. } => Some(*deadline),
            AlarmKind::Cancel => None,
        }
    }

    /// Requested delay of a create; `0` for a cancel.
    pub fn delay_secs(&self) -> u64 {
        match &self.kind {
            AlarmKind::Create { delay_secs, .. } => *delay_secs,
            AlarmKind::Cancel => 0,
        }
    }

    /// Message of a create; `None` for a cancel.
    pub fn message(&self) -> Option<&AlarmText> {
        match &self.kind {
            AlarmKind::Create { message, .. } => Some(message),
            AlarmKind::Cancel => None,
        }
    }

    #[inline]
    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    #[inline]
    pub fn submitted_wall(&self) -> SystemTime {
        self.submitted_wall
    }
}
