//! # Runtime events emitted by intake, scheduler, consumer and runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Intake events**: a request was accepted, rescheduled or rejected
//! - **Pipeline events**: scheduler/consumer progress (preempted, fired, displayed)
//! - **Cancellation events**: where a cancel took effect, or that it was a no-op
//! - **Runtime events**: shutdown, worker failures, subscriber health
//!
//! The [`Event`] struct carries the optional metadata (alarm id, reason, delay).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use alarmvisor::{AlarmId, Event, EventKind};
//!
//! let ev = Event::new(EventKind::AlarmCancelled)
//!     .with_alarm(AlarmId(7))
//!     .with_reason("pending");
//!
//! assert_eq!(ev.kind, EventKind::AlarmCancelled);
//! assert_eq!(ev.alarm, Some(AlarmId(7)));
//! assert_eq!(ev.reason.as_deref(), Some("pending"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::alarms::AlarmId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Intake events ===
    /// Create request queued in the pending registry.
    ///
    /// Sets: `alarm`, `delay_ms`, `message`
    AlarmAccepted,

    /// Create replaced a pending create with the same id (deadline moved).
    ///
    /// Sets: `alarm`, `delay_ms`, `message`
    AlarmRescheduled,

    /// Cancel request queued in the pending registry.
    ///
    /// Sets: `alarm`
    CancelAccepted,

    /// Intake line rejected as malformed; nothing changed.
    ///
    /// Sets: `reason` (error text)
    AlarmRejected,

    // === Pipeline events ===
    /// An earlier deadline arrived while the scheduler waited on a later one.
    ///
    /// Sets: `alarm` (abandoned head), `delay_ms` (time left on the abandoned wait)
    SchedulerPreempted,

    /// Create became due and was handed to the display channel.
    ///
    /// Sets: `alarm`, `delay_ms`, `message`
    AlarmFired,

    /// Create materialized in the active display list.
    ///
    /// Sets: `alarm`, `reason` (`inserted` or `replaced`)
    AlarmDisplayed,

    /// Create dropped at materialization because a cancel arrived in transit.
    ///
    /// Sets: `alarm`
    AlarmDropped,

    /// Presenter failed to render a frame; published once per failure streak.
    ///
    /// Sets: `reason` (io error)
    RenderFailed,

    // === Cancellation events ===
    /// Cancel took effect.
    ///
    /// Sets: `alarm`, `reason` (`pending`, `active`, `in_transit`, comma-joined)
    AlarmCancelled,

    /// Cancel for an unknown or already-cancelled id; no state changed.
    ///
    /// Sets: `alarm`
    CancelIgnored,

    // === Runtime events ===
    /// Shutdown requested (OS signal, intake EOF, or explicit call).
    ShutdownRequested,

    /// All workers stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not stop in time.
    GraceExceeded,

    /// A worker panicked; the runtime is going down.
    ///
    /// Sets: `worker`, `reason` (panic info)
    WorkerDead,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `worker` (subscriber name), `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `worker` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Alarm the event is about, if any.
    pub alarm: Option<AlarmId>,
    /// Alarm delay or remaining wait in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Alarm message text.
    pub message: Option<Arc<str>>,
    /// Human-readable reason (errors, cancel location, etc.).
    pub reason: Option<Arc<str>>,
    /// Worker or subscriber name, for runtime events.
    pub worker: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            alarm: None,
            delay_ms: None,
            message: None,
            reason: None,
            worker: None,
        }
    }

    /// Attaches an alarm id.
    #[inline]
    pub fn with_alarm(mut self, id: AlarmId) -> Self {
        self.alarm = Some(id);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches alarm message text.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a worker or subscriber name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}
