//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout, one
//! bracketed line per event.
//!
//! ## Example output
//! ```text
//! [accepted] alarm=1 delay=5s msg="hello"
//! [preempted] alarm=2 abandoned_wait=4s
//! [fired] alarm=2 delay=1s msg="b"
//! [displayed] alarm=2 inserted
//! [cancelled] alarm=1 from=pending
//! [cancel-ignored] alarm=9
//! [rejected] err="bad command: \"hello\""
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formats one event as a single line.
    pub fn format(e: &Event) -> String {
        let alarm = e.alarm.map_or_else(|| "-".to_string(), |a| a.to_string());
        let delay = e
            .delay()
            .map_or_else(|| "-".to_string(), |d| format!("{d:?}"));
        let msg = e.message.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        let worker = e.worker.as_deref().unwrap_or("unknown");

        match e.kind {
            EventKind::AlarmAccepted => {
                format!("[accepted] alarm={alarm} delay={delay} msg={msg:?}")
            }
            EventKind::AlarmRescheduled => {
                format!("[rescheduled] alarm={alarm} delay={delay} msg={msg:?}")
            }
            EventKind::CancelAccepted => format!("[cancel-accepted] alarm={alarm}"),
            EventKind::AlarmRejected => format!("[rejected] err={reason:?}"),
            EventKind::SchedulerPreempted => {
                format!("[preempted] alarm={alarm} abandoned_wait={delay}")
            }
            EventKind::AlarmFired => {
                format!("[fired] alarm={alarm} delay={delay} msg={msg:?}")
            }
            EventKind::AlarmDisplayed => format!("[displayed] alarm={alarm} {reason}"),
            EventKind::AlarmDropped => format!("[dropped] alarm={alarm} cancelled_in_transit"),
            EventKind::RenderFailed => format!("[render-failed] err={reason:?}"),
            EventKind::AlarmCancelled => format!("[cancelled] alarm={alarm} from={reason}"),
            EventKind::CancelIgnored => format!("[cancel-ignored] alarm={alarm}"),
            EventKind::ShutdownRequested => "[shutdown-requested]".to_string(),
            EventKind::AllStoppedWithin => "[all-stopped-within-grace]".to_string(),
            EventKind::GraceExceeded => "[grace-exceeded]".to_string(),
            EventKind::WorkerDead => format!("[worker-dead] worker={worker} info={reason}"),
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={worker} reason={reason:?}")
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={worker} info={reason}")
            }
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
