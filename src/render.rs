//! # Presentation of active alarms.
//!
//! The presenter builds one [`Frame`] per scan and hands it to a [`Render`]
//! implementation. Rows are grouped in pairs, the last group holding a single
//! row when the count is odd.
//!
//! ## Example output ([`TextRender`])
//! ```text
//! Seconds: 5, Alarm: 1, Message: hello, Elapsed: 2, Inserted: 1760000000
//! Seconds: 9, Alarm: 4, Message: tea, Elapsed: 0, Inserted: 1760000003
//!
//! Seconds: 1, Alarm: 7, Message: bye, Elapsed: 11, Inserted: 1760000001
//!
//! ```

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::alarms::{AlarmId, AlarmRequest};
use crate::clock::Clock;

/// One displayed alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: AlarmId,
    pub message: String,
    /// Requested delay.
    pub delay_secs: u64,
    /// Whole seconds since the deadline passed.
    pub elapsed_secs: u64,
    /// Wall-clock submission time, seconds since the Unix epoch.
    pub submitted_epoch: u64,
}

impl Row {
    fn from_request(req: &AlarmRequest, now: Instant) -> Self {
        let elapsed_secs = req
            .deadline()
            .map(|d| now.saturating_duration_since(d).as_secs())
            .unwrap_or(0);
        Self {
            id: req.id(),
            message: req.message().map(|m| m.to_string()).unwrap_or_default(),
            delay_secs: req.delay_secs(),
            elapsed_secs,
            submitted_epoch: Clock::epoch_secs(req.submitted_wall()),
        }
    }
}

/// Snapshot of the active list at one scan, rows in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub at: Instant,
    pub rows: Vec<Row>,
}

impl Frame {
    /// Builds a frame from a display snapshot taken at `now`.
    pub fn build(now: Instant, snapshot: &[AlarmRequest]) -> Self {
        Self {
            at: now,
            rows: snapshot
                .iter()
                .map(|req| Row::from_request(req, now))
                .collect(),
        }
    }

    /// Rows grouped two at a time.
    pub fn pairs(&self) -> std::slice::Chunks<'_, Row> {
        self.rows.chunks(2)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sink for presenter frames.
#[async_trait]
pub trait Render: Send + Sync + 'static {
    async fn render(&self, frame: &Frame) -> io::Result<()>;
}

/// Writes frames as text lines, a blank line after every pair.
pub struct TextRender<W> {
    out: Mutex<W>,
}

impl TextRender<tokio::io::Stdout> {
    /// Renderer writing to stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> TextRender<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Text for one frame; empty for an empty frame.
    pub fn format(frame: &Frame) -> String {
        let mut text = String::new();
        for pair in frame.pairs() {
            for row in pair {
                text.push_str(&format!(
                    "Seconds: {}, Alarm: {}, Message: {}, Elapsed: {}, Inserted: {}\n",
                    row.delay_secs, row.id, row.message, row.elapsed_secs, row.submitted_epoch
                ));
            }
            text.push('\n');
        }
        text
    }

    /// Gives back the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Render for TextRender<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn render(&self, frame: &Frame) -> io::Result<()> {
        if frame.is_empty() {
            return Ok(());
        }
        let text = Self::format(frame);
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await
    }
}
