//! # Line-oriented intake.
//!
//! [`pump`] reads commands from any [`AsyncBufRead`] (stdin in the binary),
//! one per line, and submits them to an [`AlarmRuntime`]:
//!
//! ```text
//! reader ─► next_line ─► blank? skip
//!                      └► submit_line ─► Ok            → accepted += 1
//!                                      ├► Err(Parse)   → rejected += 1 (AlarmRejected published)
//!                                      └► Err(Closed)  → stop
//! ```
//!
//! The pump ends at EOF, when `token` is cancelled, or when the runtime
//! closes.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::core::AlarmRuntime;
use crate::error::SubmitError;

/// Counters for one [`pump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeStats {
    pub accepted: usize,
    pub rejected: usize,
    pub blank: usize,
}

/// Feeds lines from `reader` into `rt`.
///
/// When `prompt` is set it is written to stdout before every read.
pub async fn pump<R>(
    rt: &AlarmRuntime,
    reader: R,
    token: &CancellationToken,
    prompt: Option<&str>,
) -> std::io::Result<IntakeStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = IntakeStats::default();
    let mut stdout = tokio::io::stdout();

    loop {
        if let Some(prompt) = prompt {
            stdout.write_all(prompt.as_bytes()).await?;
            stdout.flush().await?;
        }

        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };

        if line.trim().is_empty() {
            stats.blank += 1;
            continue;
        }
        match rt.submit_line(&line).await {
            Ok(_) => stats.accepted += 1,
            Err(SubmitError::Parse(_)) => stats.rejected += 1,
            Err(SubmitError::Closed) => break,
        }
    }
    Ok(stats)
}
