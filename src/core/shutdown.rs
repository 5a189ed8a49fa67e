//! # Stop signals for the alarm binary.
//!
//! The binary races [`wait_for_shutdown_signal`] against the stdin intake;
//! whichever finishes first ends [`AlarmRuntime::run_until`], which then
//! closes intake, cancels the scheduler, consumer and presenter, and waits
//! for them within `Config::grace`.
//!
//! ```text
//! Alarm> 5 Message(1) tea
//! ^C  ──► SIGINT ──► run_until(stop) resolves ──► shutdown() ──► exit 0
//! ```
//!
//! [`AlarmRuntime::run_until`]: crate::AlarmRuntime::run_until

/// Resolves on `SIGINT`, `SIGTERM` or `SIGQUIT`.
///
/// Pending alarms are not persisted; a signal discards them. `Err` when the
/// listeners cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
