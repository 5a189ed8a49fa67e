//! # Periodic presenter: scans the active list on a fixed interval.
//!
//! Each tick takes a snapshot under the display lock, releases it, builds a
//! [`Frame`] and renders it. Ticks missed while rendering are skipped rather
//! than burst. A failing render publishes one [`EventKind::RenderFailed`] per
//! streak of failures and the scans go on.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::core::display::ActiveDisplay;
use crate::events::{Bus, Event, EventKind};
use crate::render::{Frame, Render};

pub struct PeriodicPresenter {
    active: Arc<ActiveDisplay>,
    render: Arc<dyn Render>,
    bus: Bus,
    interval: Duration,
}

impl PeriodicPresenter {
    pub fn new(
        active: Arc<ActiveDisplay>,
        render: Arc<dyn Render>,
        bus: Bus,
        interval: Duration,
    ) -> Self {
        Self {
            active,
            render,
            bus,
            interval,
        }
    }

    /// Renders one frame per interval until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut failing = false;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let snapshot = self.active.snapshot().await;
                    let frame = Frame::build(Clock::now(), &snapshot);
                    match self.render.render(&frame).await {
                        Ok(()) => failing = false,
                        Err(err) if !failing => {
                            failing = true;
                            self.bus.publish(
                                Event::new(EventKind::RenderFailed).with_reason(err.to_string()),
                            );
                        }
                        Err(_) => {}
                    }
                }
            }
        }
    }
}
