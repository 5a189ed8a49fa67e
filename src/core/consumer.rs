//! # Display consumer: drains the hand-off channel into the active list.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::alarms::AlarmRequest;
use crate::core::channel::BoundedChannel;
use crate::core::display::{ActiveDisplay, Materialized};
use crate::events::{Bus, Event, EventKind};

/// Receives fired creates and makes them live.
pub struct DisplayConsumer {
    channel: Arc<BoundedChannel<AlarmRequest>>,
    active: Arc<ActiveDisplay>,
    bus: Bus,
}

impl DisplayConsumer {
    pub fn new(
        channel: Arc<BoundedChannel<AlarmRequest>>,
        active: Arc<ActiveDisplay>,
        bus: Bus,
    ) -> Self {
        Self {
            channel,
            active,
            bus,
        }
    }

    /// Runs until `token` is cancelled or the channel is closed and drained.
    pub async fn run(self, token: CancellationToken) {
        loop {
            let req = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                received = self.channel.recv() => match received {
                    Ok(req) => req,
                    Err(_) => break,
                },
            };

            let id = req.id();
            let ev = match self.active.materialize(req).await {
                Materialized::Inserted => {
                    Event::new(EventKind::AlarmDisplayed).with_reason("inserted")
                }
                Materialized::Replaced(_) => {
                    Event::new(EventKind::AlarmDisplayed).with_reason("replaced")
                }
                Materialized::Dropped => Event::new(EventKind::AlarmDropped),
            };
            self.bus.publish(ev.with_alarm(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::AlarmId;

    #[tokio::test]
    async fn test_moves_items_into_active_list() {
        let channel = Arc::new(BoundedChannel::new(2));
        let active = Arc::new(ActiveDisplay::new());
        let bus = Bus::new(16);
        let mut events = bus.subscribe();

        let consumer = DisplayConsumer::new(Arc::clone(&channel), Arc::clone(&active), bus);
        let handle = tokio::spawn(consumer.run(CancellationToken::new()));

        active.mark_in_transit(AlarmId(3)).await;
        channel.send(AlarmRequest::create(3, 0, "c")).await.unwrap();
        active.mark_in_transit(AlarmId(1)).await;
        channel.send(AlarmRequest::create(1, 0, "a")).await.unwrap();

        for _ in 0..2 {
            let ev = events.recv().await.unwrap();
            assert_eq!(ev.kind, EventKind::AlarmDisplayed);
            assert_eq!(ev.reason.as_deref(), Some("inserted"));
        }
        let ids: Vec<u64> = active.snapshot().await.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![1, 3]);

        channel.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_drops_create_cancelled_in_transit() {
        let channel = Arc::new(BoundedChannel::new(1));
        let active = Arc::new(ActiveDisplay::new());
        let bus = Bus::new(16);
        let mut events = bus.subscribe();

        active.mark_in_transit(AlarmId(5)).await;
        channel.send(AlarmRequest::create(5, 0, "gone")).await.unwrap();
        active.cancel(AlarmId(5)).await;
        channel.close();

        DisplayConsumer::new(Arc::clone(&channel), Arc::clone(&active), bus)
            .run(CancellationToken::new())
            .await;

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::AlarmDropped);
        assert_eq!(ev.alarm, Some(AlarmId(5)));
        assert!(active.snapshot().await.is_empty());
    }
}
