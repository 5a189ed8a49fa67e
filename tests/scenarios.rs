use std::sync::Arc;
use std::time::Duration;

use alarmvisor::{
    AlarmId, AlarmRequest, AlarmRuntime, Config, Event, EventKind, Frame, Render, SchedulerState,
};
use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};

/// Records the ids of every rendered frame.
#[derive(Default)]
struct Frames {
    seen: Mutex<Vec<Vec<u64>>>,
}

#[async_trait]
impl Render for Frames {
    async fn render(&self, frame: &Frame) -> std::io::Result<()> {
        let ids = frame.rows.iter().map(|r| r.id.0).collect();
        self.seen.lock().await.push(ids);
        Ok(())
    }
}

async fn started(interval: Duration) -> (Arc<AlarmRuntime>, Arc<Frames>) {
    let frames = Arc::new(Frames::default());
    let cfg = Config {
        display_interval: interval,
        ..Config::default()
    };
    let rt = AlarmRuntime::builder(cfg)
        .with_render(frames.clone())
        .build();
    rt.start().await.unwrap();
    (rt, frames)
}

fn active_ids(reqs: &[AlarmRequest]) -> Vec<u64> {
    reqs.iter().map(|r| r.id().0).collect()
}

async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        let ev = rx.recv().await.unwrap();
        if ev.kind == kind {
            return ev;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_before_deadline_never_displays() {
    let (rt, frames) = started(Duration::from_secs(1)).await;
    let mut events = rt.subscribe();

    rt.submit_line("5 Message(1) hello").await.unwrap();
    rt.submit_line("Cancel: Message(1)").await.unwrap();

    let ev = next_of(&mut events, EventKind::AlarmCancelled).await;
    assert_eq!(ev.alarm, Some(AlarmId(1)));
    assert_eq!(ev.reason.as_deref(), Some("pending"));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rt.active_snapshot().await.is_empty());
    assert!(rt.pending_snapshot().await.is_empty());
    assert!(frames.seen.lock().await.iter().all(|f| f.is_empty()));

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn earlier_deadline_fires_first() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    rt.submit_line("2 Message(1) a").await.unwrap();
    rt.submit_line("1 Message(2) b").await.unwrap();

    let first = next_of(&mut events, EventKind::AlarmFired).await;
    let second = next_of(&mut events, EventKind::AlarmFired).await;
    assert_eq!(first.alarm, Some(AlarmId(2)));
    assert_eq!(second.alarm, Some(AlarmId(1)));
    assert!(first.seq < second.seq);

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancel_after_display_removes_from_next_scan() {
    let (rt, frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    rt.submit_line("3 Message(1) a").await.unwrap();
    next_of(&mut events, EventKind::AlarmDisplayed).await;
    assert_eq!(active_ids(&rt.active_snapshot().await), vec![1]);

    // displayed at 3s; the scan at 6s must show it
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert!(frames.seen.lock().await.iter().any(|f| f == &vec![1]));

    rt.submit_line("Cancel: Message(1)").await.unwrap();
    let ev = next_of(&mut events, EventKind::AlarmCancelled).await;
    assert_eq!(ev.reason.as_deref(), Some("active"));
    assert!(rt.active_snapshot().await.is_empty());

    let scans_before = frames.seen.lock().await.len();
    tokio::time::sleep(Duration::from_secs(3)).await;
    let seen = frames.seen.lock().await;
    assert!(seen.len() > scans_before);
    assert!(seen[scans_before..].iter().all(|f| f.is_empty()));
    drop(seen);

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancel_twice_equals_once() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    rt.submit_line("1 Message(1) keep").await.unwrap();
    rt.submit_line("1 Message(2) drop").await.unwrap();
    next_of(&mut events, EventKind::AlarmDisplayed).await;
    next_of(&mut events, EventKind::AlarmDisplayed).await;

    rt.submit_line("Cancel: Message(2)").await.unwrap();
    next_of(&mut events, EventKind::AlarmCancelled).await;
    let after_once = active_ids(&rt.active_snapshot().await);

    rt.submit_line("Cancel: Message(2)").await.unwrap();
    let ev = next_of(&mut events, EventKind::CancelIgnored).await;
    assert_eq!(ev.alarm, Some(AlarmId(2)));
    assert_eq!(active_ids(&rt.active_snapshot().await), after_once);
    assert_eq!(after_once, vec![1]);

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancel_unknown_id_changes_nothing() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    rt.submit_line("30 Message(1) later").await.unwrap();
    rt.submit_line("Cancel: Message(404)").await.unwrap();

    next_of(&mut events, EventKind::CancelIgnored).await;
    let pending = rt.pending_snapshot().await;
    assert_eq!(active_ids(&pending), vec![1]);
    assert!(rt.active_snapshot().await.is_empty());

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn earlier_insert_preempts_current_wait() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();
    let mut state = rt.scheduler_state();

    rt.submit_line("60 Message(1) slow").await.unwrap();
    state
        .wait_for(|s| matches!(s, SchedulerState::Waiting { alarm, .. } if *alarm == AlarmId(1)))
        .await
        .unwrap();

    rt.submit_line("1 Message(2) quick").await.unwrap();
    let preempted = next_of(&mut events, EventKind::SchedulerPreempted).await;
    assert_eq!(preempted.alarm, Some(AlarmId(1)));

    let fired = next_of(&mut events, EventKind::AlarmFired).await;
    assert_eq!(fired.alarm, Some(AlarmId(2)));
    assert_eq!(active_ids(&rt.pending_snapshot().await), vec![1]);

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn resubmitted_create_moves_deadline() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    rt.submit_line("50 Message(1) far").await.unwrap();
    rt.submit_line("1 Message(1) near").await.unwrap();
    next_of(&mut events, EventKind::AlarmRescheduled).await;

    let fired = next_of(&mut events, EventKind::AlarmFired).await;
    assert_eq!(fired.message.as_deref(), Some("near"));
    next_of(&mut events, EventKind::AlarmDisplayed).await;
    assert!(rt.pending_snapshot().await.is_empty());

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn malformed_lines_are_rejected() {
    let (rt, _frames) = started(Duration::from_secs(3)).await;
    let mut events = rt.subscribe();

    for line in ["hello", "-2 Message(1) neg", "4 Message(3)", "Cancel: Message(x)"] {
        assert!(rt.submit_line(line).await.is_err(), "{line:?} must be rejected");
        let ev = next_of(&mut events, EventKind::AlarmRejected).await;
        assert!(ev.reason.is_some());
    }
    assert!(rt.pending_snapshot().await.is_empty());

    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn full_channel_keeps_intake_responsive() {
    let frames = Arc::new(Frames::default());
    let cfg = Config {
        channel_capacity: 1,
        ..Config::default()
    };
    let rt = AlarmRuntime::builder(cfg).with_render(frames).build();
    rt.start().await.unwrap();

    for id in 1..=20u64 {
        rt.submit(AlarmRequest::create(id, 0, format!("burst {id}")))
            .await
            .unwrap();
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        active_ids(&rt.active_snapshot().await),
        (1..=20).collect::<Vec<_>>()
    );

    rt.shutdown().await.unwrap();
}
