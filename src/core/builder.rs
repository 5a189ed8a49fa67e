use std::sync::Arc;

use crate::{
    core::{Config, runtime::AlarmRuntime},
    events::Bus,
    render::{Render, TextRender},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing an [`AlarmRuntime`].
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    render: Option<Arc<dyn Render>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            render: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (intake, firing, cancellation,
    /// shutdown) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the sink for presenter frames. Defaults to [`TextRender`] on stdout.
    pub fn with_render(mut self, render: Arc<dyn Render>) -> Self {
        self.render = Some(render);
        self
    }

    /// Builds the runtime; workers are spawned later by
    /// [`AlarmRuntime::start`].
    ///
    /// Must be called inside a tokio runtime (subscriber workers are spawned here).
    pub fn build(self) -> Arc<AlarmRuntime> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let render = self
            .render
            .unwrap_or_else(|| Arc::new(TextRender::stdout()) as Arc<dyn Render>);

        let rt = Arc::new(AlarmRuntime::new_internal(self.cfg, bus, subs, render));
        rt.subscriber_listener();
        rt
    }
}
