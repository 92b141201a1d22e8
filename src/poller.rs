//! Periodic bot status polling

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::controller::DashboardController;

/// Fetches status immediately, then once per interval, until logout.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the poll loop and hand its handle to the lifecycle
    pub fn spawn(&self, controller: Arc<DashboardController>) {
        let lifecycle = Arc::clone(controller.lifecycle());
        let interval = self.interval;
        tracing::debug!(?interval, "starting status poller");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !controller.lifecycle().is_active() {
                    break;
                }
                controller.poll_once().await;
            }
        });
        lifecycle.attach_poll_task(task);
    }
}
