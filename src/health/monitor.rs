//! Background connectivity polling.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::channel::Channel;
use crate::health::state::{transition, HealthCell, HealthState};
use crate::observability::metrics;

/// Timing knobs for one monitor loop.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    /// Base sleep between polls.
    pub poll_interval: Duration,
    /// Ceiling for the error backoff.
    pub max_backoff: Duration,
}

/// Sleep schedule for the poll loop.
///
/// Pure value type: probe errors double the delay up to the cap, a
/// completed probe resets it to the base interval.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    base: Duration,
    cap: Duration,
    current: Duration,
}

impl PollSchedule {
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            base: settings.poll_interval,
            cap: settings.max_backoff.max(settings.poll_interval),
            current: settings.poll_interval,
        }
    }

    /// The delay to sleep before the next poll.
    pub fn delay(&self) -> Duration {
        self.current
    }

    /// Double the delay after a probe error, capped.
    pub fn back_off(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.cap);
    }

    /// Return to the base interval after a completed probe.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Cooperative loop tracking one channel's reachability.
///
/// Runs for the lifetime of the channel; the manager cancels it through
/// the shutdown broadcast during `stop()`.
pub struct HealthMonitor {
    service: String,
    channel: Arc<dyn Channel>,
    health: Arc<HealthCell>,
    settings: MonitorSettings,
}

impl HealthMonitor {
    pub fn new(
        service: impl Into<String>,
        channel: Arc<dyn Channel>,
        health: Arc<HealthCell>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            service: service.into(),
            channel,
            health,
            settings,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(
            service = %self.service,
            poll_interval_ms = self.settings.poll_interval.as_millis() as u64,
            "health monitor starting"
        );

        let mut schedule = PollSchedule::new(self.settings);
        loop {
            tokio::select! {
                _ = time::sleep(schedule.delay()) => {
                    self.poll_once(&mut schedule).await;
                }
                _ = shutdown.recv() => {
                    tracing::debug!(service = %self.service, "health monitor stopping");
                    break;
                }
            }
        }
    }

    async fn poll_once(&self, schedule: &mut PollSchedule) {
        match self.channel.connectivity(true).await {
            Ok(ready) => {
                schedule.reset();
                if let Some(next) = transition(self.health.get(), ready) {
                    self.health.set(next);
                    metrics::record_dependency_health(&self.service, next);
                    match next {
                        HealthState::Healthy => {
                            tracing::info!(service = %self.service, "dependency healthy");
                        }
                        HealthState::Unhealthy => {
                            tracing::error!(service = %self.service, "dependency unhealthy");
                        }
                        // transition() never targets Unknown.
                        HealthState::Unknown => {}
                    }
                }
            }
            Err(e) => {
                schedule.back_off();
                tracing::warn!(
                    service = %self.service,
                    error = %e,
                    next_poll_ms = schedule.delay().as_millis() as u64,
                    "connectivity probe failed, backing off"
                );
            }
        }
    }
}
