//! Connection manager for one backend dependency.
//!
//! # Responsibilities
//! - Own the channel: build it at `start()`, close it exactly once at `stop()`
//! - Own the monitor task: spawn at `start()`, cancel at `stop()`
//! - Expose health-gated dispatch and a liveness probe to the service layer
//!
//! # Design Decisions
//! - Managers are fully independent; nothing is shared between dependencies
//! - `stop()` is safe after a partial or absent `start()`
//! - The dispatcher is published through an atomic swap so calls never
//!   contend with lifecycle operations

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use crate::channel::{Channel, ChannelError, Connector, SurfaceFactory};
use crate::config::DependencyConfig;
use crate::dispatch::{DispatchError, Dispatcher};
use crate::health::monitor::{HealthMonitor, MonitorSettings};
use crate::health::state::{HealthCell, HealthState};
use crate::lifecycle::Shutdown;
use crate::observability::{metrics, LogRegistry};

/// Errors surfaced by `start()`.
#[derive(Debug, Error)]
pub enum StartError {
    /// `start()` on an instance that is already running. No effect.
    #[error("connection manager for '{service}' is already started")]
    AlreadyStarted { service: String },

    /// The channel could not be established. Non-fatal to the host;
    /// health is left at Unknown.
    #[error("could not establish channel for '{service}': {source}")]
    Connection {
        service: String,
        #[source]
        source: ChannelError,
    },
}

/// Resources that exist only while the manager is started.
struct Started {
    channel: Arc<dyn Channel>,
    shutdown: Shutdown,
    monitor: JoinHandle<()>,
}

/// Owns one long-lived channel to a backend microservice and the
/// background task watching it.
pub struct ConnectionManager<Req, Resp> {
    config: DependencyConfig,
    connector: Arc<dyn Connector>,
    factory: SurfaceFactory<Req, Resp>,
    health: Arc<HealthCell>,
    dispatcher: ArcSwapOption<Dispatcher<Req, Resp>>,
    started: Mutex<Option<Started>>,
}

impl<Req, Resp> ConnectionManager<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Construct a stopped manager.
    ///
    /// Registers the dependency's name with the log registry; a duplicate
    /// name is flagged once here and otherwise ignored.
    pub fn new(
        config: DependencyConfig,
        connector: Arc<dyn Connector>,
        factory: SurfaceFactory<Req, Resp>,
        registry: &LogRegistry,
    ) -> Self {
        if !registry.register(&config.name) {
            tracing::warn!(
                service = %config.name,
                "dependency name already registered, log lines will be ambiguous"
            );
        }
        Self {
            config,
            connector,
            factory,
            health: Arc::new(HealthCell::new()),
            dispatcher: ArcSwapOption::empty(),
            started: Mutex::new(None),
        }
    }

    /// Open the channel, build the call surface, and spawn the monitor.
    pub async fn start(&self) -> Result<(), StartError> {
        let mut slot = self.started.lock().await;
        if slot.is_some() {
            return Err(StartError::AlreadyStarted {
                service: self.config.name.clone(),
            });
        }

        self.health.reset();

        let channel = self
            .connector
            .connect(&self.config.address)
            .await
            .map_err(|source| StartError::Connection {
                service: self.config.name.clone(),
                source,
            })?;

        // One bounded probe so boot logs say whether the backend was up,
        // without ever failing the host. The monitor owns the state from
        // here on.
        match channel.connectivity(true).await {
            Ok(true) => tracing::info!(
                service = %self.config.name,
                target = %self.config.address,
                "connected to dependency"
            ),
            Ok(false) => tracing::warn!(
                service = %self.config.name,
                target = %self.config.address,
                "dependency not reachable yet"
            ),
            Err(e) => tracing::warn!(
                service = %self.config.name,
                error = %e,
                "initial connectivity probe failed"
            ),
        }

        let surface = match (self.factory)(&channel) {
            Ok(surface) => surface,
            Err(source) => {
                // Partial start: the channel was never published, close it
                // here so stop() has nothing left to clean up.
                channel.close().await;
                return Err(StartError::Connection {
                    service: self.config.name.clone(),
                    source,
                });
            }
        };

        self.dispatcher.store(Some(Arc::new(Dispatcher::new(
            self.config.name.clone(),
            surface,
            Arc::clone(&self.health),
            self.config.call_timeout(),
        ))));

        let shutdown = Shutdown::new();
        let monitor = HealthMonitor::new(
            self.config.name.clone(),
            Arc::clone(&channel),
            Arc::clone(&self.health),
            MonitorSettings {
                poll_interval: self.config.poll_interval(),
                max_backoff: self.config.max_poll_backoff(),
            },
        );
        let handle = tokio::spawn(monitor.run(shutdown.subscribe()));

        *slot = Some(Started {
            channel,
            shutdown,
            monitor: handle,
        });

        tracing::info!(
            service = %self.config.name,
            target = %self.config.address,
            "connection manager started"
        );
        Ok(())
    }

    /// Cancel the monitor, wait out the grace period, close the channel.
    ///
    /// Idempotent, and safe on a manager that never started.
    pub async fn stop(&self) {
        let mut slot = self.started.lock().await;
        let Some(started) = slot.take() else {
            tracing::debug!(service = %self.config.name, "stop on a stopped manager");
            return;
        };

        // Stop admitting calls before tearing anything down.
        self.dispatcher.store(None);

        started.shutdown.trigger();
        let mut monitor = started.monitor;
        match time::timeout(self.config.stop_grace(), &mut monitor).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(service = %self.config.name, error = %e, "monitor task ended abnormally");
            }
            Err(_) => {
                tracing::warn!(
                    service = %self.config.name,
                    "monitor did not exit within the grace period, aborting"
                );
                monitor.abort();
            }
        }

        started.channel.close().await;
        self.health.reset();
        metrics::record_dependency_health(&self.config.name, HealthState::Unknown);

        tracing::info!(service = %self.config.name, "connection manager stopped");
    }

    /// One health-gated call. Rejected without network I/O while the
    /// dependency is not Healthy (including before `start()`).
    pub async fn dispatch(&self, request: Req) -> Result<Resp, DispatchError> {
        match self.dispatcher.load_full() {
            Some(dispatcher) => dispatcher.dispatch(request).await,
            None => {
                metrics::record_dispatch(&self.config.name, "rejected");
                Err(DispatchError::Rejected {
                    service: self.config.name.clone(),
                })
            }
        }
    }

    /// Liveness probe: true only when the last observation saw the
    /// backend reachable.
    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy()
    }

    /// The raw tri-state, for hosts that distinguish Unknown.
    pub fn health(&self) -> HealthState {
        self.health.get()
    }

    /// The dependency's configured name.
    pub fn service_name(&self) -> &str {
        &self.config.name
    }
}

impl<Req, Resp> std::fmt::Debug for ConnectionManager<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("service", &self.config.name)
            .field("target", &self.config.address)
            .field("health", &self.health.get())
            .finish()
    }
}
