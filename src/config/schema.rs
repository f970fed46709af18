//! Configuration schema definitions.
//!
//! This module defines the configuration structure a hosting API process
//! loads at boot. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration: one entry per backend microservice dependency.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UplinkConfig {
    /// Backend dependency definitions.
    pub dependencies: Vec<DependencyConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One backend microservice dependency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Dependency name, used to tag every log line and metric.
    pub name: String,

    /// Backend address (e.g., "127.0.0.1:50051").
    pub address: String,

    /// Health poll interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Per-call deadline in milliseconds.
    pub call_timeout_ms: u64,

    /// Bound on channel construction and each connectivity probe,
    /// in milliseconds.
    pub connect_timeout_ms: u64,

    /// Ceiling for the monitor's error backoff in milliseconds.
    pub max_poll_backoff_ms: u64,

    /// How long `stop()` waits for the monitor to exit before aborting it,
    /// in milliseconds.
    pub stop_grace_ms: u64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            poll_interval_ms: 5_000,
            call_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            max_poll_backoff_ms: 60_000,
            stop_grace_ms: 5_000,
        }
    }
}

impl DependencyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn max_poll_backoff(&self) -> Duration {
        Duration::from_millis(self.max_poll_backoff_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "uplink=info".to_string(),
        }
    }
}
