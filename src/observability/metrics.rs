//! Metrics recording.
//!
//! # Metrics
//! - `uplink_dependency_health` (gauge): 1=healthy, 0=unhealthy, -1=unknown
//! - `uplink_dispatch_total` (counter): dispatches by service and outcome
//!
//! # Design Decisions
//! - Facade only; the host decides whether to install an exporter
//! - Labels carry the dependency's service name

use crate::health::state::HealthState;

/// Record the current health of a dependency.
pub fn record_dependency_health(service: &str, state: HealthState) {
    let value = match state {
        HealthState::Healthy => 1.0,
        HealthState::Unhealthy => 0.0,
        HealthState::Unknown => -1.0,
    };
    metrics::gauge!("uplink_dependency_health", "service" => service.to_string()).set(value);
}

/// Count a dispatch outcome ("ok", "rejected", "transient", "remote_error").
pub fn record_dispatch(service: &str, outcome: &'static str) {
    metrics::counter!(
        "uplink_dispatch_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
