//! Health-gated call dispatch.
//!
//! # Responsibilities
//! - Reject calls against a backend already known to be down (admission
//!   control, zero network I/O)
//! - Issue exactly one network attempt per dispatch, under a deadline
//! - Classify remote failures and downgrade health on the transient ones
//!
//! # Design Decisions
//! - No internal retry: retry policy belongs to the caller
//! - The dispatcher only ever writes Unhealthy; upgrades are the
//!   monitor's job

pub mod classify;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use uuid::Uuid;

use crate::channel::{CallFailure, CallSurface, Status};
use crate::health::state::{HealthCell, HealthState};
use crate::observability::metrics;

/// Errors surfaced by `dispatch()`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dependency was not Healthy; the call was rejected before any
    /// network attempt.
    #[error("'{service}' is not healthy, call rejected")]
    Rejected { service: String },

    /// The backend stopped answering (UNAVAILABLE / DEADLINE_EXCEEDED).
    /// Health has been downgraded.
    #[error("transient failure from '{service}': {failure}")]
    Transient {
        service: String,
        failure: CallFailure,
    },

    /// The backend answered with a non-transient error. Health untouched.
    #[error("remote call to '{service}' failed: {failure}")]
    Remote {
        service: String,
        failure: CallFailure,
    },
}

impl DispatchError {
    /// Status code of the remote failure, if the call got that far.
    pub fn status(&self) -> Option<Status> {
        match self {
            DispatchError::Rejected { .. } => None,
            DispatchError::Transient { failure, .. } | DispatchError::Remote { failure, .. } => {
                Some(failure.status)
            }
        }
    }
}

/// Issues one logical call against the call surface, gated by health.
pub struct Dispatcher<Req, Resp> {
    service: String,
    surface: Arc<dyn CallSurface<Req, Resp>>,
    health: Arc<HealthCell>,
    call_timeout: Duration,
}

impl<Req, Resp> Dispatcher<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub fn new(
        service: impl Into<String>,
        surface: Arc<dyn CallSurface<Req, Resp>>,
        health: Arc<HealthCell>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            service: service.into(),
            surface,
            health,
            call_timeout,
        }
    }

    /// One attempt, one classification, no retry.
    pub async fn dispatch(&self, request: Req) -> Result<Resp, DispatchError> {
        if self.health.get() != HealthState::Healthy {
            metrics::record_dispatch(&self.service, "rejected");
            tracing::debug!(service = %self.service, "call rejected, dependency not healthy");
            return Err(DispatchError::Rejected {
                service: self.service.clone(),
            });
        }

        let call_id = Uuid::new_v4();
        let failure = match time::timeout(self.call_timeout, self.surface.call(request)).await {
            Ok(Ok(response)) => {
                metrics::record_dispatch(&self.service, "ok");
                return Ok(response);
            }
            Ok(Err(failure)) => failure,
            Err(_) => CallFailure::new(
                Status::DeadlineExceeded,
                format!("no response within {:?}", self.call_timeout),
            ),
        };

        if classify::downgrades_health(failure.status) {
            // Fast local detection: don't wait for the monitor's next poll.
            self.health.set(HealthState::Unhealthy);
            metrics::record_dependency_health(&self.service, HealthState::Unhealthy);
            metrics::record_dispatch(&self.service, "transient");
            tracing::error!(
                service = %self.service,
                call_id = %call_id,
                status = %failure.status,
                detail = %failure.detail,
                "transient failure, marking dependency unhealthy"
            );
            Err(DispatchError::Transient {
                service: self.service.clone(),
                failure,
            })
        } else {
            metrics::record_dispatch(&self.service, "remote_error");
            tracing::warn!(
                service = %self.service,
                call_id = %call_id,
                status = %failure.status,
                detail = %failure.detail,
                "remote call failed"
            );
            Err(DispatchError::Remote {
                service: self.service.clone(),
                failure,
            })
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Dispatcher<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("service", &self.service)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
