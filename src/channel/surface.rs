//! Typed call interface bound to a channel.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::channel::{Channel, ChannelError};

/// Remote status code attached to a failed call.
///
/// Mirrors the usual RPC status vocabulary so the dispatcher can classify
/// failures without knowing the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Cancelled,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Unimplemented,
    Internal,
    Unavailable,
    Unauthenticated,
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Cancelled => "CANCELLED",
            Status::InvalidArgument => "INVALID_ARGUMENT",
            Status::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Status::NotFound => "NOT_FOUND",
            Status::PermissionDenied => "PERMISSION_DENIED",
            Status::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Status::FailedPrecondition => "FAILED_PRECONDITION",
            Status::Unimplemented => "UNIMPLEMENTED",
            Status::Internal => "INTERNAL",
            Status::Unavailable => "UNAVAILABLE",
            Status::Unauthenticated => "UNAUTHENTICATED",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// A failed remote call: status code plus human-readable detail.
#[derive(Debug, Clone, Error)]
#[error("{status}: {detail}")]
pub struct CallFailure {
    pub status: Status,
    pub detail: String,
}

impl CallFailure {
    pub fn new(status: Status, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

/// Typed call interface for issuing calls over a channel.
///
/// One invocation is exactly one logical call; retries, if any, belong to
/// the caller. Implementations report failures as `CallFailure` so the
/// dispatcher can classify them.
#[async_trait]
pub trait CallSurface<Req, Resp>: Send + Sync {
    async fn call(&self, request: Req) -> Result<Resp, CallFailure>;
}

/// Builds the call surface bound to a freshly opened channel.
///
/// Invoked once per `start()`; the surface shares the channel's lifetime
/// and is rebuilt whenever the channel is rebuilt.
pub type SurfaceFactory<Req, Resp> = Arc<
    dyn Fn(&Arc<dyn Channel>) -> Result<Arc<dyn CallSurface<Req, Resp>>, ChannelError>
        + Send
        + Sync,
>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display_includes_status_and_detail() {
        let failure = CallFailure::new(Status::Unavailable, "connection refused");
        assert_eq!(failure.to_string(), "UNAVAILABLE: connection refused");
    }
}
