//! Channel and call-surface abstractions.
//!
//! # Data Flow
//! ```text
//! ConnectionManager::start()
//!     → Connector::connect(target)      (builds the Channel)
//!     → SurfaceFactory(&channel)        (builds the CallSurface)
//!
//! HealthMonitor poll:
//!     Channel::connectivity(true)       (active probe, may reconnect)
//!
//! Dispatcher::dispatch():
//!     CallSurface::call(request)        (one network attempt)
//!
//! ConnectionManager::stop()
//!     → Channel::close()                (exactly once)
//! ```
//!
//! # Design Decisions
//! - Trait seams so tests can script readiness and count calls
//! - The channel carries the connectivity signal; calls go through the
//!   surface bound to it
//! - Production implementations: TCP probe channel + HTTP call surface

pub mod http;
pub mod surface;
pub mod tcp;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use http::{http_surface, HttpCallSurface};
pub use surface::{CallFailure, CallSurface, Status, SurfaceFactory};
pub use tcp::{TcpChannel, TcpConnector};

/// Faults raised by channel construction or the connectivity probe itself.
///
/// A backend that is merely down is not a `ChannelError`: the probe reports
/// that as `Ok(false)`.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Target address could not be parsed or resolved.
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Probe infrastructure failure (not plain unreachability).
    #[error("connectivity probe failed: {0}")]
    Io(String),

    /// The channel was closed and must not be used again.
    #[error("channel is closed")]
    Closed,
}

/// Opaque network connection handle to one backend address.
///
/// Exclusively owned by a `ConnectionManager`: created once at `start()`,
/// closed exactly once at `stop()`, never queried after close.
#[async_trait]
pub trait Channel: Send + Sync {
    /// The `host:port` this channel is bound to.
    fn target(&self) -> &str;

    /// Current connectivity signal. With `try_reconnect` the channel makes
    /// an active attempt to (re)establish the connection; without it the
    /// last observed signal is reported.
    async fn connectivity(&self, try_reconnect: bool) -> Result<bool, ChannelError>;

    /// Tear the channel down. The manager calls this exactly once.
    async fn close(&self);
}

/// Builds a `Channel` for a target address.
///
/// Injected into the manager so tests can supply scripted channels.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &str) -> Result<Arc<dyn Channel>, ChannelError>;
}
