//! TCP-probing channel implementation.
//!
//! # Responsibilities
//! - Resolve the target address once, at channel construction
//! - Answer active connectivity queries with a bounded TCP dial
//! - Answer passive queries from the last observed signal
//! - Refuse all queries after close

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time;

use crate::channel::{Channel, ChannelError, Connector};

/// Builds `TcpChannel`s. The connect timeout bounds both address
/// resolution at `connect()` and each active probe afterwards.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, target: &str) -> Result<Arc<dyn Channel>, ChannelError> {
        let resolved = time::timeout(self.connect_timeout, lookup_host(target))
            .await
            .map_err(|_| ChannelError::InvalidTarget {
                target: target.to_string(),
                reason: "address resolution timed out".to_string(),
            })?
            .map_err(|e| ChannelError::InvalidTarget {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        let addr = resolved
            .into_iter()
            .next()
            .ok_or_else(|| ChannelError::InvalidTarget {
                target: target.to_string(),
                reason: "no addresses resolved".to_string(),
            })?;

        Ok(Arc::new(TcpChannel {
            target: target.to_string(),
            addr,
            connect_timeout: self.connect_timeout,
            last_ready: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Channel whose connectivity signal is a fresh TCP dial to the target.
///
/// The dial result is the signal; the stream itself is dropped. A refused
/// or timed-out dial is `Ok(false)`, not an error.
#[derive(Debug)]
pub struct TcpChannel {
    target: String,
    addr: SocketAddr,
    connect_timeout: Duration,
    last_ready: AtomicBool,
    closed: AtomicBool,
}

#[async_trait]
impl Channel for TcpChannel {
    fn target(&self) -> &str {
        &self.target
    }

    async fn connectivity(&self, try_reconnect: bool) -> Result<bool, ChannelError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(ChannelError::Closed);
        }
        if !try_reconnect {
            return Ok(self.last_ready.load(Ordering::Relaxed));
        }

        let ready = matches!(
            time::timeout(self.connect_timeout, TcpStream::connect(self.addr)).await,
            Ok(Ok(_))
        );
        self.last_ready.store(ready, Ordering::Relaxed);
        Ok(ready)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
        tracing::trace!(target = %self.target, "channel closed");
    }
}
