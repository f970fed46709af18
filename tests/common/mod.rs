//! Shared mock channel and call-surface harness for integration tests.

// Each integration test crate uses a different slice of this harness.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uplink::channel::{
    CallFailure, CallSurface, Channel, ChannelError, Connector, Status, SurfaceFactory,
};
use uplink::config::DependencyConfig;

/// Shared knobs and counters driving every channel a `ScriptedConnector`
/// hands out. Cloning shares the underlying cells.
#[derive(Clone, Default)]
pub struct ChannelScript {
    ready: Arc<AtomicBool>,
    fail_probes: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl ChannelScript {
    pub fn new(ready: bool) -> Self {
        let script = Self::default();
        script.set_ready(ready);
        script
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_fail_probes(&self, fail: bool) {
        self.fail_probes.store(fail, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Channel whose connectivity signal follows its script.
pub struct ScriptedChannel {
    script: ChannelScript,
    target: String,
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn target(&self) -> &str {
        &self.target
    }

    async fn connectivity(&self, _try_reconnect: bool) -> Result<bool, ChannelError> {
        self.script.probes.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_probes.load(Ordering::SeqCst) {
            return Err(ChannelError::Io("injected probe failure".to_string()));
        }
        Ok(self.script.ready.load(Ordering::SeqCst))
    }

    async fn close(&self) {
        self.script.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connector minting a fresh scripted channel per `connect()`, all driven
/// by one shared script.
pub struct ScriptedConnector {
    script: ChannelScript,
}

impl ScriptedConnector {
    pub fn new(script: ChannelScript) -> Arc<Self> {
        Arc::new(Self { script })
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, target: &str) -> Result<Arc<dyn Channel>, ChannelError> {
        Ok(Arc::new(ScriptedChannel {
            script: self.script.clone(),
            target: target.to_string(),
        }))
    }
}

/// What a `CountingSurface` does with each call.
pub enum Behavior {
    /// Reply with this payload.
    Reply(String),
    /// Fail with this remote status.
    Fail(Status, &'static str),
    /// Sleep, then reply (for deadline tests).
    Delay(Duration, String),
}

/// Call surface that counts invocations and follows one behavior.
pub struct CountingSurface {
    calls: AtomicUsize,
    behavior: Behavior,
}

impl CountingSurface {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallSurface<String, String> for CountingSurface {
    async fn call(&self, _request: String) -> Result<String, CallFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(payload) => Ok(payload.clone()),
            Behavior::Fail(status, detail) => Err(CallFailure::new(*status, *detail)),
            Behavior::Delay(delay, payload) => {
                tokio::time::sleep(*delay).await;
                Ok(payload.clone())
            }
        }
    }
}

/// Factory that always hands out the given surface.
pub fn fixed_surface(surface: Arc<CountingSurface>) -> SurfaceFactory<String, String> {
    Arc::new(move |_channel| Ok(Arc::clone(&surface) as Arc<dyn CallSurface<String, String>>))
}

/// Dependency config tuned for fast tests.
pub fn test_config(name: &str, poll_interval_ms: u64) -> DependencyConfig {
    DependencyConfig {
        name: name.to_string(),
        address: "127.0.0.1:0".to_string(),
        poll_interval_ms,
        call_timeout_ms: 1_000,
        connect_timeout_ms: 200,
        max_poll_backoff_ms: poll_interval_ms * 4,
        stop_grace_ms: 1_000,
    }
}

/// Poll `condition` every few milliseconds until it holds or the deadline
/// passes. Returns whether it held.
pub async fn wait_for(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
