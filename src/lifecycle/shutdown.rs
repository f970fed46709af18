//! Cancellation signal for a manager's background task.

use tokio::sync::broadcast;

/// Cooperative cancellation handle, one per connection manager.
///
/// The monitor task subscribes at spawn time and observes the signal at
/// its next suspension point; `stop()` triggers it exactly once.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe before spawning the task that should observe the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger cancellation. Safe to call with no live subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
