//! Per-dependency log registration.
//!
//! Each manager registers its dependency name here at construction so a
//! host wiring the same dependency twice is flagged once, explicitly,
//! instead of through hidden module-level state.

use dashmap::DashSet;

/// Registry of dependency names that have claimed a log identity.
#[derive(Debug, Default)]
pub struct LogRegistry {
    names: DashSet<String>,
}

impl LogRegistry {
    pub fn new() -> Self {
        Self {
            names: DashSet::new(),
        }
    }

    /// Idempotent membership check: true when `name` was newly registered,
    /// false when it was already present.
    pub fn register(&self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
