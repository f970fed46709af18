//! Logging, metrics, and the per-dependency log registry.

pub mod logging;
pub mod metrics;
pub mod registry;

pub use registry::LogRegistry;
