//! Configuration schema, loading, and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DependencyConfig, ObservabilityConfig, UplinkConfig};
pub use validation::{validate_config, ValidationError};
