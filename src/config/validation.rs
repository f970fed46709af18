//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Non-empty, unique dependency names
//! - Parseable `host:port` addresses
//! - Non-zero intervals and timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: UplinkConfig → Result<(), Vec<ValidationError>>
//! - Runs before any manager is constructed

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::UplinkConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dependency #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("dependency name '{name}' appears more than once")]
    DuplicateName { name: String },

    #[error("dependency '{name}' has invalid address '{address}'")]
    InvalidAddress { name: String, address: String },

    #[error("dependency '{name}': {field} must be greater than zero")]
    ZeroDuration { name: String, field: &'static str },
}

/// True when `address` looks like `host:port` with a valid port.
fn address_is_plausible(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &UplinkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, dep) in config.dependencies.iter().enumerate() {
        if dep.name.is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(dep.name.clone()) {
            errors.push(ValidationError::DuplicateName {
                name: dep.name.clone(),
            });
        }

        if !address_is_plausible(&dep.address) {
            errors.push(ValidationError::InvalidAddress {
                name: dep.name.clone(),
                address: dep.address.clone(),
            });
        }

        for (value, field) in [
            (dep.poll_interval_ms, "poll_interval_ms"),
            (dep.call_timeout_ms, "call_timeout_ms"),
            (dep.connect_timeout_ms, "connect_timeout_ms"),
            (dep.stop_grace_ms, "stop_grace_ms"),
        ] {
            if value == 0 {
                errors.push(ValidationError::ZeroDuration {
                    name: dep.name.clone(),
                    field,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
