//! Dependency health state machine.
//!
//! # States
//! - Unknown: no poll has completed yet (the only legal initial state)
//! - Healthy: last observation saw the backend reachable
//! - Unhealthy: last observation saw the backend unreachable
//!
//! # State Transitions
//! ```text
//! Unknown   → Healthy | Unhealthy: first completed poll
//! Healthy   → Unhealthy: poll observes not-ready, or a dispatch hits a
//!                        transient remote failure
//! Unhealthy → Healthy: poll observes ready (only the monitor upgrades)
//! ```
//!
//! # Design Decisions
//! - Edge-triggered: a poll that observes the current state is a no-op
//! - Writers perform a single atomic store, never read-modify-write
//! - Staleness of up to one poll interval is accepted

use std::sync::atomic::{AtomicU8, Ordering};

/// Reachability of one backend dependency.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Unknown => write!(f, "unknown"),
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Shared health flag for one dependency.
///
/// Two writers (monitor and dispatcher), many readers. Every write is a
/// plain atomic replacement, so any interleaving yields a legal value.
#[derive(Debug)]
pub struct HealthCell {
    state: AtomicU8,
}

impl HealthCell {
    /// Create a cell in the Unknown state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(HealthState::Unknown as u8),
        }
    }

    /// Read the current state.
    pub fn get(&self) -> HealthState {
        self.state.load(Ordering::Relaxed).into()
    }

    /// Replace the current state.
    pub fn set(&self, state: HealthState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    /// Return to the Unknown state (manager start/stop).
    pub fn reset(&self) {
        self.set(HealthState::Unknown);
    }

    /// True only when the last observation saw the backend reachable.
    pub fn is_healthy(&self) -> bool {
        self.get() == HealthState::Healthy
    }
}

impl Default for HealthCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether an observed readiness signal changes the current state.
///
/// Returns the state to transition to, or `None` when the observation
/// matches the current state (no transition, no log). Unknown always
/// resolves on the first completed observation.
pub fn transition(current: HealthState, ready: bool) -> Option<HealthState> {
    let target = if ready {
        HealthState::Healthy
    } else {
        HealthState::Unhealthy
    };
    if target == current {
        None
    } else {
        Some(target)
    }
}
