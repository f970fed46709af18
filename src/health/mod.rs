//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Background polling (monitor.rs):
//!     Sleep one poll interval
//!     → Channel::connectivity(try_reconnect = true)
//!     → transition() in state.rs
//!     → log + store on change, silence on steady state
//!
//! Dispatch failures (dispatch module):
//!     Transient remote status observed
//!     → store Unhealthy directly, ahead of the next poll
//!
//! State cell (state.rs):
//!     Unknown → Healthy ←→ Unhealthy
//!     AtomicU8, plain replacement writes
//! ```
//!
//! # Design Decisions
//! - Edge-triggered logging only; steady state stays quiet
//! - Probe errors back off (doubling, capped) but never end the loop
//! - State is per-dependency; managers share nothing

pub mod monitor;
pub mod state;

pub use monitor::{HealthMonitor, MonitorSettings, PollSchedule};
pub use state::{transition, HealthCell, HealthState};
