//! Client-side connection management for backend microservice dependencies.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!                 │              CONNECTION MANAGER               │
//!                 │                                               │
//!   Service layer │  ┌──────────┐      ┌─────────────────────┐    │
//!   ──dispatch────┼─▶│dispatcher│─────▶│     call surface    │────┼──▶ Backend
//!                 │  └────┬─────┘      └─────────────────────┘    │    microservice
//!                 │       │ admission            │ bound to       │
//!                 │       ▼ check                ▼                │
//!                 │  ┌──────────┐      ┌─────────────────────┐    │
//!   ──is_healthy──┼─▶│  health  │◀─────│       channel       │◀───┼──── connectivity
//!                 │  │   cell   │ poll └─────────────────────┘    │      probes
//!                 │  └──────────┘   ▲                             │
//!                 │                 └── health monitor (task)     │
//!                 └───────────────────────────────────────────────┘
//! ```
//!
//! One manager per backend dependency. `start()` opens the channel, builds
//! the typed call surface, and spawns the monitor; `dispatch()` is gated on
//! the last observed health; `stop()` cancels the monitor and closes the
//! channel exactly once.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod lifecycle;
pub mod manager;
pub mod observability;

pub use channel::{
    http_surface, CallFailure, CallSurface, Channel, ChannelError, Connector, Status,
    SurfaceFactory, TcpConnector,
};
pub use config::{load_config, DependencyConfig, UplinkConfig};
pub use dispatch::{DispatchError, Dispatcher};
pub use health::{HealthCell, HealthState};
pub use lifecycle::Shutdown;
pub use manager::{ConnectionManager, StartError};
pub use observability::LogRegistry;
