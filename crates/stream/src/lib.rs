//! Outbound streaming paths with credit-based flow control.
//!
//! * [`BatchPlan`]: splits a pending cache into full and forced underfull batches
//! * [`OutboundPath`]: per-sink credit, batch ids, accumulative acks, and shutdown
//! * [`DownstreamManager`]: owns paths and their caches, routes upstream acks
//! * [`StreamConfig`]: batch sizing and cache bounds, loadable from TOML

#![warn(missing_docs)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod manager;
pub mod message;
pub mod path;

#[cfg(test)]
pub(crate) mod testing;

pub use config::StreamConfig;
pub use emitter::{BatchPlan, Batches};
pub use error::{ConfigError, PathError, Result};
pub use manager::{DownstreamManager, PathEvent};
pub use message::{Batch, Downstream, DownstreamContent, Upstream, UpstreamContent};
pub use path::{AckOutcome, OutboundPath, PathSnapshot, PathState};
