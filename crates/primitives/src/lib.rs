//! Shared primitives for the egress delivery subsystem.
//!
//! * [`StreamSlot`] / [`StreamSlots`]: endpoint identifiers for one data path
//! * [`SinkHandle`] / [`SinkRef`]: single-owner and explicitly shared actor handles
//! * [`FailureReason`]: structured reason carried by forced closes and failed responses
//! * [`Dispatch`]: fire-and-forget send port injected by the hosting runtime

#![warn(missing_docs)]

pub mod dispatch;
pub mod handle;
pub mod reason;
pub mod slot;

pub use dispatch::{Dispatch, LocalDirectory};
pub use handle::{ActorAddr, SharedSink, SinkHandle, SinkRef};
pub use reason::FailureReason;
pub use slot::{StreamSlot, StreamSlots};
