//! Error types for stream paths and their configuration.

use egress_primitives::{FailureReason, StreamSlot};
use thiserror::Error;

/// Errors raised while driving outbound paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// The sink broke the stream protocol. Fatal to the path.
	#[error("protocol violation: {0}")]
	Protocol(FailureReason),

	/// The path is closing and admits no new items.
	#[error("path {0} is closing")]
	Closing(StreamSlot),

	/// Admitting the items would exceed the per-path cache bound.
	#[error("cache for path {slot} is full ({limit} items)")]
	CacheFull {
		/// Sender slot of the path.
		slot: StreamSlot,
		/// Configured cache bound.
		limit: usize,
	},

	/// No path is registered under this slot.
	#[error("unknown path {0}")]
	UnknownPath(StreamSlot),

	/// Every sender slot is in use.
	#[error("no free stream slot")]
	SlotsExhausted,
}

impl PathError {
	/// Returns the failure reason when this is a protocol violation.
	pub fn protocol_reason(&self) -> Option<&FailureReason> {
		match self {
			Self::Protocol(reason) => Some(reason),
			_ => None,
		}
	}
}

impl From<FailureReason> for PathError {
	fn from(reason: FailureReason) -> Self {
		Self::Protocol(reason)
	}
}

/// Result type for path operations.
pub type Result<T> = std::result::Result<T, PathError>;

/// Errors that can occur when loading stream configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Batch size must be positive.
	#[error("invalid default_batch_size {0} (expected > 0)")]
	InvalidBatchSize(i32),

	/// Cache bound must be positive and fit the 32-bit item counter.
	#[error("invalid max_cache_len {0} (expected 1..=2147483647)")]
	InvalidCacheLen(usize),
}
