//! Structured failure reasons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason attached to forced closes and failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FailureReason {
	/// Peer acknowledged a batch that was never emitted.
	#[error("unexpected ack: id {ack_id} exceeds next batch id {next_batch_id}")]
	UnexpectedAck {
		/// Acknowledged id carried by the peer.
		ack_id: i64,
		/// Lowest id not yet emitted on the path.
		next_batch_id: i64,
	},
	/// Handshake carried an invalid slot or arrived twice.
	#[error("invalid stream handshake")]
	InvalidHandshake,
	/// Credit grant was negative or overflowed the credit counter.
	#[error("invalid credit grant: {granted} on top of {open_credit}")]
	CreditOverflow {
		/// Credit currently open on the path.
		open_credit: i32,
		/// Credit the peer tried to grant.
		granted: i32,
	},
	/// Stream closed at the request of its owner.
	#[error("user shutdown")]
	UserShutdown,
	/// Peer became unreachable before the stream finished.
	#[error("peer unreachable")]
	Unreachable,
	/// Application-defined failure.
	#[error("{0}")]
	Other(String),
}

impl FailureReason {
	/// Returns `true` for reasons caused by a peer breaking the stream protocol.
	pub const fn is_protocol_violation(&self) -> bool {
		matches!(self, Self::UnexpectedAck { .. } | Self::InvalidHandshake | Self::CreditOverflow { .. })
	}
}

impl From<String> for FailureReason {
	fn from(msg: String) -> Self {
		Self::Other(msg)
	}
}

impl From<&str> for FailureReason {
	fn from(msg: &str) -> Self {
		Self::Other(msg.to_string())
	}
}
