//! Messages exchanged between an outbound path and its sink.

use egress_primitives::{ActorAddr, FailureReason, StreamSlots};
use serde::{Deserialize, Serialize};

/// One group of items shipped under a single batch id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch<T> {
	/// Batch id, strictly increasing per path.
	pub id: i64,
	/// Logical item count charged against credit.
	pub xs_size: i32,
	/// Payload.
	pub xs: Vec<T>,
}

/// Payload of a source-to-sink message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownstreamContent<T> {
	/// Data batch.
	Batch(Batch<T>),
	/// Graceful end of stream.
	Close,
	/// Abnormal end of stream.
	ForcedClose(FailureReason),
}

/// Source-to-sink message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downstream<T> {
	/// Slots as seen by the source.
	pub slots: StreamSlots,
	/// Address of the emitting actor.
	pub sender: ActorAddr,
	/// Message payload.
	pub content: DownstreamContent<T>,
}

impl<T> Downstream<T> {
	/// Returns the batch carried by this message, if any.
	pub fn batch(&self) -> Option<&Batch<T>> {
		match &self.content {
			DownstreamContent::Batch(batch) => Some(batch),
			_ => None,
		}
	}

	/// Returns `true` for graceful or forced close messages.
	pub fn is_close(&self) -> bool {
		matches!(self.content, DownstreamContent::Close | DownstreamContent::ForcedClose(_))
	}
}

/// Payload of a sink-to-source message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpstreamContent {
	/// Completes the open handshake and grants initial credit.
	AckOpen {
		/// Credit available right after the handshake.
		initial_credit: i32,
		/// Preferred batch size of the sink; non-positive keeps the source default.
		desired_batch_size: i32,
	},
	/// Accumulative acknowledgment plus credit grant.
	AckBatch {
		/// Lowest batch id the sink has not processed yet.
		acknowledged_id: i64,
		/// Additional credit granted.
		new_credit: i32,
	},
	/// Sink leaves the stream gracefully.
	Drop,
	/// Sink leaves the stream with an error.
	ForcedDrop(FailureReason),
}

/// Sink-to-source message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
	/// Slots as seen by the sink: `sender` is the sink slot, `receiver` the source slot.
	pub slots: StreamSlots,
	/// Address of the sink.
	pub sender: ActorAddr,
	/// Message payload.
	pub content: UpstreamContent,
}

impl Upstream {
	/// Builds a handshake acknowledgment.
	pub fn ack_open(slots: StreamSlots, sender: ActorAddr, initial_credit: i32, desired_batch_size: i32) -> Self {
		Self {
			slots,
			sender,
			content: UpstreamContent::AckOpen {
				initial_credit,
				desired_batch_size,
			},
		}
	}

	/// Builds an accumulative batch acknowledgment.
	pub fn ack_batch(slots: StreamSlots, sender: ActorAddr, acknowledged_id: i64, new_credit: i32) -> Self {
		Self {
			slots,
			sender,
			content: UpstreamContent::AckBatch { acknowledged_id, new_credit },
		}
	}
}
