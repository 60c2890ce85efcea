//! State of one outbound path to a sink.
//!
//! A path starts pending, opens once the sink acknowledges the handshake with
//! a valid receiver slot, and ends up closing after a graceful or irregular
//! shutdown. The owning manager removes it once it is closing and clean;
//! removal itself is not modeled here.

use egress_primitives::{ActorAddr, Dispatch, FailureReason, SinkHandle, SinkRef, StreamSlot, StreamSlots};
use serde::Serialize;

use crate::config::StreamConfig;
use crate::emitter::BatchPlan;
use crate::error::{PathError, Result};
use crate::message::{Batch, Downstream, DownstreamContent};

/// Lifecycle phase of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathState {
	/// Handshake not acknowledged yet; emission is a no-op.
	Pending,
	/// Batches flow as credit allows.
	Open,
	/// Marked for shutdown; buffered items still drain.
	Closing,
}

/// Effect of one accumulative acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
	/// Ack id and credit were applied.
	Advanced,
	/// Ack id was below the current watermark and was ignored.
	Stale,
}

/// Serializable view of a path for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSnapshot {
	/// Slot pair.
	pub slots: StreamSlots,
	/// Sink address.
	pub sink: ActorAddr,
	/// Sink label.
	pub sink_label: String,
	/// Lifecycle phase.
	pub state: PathState,
	/// Id of the next batch.
	pub next_batch_id: i64,
	/// Remaining credit.
	pub open_credit: i32,
	/// Full batch size.
	pub desired_batch_size: i32,
	/// Lowest unacknowledged id.
	pub next_ack_id: i64,
}

/// Flow-control state for a single sink.
#[derive(Debug)]
pub struct OutboundPath {
	slots: StreamSlots,
	sender: ActorAddr,
	hdl: SinkRef,
	next_batch_id: i64,
	open_credit: i32,
	desired_batch_size: i32,
	/// Lowest batch id not acknowledged yet. Acks are accumulative, so an ack
	/// for `k` covers every id below `k`.
	next_ack_id: i64,
	closing: bool,
}

impl OutboundPath {
	/// Creates a pending path from `sender` (the owning actor) to `hdl`.
	pub fn new(sender_slot: StreamSlot, sender: ActorAddr, hdl: impl Into<SinkRef>) -> Self {
		Self {
			slots: StreamSlots::unbound(sender_slot),
			sender,
			hdl: hdl.into(),
			next_batch_id: 0,
			open_credit: 0,
			desired_batch_size: StreamConfig::DEFAULT_BATCH_SIZE,
			next_ack_id: 0,
			closing: false,
		}
	}

	/// Completes the open handshake.
	///
	/// A non-positive `desired_batch_size` keeps the current batch size.
	pub fn handle_ack_open(&mut self, receiver_slot: StreamSlot, initial_credit: i32, desired_batch_size: i32) -> Result<()> {
		if !self.pending() || !receiver_slot.is_valid() {
			return Err(self.violation(FailureReason::InvalidHandshake));
		}
		if initial_credit < 0 {
			return Err(self.violation(FailureReason::CreditOverflow {
				open_credit: self.open_credit,
				granted: initial_credit,
			}));
		}
		self.slots.receiver = receiver_slot;
		self.open_credit = initial_credit;
		if desired_batch_size > 0 {
			self.desired_batch_size = desired_batch_size;
		}
		tracing::debug!(
			slots = %self.slots,
			sink = %self.sink(),
			credit = self.open_credit,
			batch_size = self.desired_batch_size,
			"stream.path.open"
		);
		Ok(())
	}

	/// Applies an accumulative acknowledgment and its credit grant.
	///
	/// Stale acks (below the current watermark) change nothing, credit included.
	/// Acks beyond the last emitted batch, acks on a pending path, and grants
	/// that are negative or overflow the credit counter are protocol violations;
	/// the path is left untouched and the caller is expected to abort it.
	pub fn handle_ack_batch(&mut self, acknowledged_id: i64, new_credit: i32) -> Result<AckOutcome> {
		if self.pending() {
			return Err(self.violation(FailureReason::InvalidHandshake));
		}
		if acknowledged_id > self.next_batch_id {
			return Err(self.violation(FailureReason::UnexpectedAck {
				ack_id: acknowledged_id,
				next_batch_id: self.next_batch_id,
			}));
		}
		if acknowledged_id < self.next_ack_id {
			tracing::trace!(slots = %self.slots, ack = acknowledged_id, watermark = self.next_ack_id, "stream.path.stale_ack");
			return Ok(AckOutcome::Stale);
		}
		let credit = if new_credit < 0 { None } else { self.open_credit.checked_add(new_credit) };
		let Some(credit) = credit else {
			return Err(self.violation(FailureReason::CreditOverflow {
				open_credit: self.open_credit,
				granted: new_credit,
			}));
		};
		self.next_ack_id = acknowledged_id;
		self.open_credit = credit;
		Ok(AckOutcome::Advanced)
	}

	/// Sends one batch of `xs_size` logical items, then charges credit and
	/// advances the batch id. No-op on pending paths.
	///
	/// # Panics
	///
	/// Panics if `xs_size` is negative or exceeds the open credit.
	pub fn emit_batch<T>(&mut self, dispatch: &impl Dispatch<Downstream<T>>, xs_size: i32, xs: Vec<T>) {
		if self.pending() {
			return;
		}
		assert!(
			(0..=self.open_credit).contains(&xs_size),
			"batch of {xs_size} items exceeds open credit {}",
			self.open_credit
		);
		let id = self.next_batch_id;
		tracing::trace!(slots = %self.slots, batch = id, size = xs_size, "stream.path.emit_batch");
		dispatch.send(
			&self.hdl,
			Downstream {
				slots: self.slots,
				sender: self.sender,
				content: DownstreamContent::Batch(Batch { id, xs_size, xs }),
			},
		);
		self.open_credit -= xs_size;
		self.next_batch_id += 1;
	}

	/// Ships as many batches from the front of `cache` as credit allows and
	/// returns how many were sent.
	///
	/// Full batches of `desired_batch_size` ship first; the remainder of the
	/// credit-covered region ships as one underfull batch only when
	/// `force_underfull` is set. Shipped items leave `cache`; everything else
	/// stays in order. Pending paths leave `cache` untouched.
	///
	/// # Panics
	///
	/// See [`BatchPlan::new`].
	pub fn emit_batches<T>(&mut self, dispatch: &impl Dispatch<Downstream<T>>, cache: &mut Vec<T>, force_underfull: bool) -> usize {
		if self.pending() {
			return 0;
		}
		let plan = BatchPlan::new(cache.len(), self.open_credit, self.desired_batch_size, force_underfull);
		if plan.is_empty() {
			return 0;
		}
		for (size, xs) in plan.drain(cache) {
			self.emit_batch(dispatch, size, xs);
		}
		plan.batch_count()
	}

	/// Sends a graceful close and marks the path closing.
	pub fn emit_regular_shutdown<T>(&mut self, dispatch: &impl Dispatch<Downstream<T>>) {
		tracing::debug!(slots = %self.slots, sink = %self.sink(), "stream.path.close");
		dispatch.send(
			&self.hdl,
			Downstream {
				slots: self.slots,
				sender: self.sender,
				content: DownstreamContent::Close,
			},
		);
		self.closing = true;
	}

	/// Sends a forced close carrying `reason` and marks the path closing.
	pub fn emit_irregular_shutdown<T>(&mut self, dispatch: &impl Dispatch<Downstream<T>>, reason: FailureReason) {
		send_forced_close(dispatch, self.slots, self.sender, &self.hdl, reason);
		self.closing = true;
	}

	/// Sends a forced close to `hdl` without a live path, e.g. when a handshake
	/// never completed.
	pub fn emit_irregular_shutdown_to<T>(
		dispatch: &impl Dispatch<Downstream<T>>,
		slots: StreamSlots,
		sender: ActorAddr,
		hdl: &SinkHandle,
		reason: FailureReason,
	) {
		send_forced_close(dispatch, slots, sender, hdl, reason);
	}

	/// Marks the path closing without notifying the sink.
	pub fn mark_closing(&mut self) {
		self.closing = true;
	}

	/// Updates the batch size announced by the sink.
	pub fn set_desired_batch_size(&mut self, value: i32) {
		if value == self.desired_batch_size {
			return;
		}
		tracing::trace!(slots = %self.slots, from = self.desired_batch_size, to = value, "stream.path.batch_size");
		self.desired_batch_size = value;
	}

	/// Returns `true` until the handshake completes.
	pub fn pending(&self) -> bool {
		self.slots.pending()
	}

	/// Returns `true` if every emitted batch has been acknowledged.
	pub fn clean(&self) -> bool {
		self.next_batch_id == self.next_ack_id
	}

	/// Returns `true` once the path is marked for shutdown.
	pub fn closing(&self) -> bool {
		self.closing
	}

	/// Returns `true` when the owner may drop this path.
	pub fn removable(&self) -> bool {
		self.closing && self.clean()
	}

	/// Current lifecycle phase.
	pub fn state(&self) -> PathState {
		if self.closing {
			PathState::Closing
		} else if self.pending() {
			PathState::Pending
		} else {
			PathState::Open
		}
	}

	/// Slot pair of this path.
	pub fn slots(&self) -> StreamSlots {
		self.slots
	}

	/// Address of the owning actor.
	pub fn sender(&self) -> ActorAddr {
		self.sender
	}

	/// Handle of the sink.
	pub fn sink(&self) -> &SinkHandle {
		&self.hdl
	}

	/// Id the next emitted batch receives.
	pub fn next_batch_id(&self) -> i64 {
		self.next_batch_id
	}

	/// Credit left before the sink must grant more.
	pub fn open_credit(&self) -> i32 {
		self.open_credit
	}

	/// Size of full batches.
	pub fn desired_batch_size(&self) -> i32 {
		self.desired_batch_size
	}

	/// Lowest unacknowledged batch id.
	pub fn next_ack_id(&self) -> i64 {
		self.next_ack_id
	}

	/// Captures the current state.
	pub fn snapshot(&self) -> PathSnapshot {
		PathSnapshot {
			slots: self.slots,
			sink: self.hdl.addr(),
			sink_label: self.hdl.label().to_string(),
			state: self.state(),
			next_batch_id: self.next_batch_id,
			open_credit: self.open_credit,
			desired_batch_size: self.desired_batch_size,
			next_ack_id: self.next_ack_id,
		}
	}

	fn violation(&self, reason: FailureReason) -> PathError {
		tracing::warn!(slots = %self.slots, sink = %self.sink(), %reason, "stream.path.protocol_violation");
		PathError::Protocol(reason)
	}
}

fn send_forced_close<T>(dispatch: &impl Dispatch<Downstream<T>>, slots: StreamSlots, sender: ActorAddr, hdl: &SinkHandle, reason: FailureReason) {
	tracing::debug!(%slots, sink = %hdl, %reason, "stream.path.forced_close");
	dispatch.send(
		hdl,
		Downstream {
			slots,
			sender,
			content: DownstreamContent::ForcedClose(reason),
		},
	);
}
