//! Ownership of outbound paths and their pending caches.
//!
//! The manager admits new items per path, routes upstream messages to the
//! matching path, and removes paths once they are closing, clean, and have
//! nothing left to ship. Protocol violations abort the offending path and are
//! returned to the caller; they are never retried here.

use std::collections::BTreeMap;

use egress_primitives::{ActorAddr, Dispatch, FailureReason, SinkRef, StreamSlot};

use crate::config::StreamConfig;
use crate::error::{PathError, Result};
use crate::message::{Downstream, Upstream, UpstreamContent};
use crate::path::{OutboundPath, PathSnapshot};

/// What happened to a path after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
	/// The path is still registered.
	Retained,
	/// The path was removed.
	Removed,
}

struct Entry<T> {
	path: OutboundPath,
	cache: Vec<T>,
	/// Close or forced close already sent.
	farewell_sent: bool,
}

/// Owner of every outbound path of one source actor.
pub struct DownstreamManager<T> {
	self_addr: ActorAddr,
	config: StreamConfig,
	next_slot: u16,
	paths: BTreeMap<StreamSlot, Entry<T>>,
}

impl<T> DownstreamManager<T> {
	/// Creates a manager for the actor at `self_addr`.
	///
	/// # Panics
	///
	/// Panics if `config` does not pass [`StreamConfig::validate`].
	pub fn new(self_addr: ActorAddr, config: StreamConfig) -> Self {
		if let Err(err) = config.validate() {
			panic!("invalid stream config: {err}");
		}
		Self {
			self_addr,
			config,
			next_slot: 1,
			paths: BTreeMap::new(),
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &StreamConfig {
		&self.config
	}

	/// Registers a pending path to `hdl` and returns its sender slot.
	pub fn add_path(&mut self, hdl: impl Into<SinkRef>) -> Result<StreamSlot> {
		let slot = self.allocate_slot()?;
		let mut path = OutboundPath::new(slot, self.self_addr, hdl);
		path.set_desired_batch_size(self.config.default_batch_size);
		tracing::debug!(slot = %slot, sink = %path.sink(), "stream.manager.add_path");
		self.paths.insert(
			slot,
			Entry {
				path,
				cache: Vec::new(),
				farewell_sent: false,
			},
		);
		Ok(slot)
	}

	/// Buffers `items` for the path at `slot`.
	///
	/// Closing paths admit nothing new; already buffered items still drain.
	pub fn push(&mut self, slot: StreamSlot, items: impl IntoIterator<Item = T>) -> Result<()> {
		let limit = self.config.max_cache_len;
		let entry = self.paths.get_mut(&slot).ok_or(PathError::UnknownPath(slot))?;
		if entry.path.closing() {
			return Err(PathError::Closing(slot));
		}
		let items: Vec<T> = items.into_iter().collect();
		if entry.cache.len() + items.len() > limit {
			return Err(PathError::CacheFull { slot, limit });
		}
		entry.cache.extend(items);
		Ok(())
	}

	/// Ships whatever credit allows on every path and returns the batch count.
	///
	/// Closing paths always flush their underfull remainder.
	pub fn emit_batches(&mut self, dispatch: &impl Dispatch<Downstream<T>>, force_underfull: bool) -> usize {
		self.paths
			.values_mut()
			.map(|entry| {
				let force = force_underfull || entry.path.closing();
				entry.path.emit_batches(dispatch, &mut entry.cache, force)
			})
			.sum()
	}

	/// Routes one sink-to-source message.
	///
	/// On a protocol violation the path is aborted with the violation as
	/// reason, removed, and the error is returned. Unlike [`abort`](Self::abort)
	/// the path does not wait to become clean: a sink that breaks the protocol
	/// cannot be trusted to acknowledge the batches still in flight, so waiting
	/// could keep the path registered forever.
	pub fn handle_upstream(&mut self, dispatch: &impl Dispatch<Downstream<T>>, msg: Upstream) -> Result<PathEvent> {
		let slot = msg.slots.receiver;
		if !self.paths.contains_key(&slot) {
			return Err(PathError::UnknownPath(slot));
		}
		let applied = match msg.content {
			UpstreamContent::Drop => {
				tracing::debug!(slot = %slot, sink = %msg.sender, "stream.manager.sink_drop");
				self.paths.remove(&slot);
				return Ok(PathEvent::Removed);
			}
			UpstreamContent::ForcedDrop(reason) => {
				tracing::warn!(slot = %slot, sink = %msg.sender, %reason, "stream.manager.sink_forced_drop");
				self.paths.remove(&slot);
				return Ok(PathEvent::Removed);
			}
			UpstreamContent::AckOpen {
				initial_credit,
				desired_batch_size,
			} => {
				let batch_size = if desired_batch_size > 0 {
					desired_batch_size
				} else {
					self.config.default_batch_size
				};
				self.entry_mut(slot)?.path.handle_ack_open(msg.slots.sender, initial_credit, batch_size)
			}
			UpstreamContent::AckBatch { acknowledged_id, new_credit } => {
				self.entry_mut(slot)?.path.handle_ack_batch(acknowledged_id, new_credit).map(|_| ())
			}
		};
		if let Err(err) = applied {
			if let Some(mut entry) = self.paths.remove(&slot)
				&& let Some(reason) = err.protocol_reason()
			{
				entry.path.emit_irregular_shutdown(dispatch, reason.clone());
			}
			return Err(err);
		}
		Ok(self.advance(dispatch, slot))
	}

	/// Gracefully shuts down the path at `slot`.
	///
	/// Buffered items are flushed as credit allows (underfull batches
	/// included) and the close is sent once the path is clean and drained.
	/// A pending path is torn down at once with a forced close.
	pub fn close(&mut self, dispatch: &impl Dispatch<Downstream<T>>, slot: StreamSlot) -> Result<PathEvent> {
		let entry = self.entry_mut(slot)?;
		if entry.path.pending() {
			self.discard_pending(dispatch, slot, FailureReason::UserShutdown);
			return Ok(PathEvent::Removed);
		}
		entry.path.mark_closing();
		entry.path.emit_batches(dispatch, &mut entry.cache, true);
		Ok(self.try_remove(dispatch, slot))
	}

	/// Aborts the path at `slot` with `reason`.
	///
	/// Unshipped items are dropped; the path stays registered until every
	/// emitted batch is acknowledged.
	pub fn abort(&mut self, dispatch: &impl Dispatch<Downstream<T>>, slot: StreamSlot, reason: FailureReason) -> Result<PathEvent> {
		let entry = self.entry_mut(slot)?;
		if entry.path.pending() {
			self.discard_pending(dispatch, slot, reason);
			return Ok(PathEvent::Removed);
		}
		entry.path.emit_irregular_shutdown(dispatch, reason);
		entry.farewell_sent = true;
		entry.cache.clear();
		Ok(self.try_remove(dispatch, slot))
	}

	/// Drops the path at `slot` without notifying its sink.
	pub fn remove(&mut self, slot: StreamSlot) -> Option<OutboundPath> {
		self.paths.remove(&slot).map(|entry| entry.path)
	}

	/// Path registered under `slot`.
	pub fn path(&self, slot: StreamSlot) -> Option<&OutboundPath> {
		self.paths.get(&slot).map(|entry| &entry.path)
	}

	/// Number of unshipped items buffered for `slot`.
	pub fn cache_len(&self, slot: StreamSlot) -> Option<usize> {
		self.paths.get(&slot).map(|entry| entry.cache.len())
	}

	/// All registered paths, ordered by slot.
	pub fn paths(&self) -> impl Iterator<Item = &OutboundPath> {
		self.paths.values().map(|entry| &entry.path)
	}

	/// Diagnostic snapshots of all paths, ordered by slot.
	pub fn snapshots(&self) -> Vec<PathSnapshot> {
		self.paths().map(OutboundPath::snapshot).collect()
	}

	/// Number of registered paths.
	pub fn len(&self) -> usize {
		self.paths.len()
	}

	/// Returns `true` if no path is registered.
	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	fn entry_mut(&mut self, slot: StreamSlot) -> Result<&mut Entry<T>> {
		self.paths.get_mut(&slot).ok_or(PathError::UnknownPath(slot))
	}

	fn allocate_slot(&mut self) -> Result<StreamSlot> {
		for _ in 0..u16::MAX {
			let candidate = StreamSlot(self.next_slot);
			self.next_slot = self.next_slot.checked_add(1).unwrap_or(1);
			if !self.paths.contains_key(&candidate) {
				return Ok(candidate);
			}
		}
		Err(PathError::SlotsExhausted)
	}

	fn advance(&mut self, dispatch: &impl Dispatch<Downstream<T>>, slot: StreamSlot) -> PathEvent {
		let Some(entry) = self.paths.get_mut(&slot) else {
			return PathEvent::Removed;
		};
		let force = entry.path.closing();
		entry.path.emit_batches(dispatch, &mut entry.cache, force);
		self.try_remove(dispatch, slot)
	}

	fn try_remove(&mut self, dispatch: &impl Dispatch<Downstream<T>>, slot: StreamSlot) -> PathEvent {
		let Some(entry) = self.paths.get_mut(&slot) else {
			return PathEvent::Removed;
		};
		if !entry.path.removable() || !entry.cache.is_empty() {
			return PathEvent::Retained;
		}
		if !entry.farewell_sent {
			entry.path.emit_regular_shutdown(dispatch);
		}
		self.paths.remove(&slot);
		tracing::debug!(slot = %slot, "stream.manager.remove");
		PathEvent::Removed
	}

	fn discard_pending(&mut self, dispatch: &impl Dispatch<Downstream<T>>, slot: StreamSlot, reason: FailureReason) {
		let Some(entry) = self.paths.remove(&slot) else {
			return;
		};
		let path = entry.path;
		OutboundPath::emit_irregular_shutdown_to(dispatch, path.slots(), self.self_addr, path.sink(), reason);
	}
}

#[cfg(test)]
mod tests;
