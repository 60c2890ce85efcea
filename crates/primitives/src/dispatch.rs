//! Fire-and-forget message dispatch.
//!
//! The hosting runtime owns mailboxes and scheduling; this layer only needs a
//! port that enqueues a message for a target actor without blocking. Targets
//! that no longer exist swallow the message silently; surfacing "recipient
//! gone" belongs to whatever supervises the actors.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::handle::{ActorAddr, SinkHandle};

/// Send port injected into paths and response promises.
pub trait Dispatch<M> {
	/// Enqueues `msg` for `to`. Never blocks and never fails.
	fn send(&self, to: &SinkHandle, msg: M);
}

impl<M, D> Dispatch<M> for &D
where
	D: Dispatch<M> + ?Sized,
{
	fn send(&self, to: &SinkHandle, msg: M) {
		(**self).send(to, msg);
	}
}

/// In-process dispatch table mapping actor addresses to unbounded mailboxes.
pub struct LocalDirectory<M> {
	inner: Arc<RwLock<HashMap<ActorAddr, mpsc::UnboundedSender<M>>>>,
}

impl<M> Clone for LocalDirectory<M> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<M> Default for LocalDirectory<M> {
	fn default() -> Self {
		Self {
			inner: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl<M> LocalDirectory<M> {
	/// Creates an empty directory.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a mailbox for `addr`, replacing any previous registration.
	pub fn register(&self, addr: ActorAddr) -> mpsc::UnboundedReceiver<M> {
		let (tx, rx) = mpsc::unbounded_channel();
		if let Ok(mut guard) = self.inner.write() {
			guard.insert(addr, tx);
		}
		rx
	}

	/// Removes the mailbox for `addr`. Returns whether one was registered.
	pub fn unregister(&self, addr: ActorAddr) -> bool {
		self.inner.write().map(|mut guard| guard.remove(&addr).is_some()).unwrap_or(false)
	}

	/// Drops the registration for `addr` if its receiver is gone.
	///
	/// A live mailbox registered under the same address is kept.
	fn prune_closed(&self, addr: ActorAddr) -> bool {
		let Ok(mut guard) = self.inner.write() else {
			return false;
		};
		if guard.get(&addr).is_some_and(|tx| tx.is_closed()) {
			guard.remove(&addr);
			return true;
		}
		false
	}

	/// Returns `true` if `addr` has a live mailbox.
	pub fn contains(&self, addr: ActorAddr) -> bool {
		let Ok(guard) = self.inner.read() else {
			return false;
		};
		guard.get(&addr).is_some_and(|tx| !tx.is_closed())
	}

	/// Number of registered mailboxes.
	pub fn len(&self) -> usize {
		self.inner.read().map(|guard| guard.len()).unwrap_or(0)
	}

	/// Returns `true` if no mailbox is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<M> Dispatch<M> for LocalDirectory<M> {
	fn send(&self, to: &SinkHandle, msg: M) {
		let closed = {
			let Ok(guard) = self.inner.read() else {
				return;
			};
			let Some(tx) = guard.get(&to.addr()) else {
				tracing::trace!(target_actor = %to, "dispatch.drop.unknown");
				return;
			};
			tx.send(msg).is_err()
		};
		if closed {
			tracing::trace!(target_actor = %to, "dispatch.drop.closed");
			self.prune_closed(to.addr());
		}
	}
}
