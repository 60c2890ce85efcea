use std::cell::RefCell;

use egress_primitives::{ActorAddr, Dispatch, SinkHandle};

use crate::message::{Batch, Downstream, DownstreamContent};

/// Dispatch stub recording every message in send order.
pub(crate) struct Recorder<T> {
	sent: RefCell<Vec<(ActorAddr, Downstream<T>)>>,
}

impl<T> Recorder<T> {
	pub(crate) fn new() -> Self {
		Self { sent: RefCell::new(Vec::new()) }
	}

	pub(crate) fn take(&self) -> Vec<(ActorAddr, Downstream<T>)> {
		std::mem::take(&mut *self.sent.borrow_mut())
	}

	pub(crate) fn len(&self) -> usize {
		self.sent.borrow().len()
	}

	pub(crate) fn batch_sizes(&self) -> Vec<i32> {
		self.sent.borrow().iter().filter_map(|(_, msg)| msg.batch().map(|b| b.xs_size)).collect()
	}

	pub(crate) fn batch_ids(&self) -> Vec<i64> {
		self.sent.borrow().iter().filter_map(|(_, msg)| msg.batch().map(|b| b.id)).collect()
	}
}

impl<T: Clone> Recorder<T> {
	pub(crate) fn batches(&self) -> Vec<Batch<T>> {
		self.sent
			.borrow()
			.iter()
			.filter_map(|(_, msg)| match &msg.content {
				DownstreamContent::Batch(b) => Some(b.clone()),
				_ => None,
			})
			.collect()
	}
}

impl<T> Dispatch<Downstream<T>> for Recorder<T> {
	fn send(&self, to: &SinkHandle, msg: Downstream<T>) {
		self.sent.borrow_mut().push((to.addr(), msg));
	}
}
