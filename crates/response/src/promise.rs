//! Response promises.

use egress_primitives::{Dispatch, SinkRef};

use crate::id::MessageId;
use crate::outcome::{DeliveryOutcome, Response};

/// The request an actor is currently processing.
#[derive(Debug)]
pub struct RequestContext {
	sender: Option<SinkRef>,
	id: MessageId,
}

impl RequestContext {
	/// Creates a context for a request from `sender` (if it has a return address).
	pub fn new(sender: Option<SinkRef>, id: MessageId) -> Self {
		Self { sender, id }
	}

	/// Creates a context for a request without return address.
	pub fn anonymous(id: MessageId) -> Self {
		Self::new(None, id)
	}

	/// Identifier of the current request.
	pub fn id(&self) -> MessageId {
		self.id
	}

	/// Returns `true` until a pending promise has been handed out.
	pub fn awaiting_answer(&self) -> bool {
		self.sender.is_some() && !self.id.is_response()
	}

	/// Hands out the promise for the current request.
	///
	/// Only the first call yields a pending promise; later calls, anonymous
	/// requests, and replies yield one that is already settled.
	pub fn make_response_promise(&mut self) -> ResponsePromise {
		let target = if self.id.is_response() { None } else { self.sender.take() };
		ResponsePromise { target, id: self.id }
	}
}

/// Single-use obligation to answer one request.
#[derive(Debug)]
#[must_use = "an unanswered promise leaves its requester waiting"]
pub struct ResponsePromise {
	target: Option<SinkRef>,
	id: MessageId,
}

impl ResponsePromise {
	/// Returns `true` if someone is waiting for this answer.
	pub fn pending(&self) -> bool {
		self.target.is_some()
	}

	/// Returns `true` if the request was fire-and-forget.
	pub fn is_async(&self) -> bool {
		self.id.is_async()
	}

	/// Identifier of the request this promise answers.
	pub fn id(&self) -> MessageId {
		self.id
	}

	/// Sends `outcome` to the requester. Returns `false` if the promise was
	/// not pending, in which case nothing is sent.
	pub fn deliver<M>(self, dispatch: &impl Dispatch<Response<M>>, outcome: DeliveryOutcome<M>) -> bool {
		let Some(target) = self.target else {
			return false;
		};
		dispatch.send(
			&target,
			Response {
				id: self.id.response_id(),
				content: outcome,
			},
		);
		true
	}
}
