//! Message identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a message expects to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
	/// Fire-and-forget; the sender is not blocked on a reply.
	Async,
	/// Awaited request; the sender expects exactly one reply.
	Request,
	/// Reply to an earlier request.
	Response,
}

/// Identifier correlating requests with their responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId {
	value: u64,
	kind: MessageKind,
}

impl MessageId {
	/// Identifier of an asynchronous message.
	pub const fn asynchronous(value: u64) -> Self {
		Self {
			value,
			kind: MessageKind::Async,
		}
	}

	/// Identifier of an awaited request.
	pub const fn request(value: u64) -> Self {
		Self {
			value,
			kind: MessageKind::Request,
		}
	}

	/// Identifier the reply to this message carries.
	#[must_use]
	pub const fn response_id(self) -> Self {
		Self {
			value: self.value,
			kind: MessageKind::Response,
		}
	}

	/// Correlation value.
	pub const fn value(self) -> u64 {
		self.value
	}

	/// Message kind.
	pub const fn kind(self) -> MessageKind {
		self.kind
	}

	/// Returns `true` for fire-and-forget messages.
	pub const fn is_async(self) -> bool {
		matches!(self.kind, MessageKind::Async)
	}

	/// Returns `true` for awaited requests.
	pub const fn is_request(self) -> bool {
		matches!(self.kind, MessageKind::Request)
	}

	/// Returns `true` for replies.
	pub const fn is_response(self) -> bool {
		matches!(self.kind, MessageKind::Response)
	}
}

impl fmt::Display for MessageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tag = match self.kind {
			MessageKind::Async => "async",
			MessageKind::Request => "req",
			MessageKind::Response => "resp",
		};
		write!(f, "{tag}#{}", self.value)
	}
}
