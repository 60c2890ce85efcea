//! Computed results and the reply message carrying them.

use egress_primitives::FailureReason;
use serde::{Deserialize, Serialize};

use crate::id::MessageId;

/// Result payloads that may carry no information.
pub trait ResponsePayload {
	/// Returns `true` if the payload is empty.
	fn is_empty(&self) -> bool;
}

impl ResponsePayload for () {
	fn is_empty(&self) -> bool {
		true
	}
}

impl<T> ResponsePayload for Vec<T> {
	fn is_empty(&self) -> bool {
		Vec::is_empty(self)
	}
}

impl ResponsePayload for String {
	fn is_empty(&self) -> bool {
		String::is_empty(self)
	}
}

impl<T> ResponsePayload for Option<T> {
	fn is_empty(&self) -> bool {
		self.is_none()
	}
}

/// Outcome of handling one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome<M> {
	/// Handling failed.
	Failure(FailureReason),
	/// Handling produced a (possibly empty) result.
	Message(M),
}

impl<M> DeliveryOutcome<M> {
	/// Returns `true` for failures.
	pub fn is_failure(&self) -> bool {
		matches!(self, Self::Failure(_))
	}
}

impl<M> From<Result<M, FailureReason>> for DeliveryOutcome<M> {
	fn from(result: Result<M, FailureReason>) -> Self {
		match result {
			Ok(msg) => Self::Message(msg),
			Err(reason) => Self::Failure(reason),
		}
	}
}

/// Reply sent to a requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<M> {
	/// Response id matching the original request.
	pub id: MessageId,
	/// Delivered outcome.
	pub content: DeliveryOutcome<M>,
}
