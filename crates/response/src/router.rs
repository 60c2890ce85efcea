//! Routing of computed results to response promises.
//!
//! Failures always reach a pending requester. Empty results are dropped for
//! fire-and-forget requests, whose senders already moved on, but still sent
//! to awaited requests so the requester is unblocked.

use egress_primitives::Dispatch;

use crate::outcome::{DeliveryOutcome, Response, ResponsePayload};
use crate::promise::RequestContext;

/// Why a result was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
	/// Request already answered or had no return address.
	NotPending,
	/// Empty result for a fire-and-forget request.
	EmptyAsync,
}

/// Result of routing one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
	/// Exactly one response was sent.
	Delivered,
	/// Nothing was sent. Not an error.
	Suppressed(Suppression),
}

/// Delivers `outcome` for the request in `ctx`, unless nobody listens for it.
pub fn route_result<M>(ctx: &mut RequestContext, dispatch: &impl Dispatch<Response<M>>, outcome: DeliveryOutcome<M>) -> Routed
where
	M: ResponsePayload,
{
	let promise = ctx.make_response_promise();
	if !promise.pending() {
		tracing::debug!(request = %promise.id(), "response.suppress.not_pending");
		return Routed::Suppressed(Suppression::NotPending);
	}
	match &outcome {
		DeliveryOutcome::Failure(reason) => {
			tracing::debug!(request = %promise.id(), %reason, "response.deliver.failure");
		}
		DeliveryOutcome::Message(msg) if msg.is_empty() && promise.is_async() => {
			tracing::debug!(request = %promise.id(), "response.suppress.empty_async");
			return Routed::Suppressed(Suppression::EmptyAsync);
		}
		DeliveryOutcome::Message(_) => {
			tracing::debug!(request = %promise.id(), "response.deliver.message");
		}
	}
	promise.deliver(dispatch, outcome);
	Routed::Delivered
}
