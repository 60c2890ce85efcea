//! Single-shot result delivery through response promises.
//!
//! * [`RequestContext`]: the request being processed and who (if anyone) awaits it
//! * [`ResponsePromise`]: single-use obligation to answer that request
//! * [`route_result`]: delivers a computed [`DeliveryOutcome`], suppressing
//!   answers nobody listens for

#![warn(missing_docs)]

pub mod id;
pub mod outcome;
pub mod promise;
pub mod router;

pub use id::{MessageId, MessageKind};
pub use outcome::{DeliveryOutcome, Response, ResponsePayload};
pub use promise::{RequestContext, ResponsePromise};
pub use router::{Routed, Suppression, route_result};
