//! Actor addresses and sink handles.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Address the hosting runtime uses to resolve an actor mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorAddr(pub u64);

impl fmt::Display for ActorAddr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "actor#{}", self.0)
	}
}

/// Handle naming one destination actor.
///
/// Deliberately not `Clone`: a path owns the handle it addresses. Paths that
/// need to reach the same actor share it through [`SharedSink`].
#[derive(Debug, PartialEq, Eq)]
pub struct SinkHandle {
	addr: ActorAddr,
	label: Arc<str>,
}

/// Reference-counted handle for sinks reachable from several paths.
pub type SharedSink = Arc<SinkHandle>;

impl SinkHandle {
	/// Creates a handle for `addr` with a diagnostic label.
	pub fn new(addr: ActorAddr, label: impl Into<Arc<str>>) -> Self {
		Self { addr, label: label.into() }
	}

	/// Target address.
	pub const fn addr(&self) -> ActorAddr {
		self.addr
	}

	/// Diagnostic label.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Converts this handle into a shared one.
	pub fn into_shared(self) -> SharedSink {
		Arc::new(self)
	}
}

impl fmt::Display for SinkHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({})", self.label, self.addr)
	}
}

/// Sink handle stored by a path: either owned outright or explicitly shared.
#[derive(Debug)]
pub enum SinkRef {
	/// Sole owner of the handle.
	Owned(SinkHandle),
	/// One of several holders of a shared handle.
	Shared(SharedSink),
}

impl SinkRef {
	/// Returns `true` when the handle is shared with other holders.
	pub fn is_shared(&self) -> bool {
		matches!(self, Self::Shared(_))
	}
}

impl Deref for SinkRef {
	type Target = SinkHandle;

	fn deref(&self) -> &SinkHandle {
		match self {
			Self::Owned(hdl) => hdl,
			Self::Shared(hdl) => hdl,
		}
	}
}

impl From<SinkHandle> for SinkRef {
	fn from(hdl: SinkHandle) -> Self {
		Self::Owned(hdl)
	}
}

impl From<SharedSink> for SinkRef {
	fn from(hdl: SharedSink) -> Self {
		Self::Shared(hdl)
	}
}
