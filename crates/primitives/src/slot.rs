//! Stream slot identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one endpoint of a data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct StreamSlot(pub u16);

impl StreamSlot {
	/// Sentinel for "not assigned yet".
	pub const INVALID: Self = Self(0);

	/// Returns `true` unless this is [`StreamSlot::INVALID`].
	pub const fn is_valid(self) -> bool {
		self.0 != Self::INVALID.0
	}
}

impl fmt::Display for StreamSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_valid() { write!(f, "{}", self.0) } else { f.write_str("invalid") }
	}
}

/// Sender/receiver slot pair addressing one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StreamSlots {
	/// Slot of the emitting endpoint.
	pub sender: StreamSlot,
	/// Slot of the consuming endpoint.
	pub receiver: StreamSlot,
}

impl StreamSlots {
	/// Creates a slot pair.
	pub const fn new(sender: StreamSlot, receiver: StreamSlot) -> Self {
		Self { sender, receiver }
	}

	/// Creates a pair whose receiver half is not known yet.
	pub const fn unbound(sender: StreamSlot) -> Self {
		Self::new(sender, StreamSlot::INVALID)
	}

	/// Swaps sender and receiver, as seen from the other endpoint.
	#[must_use]
	pub const fn invert(self) -> Self {
		Self::new(self.receiver, self.sender)
	}

	/// Returns `true` while the receiver half is unassigned.
	pub const fn pending(self) -> bool {
		!self.receiver.is_valid()
	}
}

impl fmt::Display for StreamSlots {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}->{}", self.sender, self.receiver)
	}
}
