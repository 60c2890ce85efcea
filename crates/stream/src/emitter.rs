//! Batch planning for outbound paths.
//!
//! Only full batches ship by default; a trailing underfull batch ships only
//! when the caller forces it, e.g. while draining a closing path.

use std::vec;

/// Number and sizes of batches to cut from one cache under given credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
	batch_size: i32,
	full_batches: i32,
	tail: i32,
}

impl BatchPlan {
	/// Plans emission of `buffered` items under `open_credit`.
	///
	/// # Panics
	///
	/// Panics if `buffered` exceeds `i32::MAX`, or if `desired_batch_size` is
	/// not positive while credit and items are both available. Both indicate a
	/// misconfigured caller and would corrupt credit accounting.
	pub fn new(buffered: usize, open_credit: i32, desired_batch_size: i32, force_underfull: bool) -> Self {
		let buffered = i32::try_from(buffered).unwrap_or_else(|_| panic!("cache of {buffered} items exceeds the 32-bit batch counter"));
		debug_assert!(open_credit >= 0, "open credit must never be negative");
		let shippable = open_credit.max(0).min(buffered);
		if shippable == 0 {
			return Self {
				batch_size: desired_batch_size,
				full_batches: 0,
				tail: 0,
			};
		}
		assert!(desired_batch_size > 0, "desired batch size must be > 0, got {desired_batch_size}");
		let remainder = shippable % desired_batch_size;
		Self {
			batch_size: desired_batch_size,
			full_batches: shippable / desired_batch_size,
			tail: if force_underfull { remainder } else { 0 },
		}
	}

	/// Number of batches of exactly the desired size.
	pub const fn full_batches(&self) -> i32 {
		self.full_batches
	}

	/// Size of the forced trailing batch, or 0.
	pub const fn tail(&self) -> i32 {
		self.tail
	}

	/// Total number of batches.
	pub fn batch_count(&self) -> usize {
		self.full_batches as usize + usize::from(self.tail > 0)
	}

	/// Total number of items consumed from the cache.
	pub const fn total(&self) -> i32 {
		self.full_batches * self.batch_size + self.tail
	}

	/// Returns `true` if nothing ships.
	pub const fn is_empty(&self) -> bool {
		self.full_batches == 0 && self.tail == 0
	}

	/// Batch sizes in emission order.
	pub fn sizes(&self) -> Sizes {
		Sizes {
			batch_size: self.batch_size,
			full_left: self.full_batches,
			tail: self.tail,
		}
	}

	/// Removes the planned prefix from `cache` and yields it chunked.
	///
	/// The whole prefix leaves the cache even if the iterator is dropped early.
	pub fn drain<'a, T>(&self, cache: &'a mut Vec<T>) -> Batches<'a, T> {
		let total = self.total() as usize;
		assert!(total <= cache.len(), "plan covers {total} items but cache holds {}", cache.len());
		Batches {
			items: cache.drain(..total),
			sizes: self.sizes(),
		}
	}
}

/// Iterator over planned batch sizes.
#[derive(Debug, Clone)]
pub struct Sizes {
	batch_size: i32,
	full_left: i32,
	tail: i32,
}

impl Iterator for Sizes {
	type Item = i32;

	fn next(&mut self) -> Option<i32> {
		if self.full_left > 0 {
			self.full_left -= 1;
			return Some(self.batch_size);
		}
		if self.tail > 0 {
			return Some(std::mem::take(&mut self.tail));
		}
		None
	}
}

/// Chunks drained from a cache, one `(size, items)` pair per batch.
pub struct Batches<'a, T> {
	items: vec::Drain<'a, T>,
	sizes: Sizes,
}

impl<T> Iterator for Batches<'_, T> {
	type Item = (i32, Vec<T>);

	fn next(&mut self) -> Option<Self::Item> {
		let size = self.sizes.next()?;
		let chunk: Vec<T> = self.items.by_ref().take(size as usize).collect();
		Some((size, chunk))
	}
}
