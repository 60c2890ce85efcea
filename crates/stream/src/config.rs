//! Stream configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Batch sizing and buffering limits applied to every path of a manager.
///
/// ```toml
/// default_batch_size = 50
/// max_cache_len = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
	/// Batch size used until (or unless) the sink announces its own.
	pub default_batch_size: i32,
	/// Upper bound on unshipped items buffered per path.
	pub max_cache_len: usize,
}

impl StreamConfig {
	/// Batch size of a freshly created path.
	pub const DEFAULT_BATCH_SIZE: i32 = 50;

	/// Default per-path cache bound.
	pub const DEFAULT_MAX_CACHE_LEN: usize = 4096;

	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.default_batch_size <= 0 {
			return Err(ConfigError::InvalidBatchSize(self.default_batch_size));
		}
		if self.max_cache_len == 0 || i32::try_from(self.max_cache_len).is_err() {
			return Err(ConfigError::InvalidCacheLen(self.max_cache_len));
		}
		Ok(())
	}

	/// Sets the default batch size.
	#[must_use]
	pub fn with_default_batch_size(mut self, size: i32) -> Self {
		self.default_batch_size = size;
		self
	}

	/// Sets the per-path cache bound.
	#[must_use]
	pub fn with_max_cache_len(mut self, len: usize) -> Self {
		self.max_cache_len = len;
		self
	}
}

impl Default for StreamConfig {
	fn default() -> Self {
		Self {
			default_batch_size: Self::DEFAULT_BATCH_SIZE,
			max_cache_len: Self::DEFAULT_MAX_CACHE_LEN,
		}
	}
}
