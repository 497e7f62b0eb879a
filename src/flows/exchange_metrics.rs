// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token acquisitions, shared by clones of one manager.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	fast_path: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the number of token endpoint exchanges started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that produced a token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of calls answered from the caller's cached token.
	pub fn fast_path_hits(&self) -> u64 {
		self.fast_path.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_outcome<T>(&self, result: &crate::error::Result<T>) {
		let counter = if result.is_ok() { &self.success } else { &self.failure };

		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fast_path(&self) {
		self.fast_path.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ConfigError, Error};

	#[test]
	fn outcomes_land_in_separate_counters() {
		let metrics = ExchangeMetrics::default();

		metrics.record_attempt();
		metrics.record_outcome(&Ok::<_, Error>(()));
		metrics.record_attempt();
		metrics.record_outcome::<()>(&Err(ConfigError::MissingRefreshToken.into()));
		metrics.record_fast_path();

		assert_eq!(metrics.attempts(), 2);
		assert_eq!(metrics.successes(), 1);
		assert_eq!(metrics.failures(), 1);
		assert_eq!(metrics.fast_path_hits(), 1);
	}
}
