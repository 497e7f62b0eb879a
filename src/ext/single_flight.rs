//! Per-tenant serialization of token acquisitions.
//!
//! [`crate::flows::TokenLifecycleManager`] has no notion of tenants and does not deduplicate
//! concurrent calls. Hosts that need at most one exchange in flight per tenant run their
//! "read cached token, acquire, persist" sequence inside [`TenantSingleFlight::run`], so a second
//! caller observes the first caller's persisted token instead of refreshing again.

// self
use crate::{_prelude::*, auth::TenantId};

/// Lazily created async mutex per tenant; clones share the same guards.
#[derive(Clone, Debug, Default)]
pub struct TenantSingleFlight {
	guards: Arc<Mutex<HashMap<TenantId, Arc<AsyncMutex<()>>>>>,
}
impl TenantSingleFlight {
	/// Returns (creating on demand) the guard for `tenant`.
	pub fn guard(&self, tenant: &TenantId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(tenant.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	/// Runs `f` while holding `tenant`'s guard; other tenants proceed concurrently.
	pub async fn run<F, Fut, T>(&self, tenant: &TenantId, f: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let guard = self.guard(tenant);
		let _held = guard.lock().await;

		f().await
	}

	/// Drops guards no caller currently holds.
	pub fn prune(&self) {
		self.guards.lock().retain(|_, guard| Arc::strong_count(guard) > 1);
	}

	/// Number of tenants with a live guard.
	pub fn len(&self) -> usize {
		self.guards.lock().len()
	}

	/// Returns `true` when no guard exists.
	pub fn is_empty(&self) -> bool {
		self.guards.lock().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn tenant(raw: &str) -> TenantId {
		TenantId::new(raw).expect("Tenant fixture should be valid.")
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn same_tenant_runs_one_at_a_time() {
		let flights = TenantSingleFlight::default();
		let active = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		let mut handles = Vec::new();

		for _ in 0..8 {
			let flights = flights.clone();
			let active = active.clone();
			let peak = peak.clone();

			handles.push(tokio::spawn(async move {
				flights
					.run(&tenant("org-sf"), || async {
						let now = active.fetch_add(1, Ordering::SeqCst) + 1;

						peak.fetch_max(now, Ordering::SeqCst);
						tokio::time::sleep(StdDuration::from_millis(5)).await;
						active.fetch_sub(1, Ordering::SeqCst);
					})
					.await;
			}));
		}

		for handle in handles {
			handle.await.expect("Task should not panic.");
		}

		assert_eq!(peak.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn prune_keeps_only_held_guards() {
		let flights = TenantSingleFlight::default();
		let held = flights.guard(&tenant("org-held"));
		let _lock = held.lock().await;

		flights.run(&tenant("org-done"), || async {}).await;

		assert_eq!(flights.len(), 2);

		flights.prune();

		assert_eq!(flights.len(), 1);
	}
}
