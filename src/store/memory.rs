//! Thread-safe in-memory [`IntegrationStore`] for single-process hosts and tests.

// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenResult},
	store::{IntegrationRecord, IntegrationStore, StoreFuture, StoreTokenOutcome},
};

type RecordMap = Arc<RwLock<HashMap<TenantId, IntegrationRecord>>>;

/// In-process integration records; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(RecordMap);
impl MemoryStore {
	/// Number of stored records.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no record is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn store_token_now(map: &RecordMap, tenant: &TenantId, token: TokenResult) -> StoreTokenOutcome {
		match map.write().get_mut(tenant) {
			Some(record) => {
				record.token = Some(token);

				StoreTokenOutcome::Updated
			},
			None => StoreTokenOutcome::Missing,
		}
	}
}
impl IntegrationStore for MemoryStore {
	fn save(&self, record: IntegrationRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(record.tenant.clone(), record);

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>> {
		Box::pin(async move { Ok(self.0.read().get(tenant).cloned()) })
	}

	fn store_token<'a>(
		&'a self,
		tenant: &'a TenantId,
		token: TokenResult,
	) -> StoreFuture<'a, StoreTokenOutcome> {
		Box::pin(async move { Ok(Self::store_token_now(&self.0, tenant, token)) })
	}

	fn remove<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>> {
		Box::pin(async move { Ok(self.0.write().remove(tenant)) })
	}
}
