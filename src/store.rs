//! Caller-owned persistence for per-tenant integration settings.
//!
//! The token lifecycle and the signature verifier hold no state of their own. Hosts keep
//! signing secrets and issued tokens in an [`IntegrationStore`] and pass them in per call;
//! [`SecretResolver`] is the narrow lookup the inbound verifier depends on.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SigningSecret, TenantId, TokenResult},
};

/// Boxed `Send` future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Maps a tenant to its signing secret.
pub trait SecretResolver
where
	Self: Send + Sync,
{
	/// Returns the tenant's secret, or `None` when none is configured.
	fn lookup<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<SigningSecret>>;
}

/// Storage backend for integration records, keyed by tenant.
pub trait IntegrationStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the record for `record.tenant`.
	fn save(&self, record: IntegrationRecord) -> StoreFuture<'_, ()>;

	/// Fetches the tenant's record, if present.
	fn fetch<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>>;

	/// Replaces the token on an existing record; never creates a record.
	fn store_token<'a>(
		&'a self,
		tenant: &'a TenantId,
		token: TokenResult,
	) -> StoreFuture<'a, StoreTokenOutcome>;

	/// Deletes the tenant's record, returning what was removed.
	fn remove<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>>;
}

/// Result of [`IntegrationStore::store_token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreTokenOutcome {
	/// The record existed and now carries the new token.
	Updated,
	/// No record exists for the tenant; nothing was written.
	Missing,
}

/// Everything the host keeps for one connected tenant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationRecord {
	/// Tenant (partner organization) identifier.
	pub tenant: TenantId,
	/// Partner API base URL for this tenant.
	#[serde(default)]
	pub base_url: Option<String>,
	/// Secret for signed page loads.
	#[serde(default)]
	pub page_secret: Option<SigningSecret>,
	/// Secret for signed webhooks.
	#[serde(default)]
	pub webhook_secret: Option<SigningSecret>,
	/// Most recently issued token.
	#[serde(default)]
	pub token: Option<TokenResult>,
}
impl IntegrationRecord {
	/// Creates an empty record for `tenant`.
	pub fn new(tenant: TenantId) -> Self {
		Self { tenant, base_url: None, page_secret: None, webhook_secret: None, token: None }
	}

	/// Sets the partner API base URL.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Sets the page-load signing secret.
	pub fn with_page_secret(mut self, secret: impl Into<String>) -> Self {
		self.page_secret = Some(SigningSecret::new(secret));

		self
	}

	/// Sets the webhook signing secret.
	pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
		self.webhook_secret = Some(SigningSecret::new(secret));

		self
	}

	/// Returns the secret of the requested kind.
	pub fn secret(&self, kind: SecretKind) -> Option<&SigningSecret> {
		match kind {
			SecretKind::Page => self.page_secret.as_ref(),
			SecretKind::Webhook => self.webhook_secret.as_ref(),
		}
	}
}

/// Which of a tenant's secrets a resolver hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecretKind {
	/// Secret for signed page loads.
	Page,
	/// Secret for signed webhooks.
	Webhook,
}

/// [`SecretResolver`] view over an [`IntegrationStore`] for one [`SecretKind`].
#[derive(Debug)]
pub struct IntegrationSecrets<S>
where
	S: ?Sized + IntegrationStore,
{
	store: Arc<S>,
	kind: SecretKind,
}
impl<S> IntegrationSecrets<S>
where
	S: ?Sized + IntegrationStore,
{
	/// Resolves `kind` secrets from `store`.
	pub fn new(store: Arc<S>, kind: SecretKind) -> Self {
		Self { store, kind }
	}

	/// Resolves page-load secrets.
	pub fn page(store: Arc<S>) -> Self {
		Self::new(store, SecretKind::Page)
	}

	/// Resolves webhook secrets.
	pub fn webhook(store: Arc<S>) -> Self {
		Self::new(store, SecretKind::Webhook)
	}
}
impl<S> Clone for IntegrationSecrets<S>
where
	S: ?Sized + IntegrationStore,
{
	fn clone(&self) -> Self {
		Self { store: self.store.clone(), kind: self.kind }
	}
}
impl<S> SecretResolver for IntegrationSecrets<S>
where
	S: ?Sized + IntegrationStore,
{
	fn lookup<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<SigningSecret>> {
		Box::pin(async move {
			let record = self.store.fetch(tenant).await?;

			Ok(record.and_then(|record| record.secret(self.kind).cloned()))
		})
	}
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Snapshot could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
