//! JSON-file [`IntegrationStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenResult},
	store::{IntegrationRecord, IntegrationStore, StoreError, StoreFuture, StoreTokenOutcome},
};

type RecordMap = BTreeMap<TenantId, IntegrationRecord>;

/// Keeps records in memory and rewrites the JSON snapshot after each mutation.
///
/// Snapshots are written to a sibling `.tmp` file, synced, then renamed over the original.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<RecordMap>>,
}
impl FileStore {
	/// Opens (or creates) a store at `path`, eagerly loading existing records.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		let records = load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(records)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self, records: &RecordMap) -> Result<(), StoreError> {
		ensure_parent_exists(&self.path)?;

		let snapshot = records.values().collect::<Vec<_>>();
		let serialized = serde_json::to_vec_pretty(&snapshot).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to encode integration records: {e}") }
		})?;
		let tmp_path = self.path.with_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| backend("create", &tmp_path, e))?;

			file.write_all(&serialized).map_err(|e| backend("write", &tmp_path, e))?;
			file.sync_all().map_err(|e| backend("sync", &tmp_path, e))?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| backend("replace", &self.path, e))
	}
}
impl IntegrationStore for FileStore {
	fn save(&self, record: IntegrationRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(record.tenant.clone(), record);
			self.persist(&guard)
		})
	}

	fn fetch<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>> {
		Box::pin(async move { Ok(self.inner.read().get(tenant).cloned()) })
	}

	fn store_token<'a>(
		&'a self,
		tenant: &'a TenantId,
		token: TokenResult,
	) -> StoreFuture<'a, StoreTokenOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let Some(record) = guard.get_mut(tenant) else {
				return Ok(StoreTokenOutcome::Missing);
			};

			record.token = Some(token);
			self.persist(&guard)?;

			Ok(StoreTokenOutcome::Updated)
		})
	}

	fn remove<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<IntegrationRecord>> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let removed = guard.remove(tenant);

			if removed.is_some() {
				self.persist(&guard)?;
			}

			Ok(removed)
		})
	}
}

fn load_snapshot(path: &Path) -> Result<RecordMap, StoreError> {
	if !path.exists() {
		return Ok(RecordMap::new());
	}

	let bytes = fs::read(path).map_err(|e| backend("read", path, e))?;

	if bytes.is_empty() {
		return Ok(RecordMap::new());
	}

	let records = serde_json::from_slice::<Vec<IntegrationRecord>>(&bytes).map_err(|e| {
		StoreError::Serialization { message: format!("Failed to parse {}: {e}", path.display()) }
	})?;

	Ok(records.into_iter().map(|record| (record.tenant.clone(), record)).collect())
}

fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| backend("create directory", parent, e))?;
	}

	Ok(())
}

fn backend(action: &str, path: &Path, e: std::io::Error) -> StoreError {
	StoreError::Backend { message: format!("Failed to {action} {}: {e}", path.display()) }
}
