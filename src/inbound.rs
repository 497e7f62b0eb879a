//! Glue between raw inbound requests and [`SignedMessageVerifier`].
//!
//! Signed page loads carry the signature in the `signature` query parameter and sign the
//! remaining parameters as string values. Webhooks carry it in the `officernd-signature`
//! header and sign the JSON body.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{SigningSecret, TenantId},
	clock::{SystemClock, TokenClock},
	error::VerificationError,
	signature::SignedMessageVerifier,
	store::SecretResolver,
};

/// Query parameter carrying the page-load signature.
pub const PAGE_SIGNATURE_PARAM: &str = "signature";
/// Header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "officernd-signature";

/// Resolves the tenant's secret, rebuilds the signed payload, and verifies it.
///
/// A tenant without a secret fails with [`Error::SecretNotConfigured`] before the signature is
/// even looked at.
pub struct InboundVerifier<R>
where
	R: ?Sized + SecretResolver,
{
	resolver: Arc<R>,
	verifier: SignedMessageVerifier,
	clock: Arc<dyn TokenClock>,
}
impl<R> InboundVerifier<R>
where
	R: ?Sized + SecretResolver,
{
	/// Verifier that reads "now" from the system clock.
	pub fn new(resolver: Arc<R>) -> Self {
		Self { resolver, verifier: SignedMessageVerifier, clock: Arc::new(SystemClock) }
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn TokenClock>) -> Self {
		self.clock = clock;

		self
	}

	/// Verifies a signed page load and returns the signed parameters.
	///
	/// `raw_query` may start with `?`. Repeated parameters become string arrays.
	pub async fn verify_page_query(
		&self,
		tenant: &TenantId,
		raw_query: &str,
	) -> Result<JsonMap<String, JsonValue>> {
		let secret = self.secret_for(tenant).await?;
		let (signature, payload) = split_page_query(raw_query);
		let signature = signature.ok_or(VerificationError::MissingSignature)?;

		self.verifier.verify(&signature, &payload, &secret, self.clock.now())?;

		Ok(payload)
	}

	/// Verifies a webhook body against its signature header value and returns the parsed body.
	pub async fn verify_webhook(
		&self,
		tenant: &TenantId,
		signature_header: Option<&str>,
		body: &[u8],
	) -> Result<JsonMap<String, JsonValue>> {
		let secret = self.secret_for(tenant).await?;
		let signature = signature_header.ok_or(VerificationError::MissingSignature)?;
		let payload = match serde_json::from_slice::<JsonValue>(body) {
			Ok(JsonValue::Object(payload)) => payload,
			Ok(_) =>
				return Err(VerificationError::MalformedPayload {
					reason: "webhook body is not a JSON object".into(),
				}
				.into()),
			Err(e) =>
				return Err(VerificationError::MalformedPayload { reason: e.to_string() }.into()),
		};

		self.verifier.verify(signature, &payload, &secret, self.clock.now())?;

		Ok(payload)
	}

	async fn secret_for(&self, tenant: &TenantId) -> Result<SigningSecret> {
		self.resolver
			.lookup(tenant)
			.await?
			.ok_or_else(|| Error::SecretNotConfigured { tenant: tenant.clone() })
	}
}
impl<R> Clone for InboundVerifier<R>
where
	R: ?Sized + SecretResolver,
{
	fn clone(&self) -> Self {
		Self { resolver: self.resolver.clone(), verifier: self.verifier, clock: self.clock.clone() }
	}
}
impl<R> Debug for InboundVerifier<R>
where
	R: ?Sized + SecretResolver,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InboundVerifier").finish_non_exhaustive()
	}
}

// First `signature` value wins; every other parameter joins the payload.
fn split_page_query(raw_query: &str) -> (Option<String>, JsonMap<String, JsonValue>) {
	let mut signature = None;
	let mut payload = JsonMap::new();

	for (key, value) in form_urlencoded::parse(raw_query.trim_start_matches('?').as_bytes()) {
		if key == PAGE_SIGNATURE_PARAM {
			signature.get_or_insert_with(|| value.into_owned());

			continue;
		}

		let value = JsonValue::String(value.into_owned());

		match payload.get_mut(key.as_ref()) {
			Some(JsonValue::Array(values)) => values.push(value),
			Some(existing) => {
				let first = existing.take();

				*existing = JsonValue::Array(vec![first, value]);
			},
			None => {
				payload.insert(key.into_owned(), value);
			},
		}
	}

	(signature, payload)
}
