//! Token results returned by every successful acquisition, refresh, or fast-path reuse.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Where a [`TokenResult`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrigin {
	/// The caller's cached access token was still fresh; no network call happened.
	FastPath,
	/// Minted by an authorization-code exchange.
	AuthorizationCode,
	/// Minted by a refresh-token exchange.
	RefreshToken,
}

/// Tokens handed back to the caller, who owns persisting them.
///
/// `expires_in_seconds` is always relative to `issued_at`, the instant the result was produced,
/// never to the moment it is later read back from storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
	/// Bearer token for partner API calls.
	pub access_token: TokenSecret,
	/// Refresh token for the next exchange.
	///
	/// Exchanges always fill this; it is `None` only on a fast path where the caller supplied
	/// no refresh token.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime of the access token in seconds, counted from `issued_at`.
	pub expires_in_seconds: i64,
	/// Instant the result was produced.
	pub issued_at: OffsetDateTime,
	/// Path that produced the result.
	pub origin: TokenOrigin,
}
impl TokenResult {
	/// Absolute expiry instant (`issued_at + expires_in_seconds`).
	///
	/// Saturates at the representable date range when a persisted lifetime is out of bounds.
	pub fn valid_until(&self) -> OffsetDateTime {
		self.issued_at.checked_add(Duration::seconds(self.expires_in_seconds)).unwrap_or_else(|| {
			if self.expires_in_seconds.is_negative() {
				PrimitiveDateTime::MIN.assume_utc()
			} else {
				PrimitiveDateTime::MAX.assume_utc()
			}
		})
	}

	/// Returns `true` if the access token is past its expiry at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.valid_until()
	}
}
impl Debug for TokenResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResult")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in_seconds", &self.expires_in_seconds)
			.field("issued_at", &self.issued_at)
			.field("origin", &self.origin)
			.finish()
	}
}
