//! Caller-supplied credential inputs evaluated on every acquisition call.

// self
use crate::{
	_prelude::*,
	auth::{TokenResult, TokenSecret},
};

/// What the caller currently holds when asking for a usable access token.
///
/// Inputs are immutable per call and never retained.
#[derive(Clone, Debug)]
pub enum OAuthCredentialInput {
	/// First-time connection: the partner redirected back with an authorization code.
	AuthorizationCode {
		/// Authorization code from the partner redirect.
		code: TokenSecret,
	},
	/// Previously persisted token state.
	Cached(CachedCredentials),
}
impl OAuthCredentialInput {
	/// Input for the authorization-code grant.
	pub fn authorization_code(code: impl Into<String>) -> Self {
		Self::AuthorizationCode { code: TokenSecret::new(code) }
	}

	/// Input carrying only a refresh token.
	pub fn refresh_token(token: impl Into<String>) -> Self {
		Self::Cached(CachedCredentials::default().with_refresh_token(token))
	}
}
impl From<CachedCredentials> for OAuthCredentialInput {
	fn from(value: CachedCredentials) -> Self {
		Self::Cached(value)
	}
}
impl From<&TokenResult> for OAuthCredentialInput {
	fn from(value: &TokenResult) -> Self {
		Self::Cached(value.into())
	}
}

/// Cached token state; every field is optional because callers persist whatever they have.
#[derive(Clone, Debug, Default)]
pub struct CachedCredentials {
	/// Refresh token used when the access token is missing or about to expire.
	pub refresh_token: Option<TokenSecret>,
	/// Previously issued access token.
	pub access_token: Option<TokenSecret>,
	/// Absolute expiry of `access_token`.
	pub valid_until: Option<OffsetDateTime>,
}
impl CachedCredentials {
	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the cached access token together with its absolute expiry.
	pub fn with_access_token(mut self, token: impl Into<String>, valid_until: OffsetDateTime) -> Self {
		self.access_token = Some(TokenSecret::new(token));
		self.valid_until = Some(valid_until);

		self
	}
}
impl From<&TokenResult> for CachedCredentials {
	fn from(value: &TokenResult) -> Self {
		Self {
			refresh_token: value.refresh_token.clone(),
			access_token: Some(value.access_token.clone()),
			valid_until: Some(value.valid_until()),
		}
	}
}
