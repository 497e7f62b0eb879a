//! Decision policy shared by every acquisition call.

// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, OAuthCredentialInput, TokenSecret},
};

/// Safety margin a cached access token must outlive before it is reused.
pub const FRESHNESS_MARGIN: Duration = Duration::seconds(60);

/// What [`decide`] chose for one call; borrows from the caller's input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenDecision<'a> {
	/// Hand the cached access token back without a network call.
	Reuse {
		/// Cached access token.
		access_token: &'a TokenSecret,
		/// Absolute expiry of the cached token.
		valid_until: OffsetDateTime,
	},
	/// Exchange the refresh token.
	RefreshGrant {
		/// Refresh token to exchange.
		refresh_token: &'a TokenSecret,
		/// Expiring access token, forwarded when known.
		access_token: Option<&'a TokenSecret>,
	},
	/// Exchange the authorization code.
	AuthorizationCodeGrant {
		/// Code returned by the partner redirect.
		code: &'a TokenSecret,
	},
	/// Cached input has neither a fresh access token nor a refresh token.
	MissingRefreshToken,
}

/// Returns `true` when `valid_until` lies strictly beyond `now + FRESHNESS_MARGIN`.
pub fn is_fresh(valid_until: OffsetDateTime, now: OffsetDateTime) -> bool {
	valid_until > now + FRESHNESS_MARGIN
}

/// Evaluates `input` at `now`; runs on every call with no memory of earlier ones.
pub fn decide(input: &OAuthCredentialInput, now: OffsetDateTime) -> TokenDecision<'_> {
	match input {
		OAuthCredentialInput::AuthorizationCode { code } =>
			TokenDecision::AuthorizationCodeGrant { code },
		OAuthCredentialInput::Cached(CachedCredentials {
			refresh_token,
			access_token,
			valid_until,
		}) => {
			match (access_token, valid_until) {
				(Some(access_token), Some(valid_until)) if is_fresh(*valid_until, now) =>
					return TokenDecision::Reuse { access_token, valid_until: *valid_until },
				_ => (),
			}

			match refresh_token {
				Some(refresh_token) => TokenDecision::RefreshGrant {
					refresh_token,
					access_token: access_token.as_ref(),
				},
				None => TokenDecision::MissingRefreshToken,
			}
		},
	}
}
