//! Token endpoint response decoding.

// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{
	_prelude::*,
	auth::{TokenOrigin, TokenResult, TokenSecret},
	error::TokenResponseError,
	oauth::GrantType,
};

/// Longest access-token lifetime accepted from the partner (ten years).
pub const MAX_EXPIRES_IN_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Wire shape of a successful token response; field names are the partner's contract.
#[derive(Clone, Deserialize)]
pub struct TokenEndpointResponse {
	/// Issued access token.
	pub access_token: String,
	/// Issued refresh token, when the partner rotated it.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Access token lifetime in seconds (number or numeric string on the wire).
	#[serde(deserialize_with = "deserialize_expires_in")]
	pub expires_in: i64,
}
impl TokenEndpointResponse {
	/// Decodes a 2xx body, reporting the failing field path on mismatch.
	pub fn decode(status: u16, body: &[u8]) -> Result<Self, TokenResponseError> {
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TokenResponseError::Parse { source, status })
	}

	/// Converts the wire response into a [`TokenResult`] produced at `issued_at`.
	///
	/// Refresh grants fall back to `previous_refresh` when the partner does not rotate the
	/// refresh token; authorization-code grants require one.
	pub fn into_result(
		self,
		grant: GrantType,
		issued_at: OffsetDateTime,
		previous_refresh: Option<&TokenSecret>,
	) -> Result<TokenResult, TokenResponseError> {
		if self.expires_in <= 0 {
			return Err(TokenResponseError::NonPositiveExpiresIn { value: self.expires_in });
		}
		if self.expires_in > MAX_EXPIRES_IN_SECONDS {
			return Err(TokenResponseError::ExcessiveExpiresIn {
				value: self.expires_in,
				max: MAX_EXPIRES_IN_SECONDS,
			});
		}

		let refresh_token = match (self.refresh_token.filter(|value| !value.is_empty()), grant) {
			(Some(value), _) => TokenSecret::new(value),
			(None, GrantType::RefreshToken) =>
				previous_refresh.cloned().ok_or(TokenResponseError::MissingRefreshToken)?,
			(None, GrantType::AuthorizationCode) =>
				return Err(TokenResponseError::MissingRefreshToken),
		};
		let origin = match grant {
			GrantType::AuthorizationCode => TokenOrigin::AuthorizationCode,
			GrantType::RefreshToken => TokenOrigin::RefreshToken,
		};

		Ok(TokenResult {
			access_token: TokenSecret::new(self.access_token),
			refresh_token: Some(refresh_token),
			expires_in_seconds: self.expires_in,
			issued_at,
			origin,
		})
	}
}
impl Debug for TokenEndpointResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointResponse")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExpiresIn {
	Seconds(i64),
	Fractional(f64),
	Text(String),
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	match RawExpiresIn::deserialize(deserializer)? {
		RawExpiresIn::Seconds(value) => Ok(value),
		RawExpiresIn::Fractional(value) if value.is_finite() => Ok(value.trunc() as i64),
		RawExpiresIn::Fractional(value) =>
			Err(DeError::custom(format!("expires_in `{value}` is not finite"))),
		RawExpiresIn::Text(text) => text
			.trim()
			.parse::<i64>()
			.map_err(|_| DeError::custom(format!("expires_in `{text}` is not an integer"))),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const ISSUED: OffsetDateTime = macros::datetime!(2025-06-01 08:00 UTC);

	#[test]
	fn decode_accepts_numeric_and_string_lifetimes() {
		let numeric = TokenEndpointResponse::decode(
			200,
			br#"{"access_token":"a","refresh_token":"r","expires_in":3600,"token_type":"Bearer"}"#,
		)
		.expect("Numeric expires_in should decode.");
		let text = TokenEndpointResponse::decode(
			200,
			br#"{"access_token":"a","refresh_token":"r","expires_in":"1800"}"#,
		)
		.expect("String expires_in should decode.");

		assert_eq!(numeric.expires_in, 3600);
		assert_eq!(text.expires_in, 1800);
	}

	#[test]
	fn decode_reports_the_failing_field() {
		let err = TokenEndpointResponse::decode(201, br#"{"refresh_token":"r","expires_in":60}"#)
			.expect_err("Missing access_token must fail.");

		match err {
			TokenResponseError::Parse { status, source } => {
				assert_eq!(status, 201);
				assert!(source.inner().to_string().contains("access_token"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(
			TokenEndpointResponse::decode(200, br#"{"access_token":"a","expires_in":"soon"}"#)
				.is_err()
		);
	}

	#[test]
	fn refresh_grant_keeps_previous_refresh_token_when_not_rotated() {
		let response =
			TokenEndpointResponse::decode(200, br#"{"access_token":"new","expires_in":900}"#)
				.expect("Response should decode.");
		let previous = TokenSecret::new("rt-old");
		let result = response
			.into_result(GrantType::RefreshToken, ISSUED, Some(&previous))
			.expect("Refresh result should build.");

		assert_eq!(result.refresh_token.as_ref().map(TokenSecret::expose), Some("rt-old"));
		assert_eq!(result.origin, TokenOrigin::RefreshToken);
		assert_eq!(result.valid_until(), macros::datetime!(2025-06-01 08:15 UTC));
	}

	#[test]
	fn authorization_code_grant_requires_refresh_token() {
		let response =
			TokenEndpointResponse::decode(200, br#"{"access_token":"new","expires_in":900}"#)
				.expect("Response should decode.");

		assert!(matches!(
			response.into_result(GrantType::AuthorizationCode, ISSUED, None),
			Err(TokenResponseError::MissingRefreshToken)
		));
	}

	#[test]
	fn non_positive_lifetimes_are_rejected() {
		let response = TokenEndpointResponse::decode(
			200,
			br#"{"access_token":"a","refresh_token":"r","expires_in":0}"#,
		)
		.expect("Response should decode.");

		assert!(matches!(
			response.into_result(GrantType::AuthorizationCode, ISSUED, None),
			Err(TokenResponseError::NonPositiveExpiresIn { value: 0 })
		));
	}

	#[test]
	fn lifetimes_beyond_the_maximum_are_rejected() {
		let response = TokenEndpointResponse::decode(
			200,
			br#"{"access_token":"a","refresh_token":"r","expires_in":9223372036854775807}"#,
		)
		.expect("Response should decode.");

		assert!(matches!(
			response.into_result(GrantType::AuthorizationCode, ISSUED, None),
			Err(TokenResponseError::ExcessiveExpiresIn {
				value: i64::MAX,
				max: MAX_EXPIRES_IN_SECONDS,
			})
		));
	}
}
