//! Crate-level error types shared by the token lifecycle, signature verification, and stores.

// self
use crate::{_prelude::*, auth::TenantId, config::PartnerConfigError, oauth::GrantType};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Inbound signed message failed one of the verification gates.
	#[error(transparent)]
	Verification(#[from] VerificationError),
	/// No signing secret is configured for the tenant; the verifier was never invoked.
	#[error("No signing secret is configured for tenant `{tenant}`.")]
	SecretNotConfigured {
		/// Tenant whose secret lookup came back empty.
		tenant: TenantId,
	},
	/// Partner token endpoint answered with a non-2xx status.
	#[error("Partner token endpoint rejected the {grant} grant with HTTP {status}.")]
	OAuthExchangeFailed {
		/// Grant that was being exchanged.
		grant: GrantType,
		/// HTTP status returned by the partner.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Partner answered 2xx but the token payload is unusable.
	#[error(transparent)]
	TokenResponse(#[from] TokenResponseError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration or input problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
}
impl Error {
	/// Returns `true` when the failure must surface to the partner as "unauthorized".
	///
	/// Every verification failure and a missing signing secret collapse into this single
	/// classification; the inner variant stays available for diagnostics.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Verification(_) | Self::SecretNotConfigured { .. })
	}
}

/// Reasons an inbound signed message is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum VerificationError {
	/// The signature string lacks a `t=` or `v1=` value.
	#[error("The request is not signed; both `t` and `v1` signature values are required.")]
	MissingSignature,
	/// The `t=` value is not a finite number.
	#[error("Signature timestamp `{value}` is not a number.")]
	MalformedTimestamp {
		/// Raw timestamp value as received.
		value: String,
	},
	/// The timestamp lies in the future or outside the freshness window.
	#[error("Signature expired (drift of {drift_seconds} seconds).")]
	SignatureExpired {
		/// `now - timestamp`, in whole seconds.
		drift_seconds: i64,
	},
	/// The recomputed HMAC does not match `v1`.
	#[error("Invalid signature.")]
	InvalidSignature,
	/// The signed payload could not be read as a JSON object.
	#[error("Signed payload is malformed: {reason}.")]
	MalformedPayload {
		/// Human-readable reason.
		reason: String,
	},
}
impl VerificationError {
	/// Returns a stable label suitable for log fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::MissingSignature => "missing_signature",
			Self::MalformedTimestamp { .. } => "malformed_timestamp",
			Self::SignatureExpired { .. } => "signature_expired",
			Self::InvalidSignature => "invalid_signature",
			Self::MalformedPayload { .. } => "malformed_payload",
		}
	}
}

/// Configuration and input failures raised before or while building a token request.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Partner configuration is invalid.
	#[error(transparent)]
	Partner(#[from] PartnerConfigError),
	/// Cached credentials hold neither a fresh access token nor a refresh token.
	#[error("Cached credentials are missing a refresh token.")]
	MissingRefreshToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures decoding a successful token endpoint response.
#[derive(Debug, ThisError)]
pub enum TokenResponseError {
	/// Token endpoint responded with JSON that does not match the wire contract.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Authorization-code exchange did not return a refresh token.
	#[error("Token endpoint response is missing refresh_token.")]
	MissingRefreshToken,
	/// Token endpoint returned a non-positive `expires_in`.
	#[error("The expires_in value must be positive, got {value}.")]
	NonPositiveExpiresIn {
		/// Value received from the partner.
		value: i64,
	},
	/// Token endpoint returned an `expires_in` beyond the accepted maximum.
	#[error("The expires_in value must not exceed {max} seconds, got {value}.")]
	ExcessiveExpiresIn {
		/// Value received from the partner.
		value: i64,
		/// Largest accepted lifetime in seconds.
		max: i64,
	},
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call exceeded its timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
