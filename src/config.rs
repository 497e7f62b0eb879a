//! Static partner OAuth configuration: endpoints, client credentials, scope, and timeouts.
//!
//! [`PartnerConfig`] is assembled through [`PartnerConfigBuilder`] or deserialized with serde
//! from whatever format the host application loads its settings from. Both paths run the
//! same validation.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
};

/// Scopes requested when the configuration does not override them.
pub const DEFAULT_SCOPES: [&str; 2] = ["officernd.api.read", "officernd.api.write"];
/// Per-request timeout applied to token endpoint calls by default.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(3);
/// Path appended to the OAuth base URL to reach the token endpoint.
pub const TOKEN_ENDPOINT_PATH: &str = "oauth/token";

/// Errors raised while constructing or validating a [`PartnerConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PartnerConfigError {
	/// The OAuth base URL is required.
	#[error("Missing OAuth base URL.")]
	MissingOAuthBaseUrl,
	/// The OAuth client identifier is required.
	#[error("Missing OAuth client identifier.")]
	MissingClientId,
	/// The OAuth client secret is required.
	#[error("Missing OAuth client secret.")]
	MissingClientSecret,
	/// The redirect URI registered with the partner is required.
	#[error("Missing redirect URI.")]
	MissingRedirectUri,
	/// At least one scope must be requested.
	#[error("Scope set cannot be empty.")]
	EmptyScope,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} URL must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which URL failed validation.
		endpoint: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A URL could not be parsed.
	#[error("The {endpoint} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Scope entries in the raw configuration are invalid.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token requests need a non-zero timeout.
	#[error("Request timeout must be greater than zero.")]
	ZeroRequestTimeout,
}

/// Validated OAuth client configuration for the partner platform.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPartnerConfig")]
pub struct PartnerConfig {
	/// Base URL of the partner identity service.
	pub oauth_base_url: Url,
	/// Derived `{oauth_base_url}/oauth/token` endpoint.
	pub token_endpoint: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; sent in the form body.
	pub client_secret: TokenSecret,
	/// Redirect URI that must exactly match the one registered with the partner.
	pub redirect_uri: Url,
	/// Scopes sent with every grant.
	pub scope: ScopeSet,
	/// Per-request timeout for token endpoint calls.
	pub request_timeout: StdDuration,
}
impl PartnerConfig {
	/// Creates an empty builder.
	pub fn builder() -> PartnerConfigBuilder {
		PartnerConfigBuilder::default()
	}

	/// Parses and validates a JSON document.
	pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}
}

/// Builder for [`PartnerConfig`] values.
#[derive(Debug, Default)]
pub struct PartnerConfigBuilder {
	oauth_base_url: Option<Url>,
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	redirect_uri: Option<Url>,
	scope: Option<ScopeSet>,
	request_timeout: Option<StdDuration>,
}
impl PartnerConfigBuilder {
	/// Sets the partner identity service base URL.
	pub fn oauth_base_url(mut self, url: Url) -> Self {
		self.oauth_base_url = Some(url);

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the redirect URI registered with the partner.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the requested scopes (defaults to [`DEFAULT_SCOPES`]).
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Overrides the per-request timeout (defaults to [`DEFAULT_REQUEST_TIMEOUT`]).
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<PartnerConfig, PartnerConfigError> {
		let oauth_base_url = self.oauth_base_url.ok_or(PartnerConfigError::MissingOAuthBaseUrl)?;
		let client_id = self
			.client_id
			.filter(|value| !value.trim().is_empty())
			.ok_or(PartnerConfigError::MissingClientId)?;
		let client_secret = self
			.client_secret
			.filter(|value| !value.expose().is_empty())
			.ok_or(PartnerConfigError::MissingClientSecret)?;
		let redirect_uri = self.redirect_uri.ok_or(PartnerConfigError::MissingRedirectUri)?;
		let scope = match self.scope {
			Some(scope) => scope,
			None => ScopeSet::new(DEFAULT_SCOPES)?,
		};

		if scope.is_empty() {
			return Err(PartnerConfigError::EmptyScope);
		}

		let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

		if request_timeout.is_zero() {
			return Err(PartnerConfigError::ZeroRequestTimeout);
		}

		validate_endpoint("OAuth base", &oauth_base_url)?;
		validate_endpoint("redirect", &redirect_uri)?;

		let token_endpoint = token_endpoint_for(&oauth_base_url)?;

		Ok(PartnerConfig {
			oauth_base_url,
			token_endpoint,
			client_id,
			client_secret,
			redirect_uri,
			scope,
			request_timeout,
		})
	}
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPartnerConfig {
	oauth_base_url: String,
	client_id: String,
	client_secret: String,
	redirect_uri: String,
	#[serde(default)]
	scope: Option<Vec<String>>,
	#[serde(default)]
	request_timeout_ms: Option<u64>,
}
impl TryFrom<RawPartnerConfig> for PartnerConfig {
	type Error = PartnerConfigError;

	fn try_from(raw: RawPartnerConfig) -> Result<Self, Self::Error> {
		let mut builder = PartnerConfig::builder()
			.oauth_base_url(parse_url("OAuth base", &raw.oauth_base_url)?)
			.client_id(raw.client_id)
			.client_secret(raw.client_secret)
			.redirect_uri(parse_url("redirect", &raw.redirect_uri)?);

		if let Some(scope) = raw.scope {
			builder = builder.scope(ScopeSet::new(scope)?);
		}
		if let Some(ms) = raw.request_timeout_ms {
			builder = builder.request_timeout(StdDuration::from_millis(ms));
		}

		builder.build()
	}
}

fn parse_url(endpoint: &'static str, raw: &str) -> Result<Url, PartnerConfigError> {
	Url::parse(raw).map_err(|source| PartnerConfigError::InvalidUrl { endpoint, source })
}

fn token_endpoint_for(base: &Url) -> Result<Url, PartnerConfigError> {
	let joined = format!("{}/{TOKEN_ENDPOINT_PATH}", base.as_str().trim_end_matches('/'));

	parse_url("token", &joined)
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), PartnerConfigError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(PartnerConfigError::InsecureEndpoint { endpoint, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(addr)) => IpAddr::V4(addr).is_loopback(),
		Some(Host::Ipv6(addr)) => IpAddr::V6(addr).is_loopback(),
		None => false,
	}
}
