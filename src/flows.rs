//! Token lifecycle orchestration: fast-path reuse, authorization-code and refresh exchanges.
//!
//! [`TokenLifecycleManager::acquire_or_refresh`] re-evaluates the caller's credentials on every
//! call and performs at most one token endpoint request. The manager holds no token state;
//! callers persist the returned [`TokenResult`] and hand it back later as
//! [`OAuthCredentialInput::Cached`].

pub mod auth_code;
pub mod common;
pub mod refresh;

mod exchange_metrics;

pub use common::*;
pub use exchange_metrics::ExchangeMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, OAuthCredentialInput, TokenOrigin, TokenResult, TokenSecret},
	clock::{SystemClock, TokenClock},
	config::PartnerConfig,
	error::ConfigError,
	http::OAuthTransport,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestTransport, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Manager specialized for the crate's default reqwest transport stack.
pub type ReqwestManager = TokenLifecycleManager<ReqwestTransport, ReqwestTransportErrorMapper>;

/// Acquires, reuses, or refreshes partner access tokens.
///
/// Concurrent calls for the same tenant are not deduplicated; wrap calls in
/// [`crate::ext::TenantSingleFlight`] when at most one exchange may be in flight.
#[derive(Clone)]
pub struct TokenLifecycleManager<C, M>
where
	C: ?Sized + OAuthTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Transport used for every token endpoint request.
	pub transport: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Static partner configuration (endpoint, client credentials, scope).
	pub config: PartnerConfig,
	/// Time source used by [`TokenLifecycleManager::acquire_or_refresh_now`].
	pub clock: Arc<dyn TokenClock>,
	/// Shared counters for exchange outcomes.
	pub exchange_metrics: Arc<ExchangeMetrics>,
	/// Timeout attached to each token endpoint request.
	pub request_timeout: Option<StdDuration>,
}
impl<C, M> TokenLifecycleManager<C, M>
where
	C: ?Sized + OAuthTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a manager that reuses the caller-provided transport + mapper pair.
	pub fn with_transport(
		config: PartnerConfig,
		transport: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let request_timeout = Some(config.request_timeout);

		Self {
			transport: transport.into(),
			transport_mapper: mapper.into(),
			config,
			clock: Arc::new(SystemClock),
			exchange_metrics: Default::default(),
			request_timeout,
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn TokenClock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the per-request timeout; `None` leaves the transport's own default in place.
	pub fn with_request_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Returns a usable access token for `input`, evaluated at `now`.
	///
	/// - A cached access token valid strictly beyond `now + 60s` is returned as-is.
	/// - Otherwise a cached refresh token triggers a refresh-token exchange.
	/// - An authorization code triggers an authorization-code exchange.
	///
	/// Transport and partner failures are returned unmodified and never retried.
	pub async fn acquire_or_refresh(
		&self,
		input: &OAuthCredentialInput,
		now: OffsetDateTime,
	) -> Result<TokenResult> {
		match common::decide(input, now) {
			TokenDecision::Reuse { access_token, valid_until } =>
				Ok(self.reuse(input, access_token, valid_until, now)),
			TokenDecision::RefreshGrant { refresh_token, access_token } =>
				self.refresh(refresh_token, access_token, now).await,
			TokenDecision::AuthorizationCodeGrant { code } => self.exchange_code(code, now).await,
			TokenDecision::MissingRefreshToken => Err(ConfigError::MissingRefreshToken.into()),
		}
	}

	/// [`Self::acquire_or_refresh`] evaluated at the injected clock's current instant.
	pub async fn acquire_or_refresh_now(&self, input: &OAuthCredentialInput) -> Result<TokenResult> {
		self.acquire_or_refresh(input, self.clock.now()).await
	}

	fn reuse(
		&self,
		input: &OAuthCredentialInput,
		access_token: &TokenSecret,
		valid_until: OffsetDateTime,
		now: OffsetDateTime,
	) -> TokenResult {
		let refresh_token = match input {
			OAuthCredentialInput::Cached(CachedCredentials { refresh_token, .. }) =>
				refresh_token.clone(),
			OAuthCredentialInput::AuthorizationCode { .. } => None,
		};

		self.exchange_metrics.record_fast_path();
		obs::record_flow_outcome(FlowKind::FastPath, FlowOutcome::Success);

		TokenResult {
			access_token: access_token.clone(),
			refresh_token,
			expires_in_seconds: (valid_until - now).whole_seconds(),
			issued_at: now,
			origin: TokenOrigin::FastPath,
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenLifecycleManager<ReqwestTransport, ReqwestTransportErrorMapper> {
	/// Creates a manager that provisions its own redirect-free reqwest transport.
	pub fn new(config: PartnerConfig) -> Result<Self> {
		Ok(Self::with_transport(config, ReqwestTransport::new()?, Arc::new(ReqwestTransportErrorMapper)))
	}
}
impl<C, M> Debug for TokenLifecycleManager<C, M>
where
	C: ?Sized + OAuthTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenLifecycleManager")
			.field("config", &self.config)
			.field("request_timeout", &self.request_timeout)
			.field("exchange_metrics", &self.exchange_metrics)
			.finish()
	}
}
