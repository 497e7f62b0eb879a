//! Authorization-code exchange for first-time connections.

// self
use crate::{
	_prelude::*,
	auth::{TokenResult, TokenSecret},
	flows::TokenLifecycleManager,
	http::OAuthTransport,
	oauth::{self, GrantType, TokenRequestForm, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> TokenLifecycleManager<C, M>
where
	C: ?Sized + OAuthTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the partner's authorization `code`; results are anchored at `now`.
	///
	/// The configured `redirect_uri` is sent verbatim. A mismatch with the URI registered at
	/// authorization time comes back from the partner as [`Error::OAuthExchangeFailed`].
	pub async fn exchange_code(&self, code: &TokenSecret, now: OffsetDateTime) -> Result<TokenResult> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "exchange_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.exchange_metrics.record_attempt();

		let result = span
			.instrument(async {
				let form = TokenRequestForm::authorization_code(&self.config, code);
				let response = oauth::exchange(
					self.transport.as_ref(),
					self.transport_mapper.as_ref(),
					&self.config.token_endpoint,
					form,
					self.request_timeout,
				)
				.await?;

				Ok(response.into_result(GrantType::AuthorizationCode, now, None)?)
			})
			.await;

		self.exchange_metrics.record_outcome(&result);
		obs::record_result(KIND, &result);

		result
	}
}
