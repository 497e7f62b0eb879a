//! Refresh-token exchange.
//!
//! A failed refresh leaves nothing behind: the caller's previously persisted token is untouched
//! because the manager never owned it. A partner that does not rotate refresh tokens gets the
//! caller's refresh token echoed back in the [`TokenResult`].

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
	/// Performs one `grant_type=refresh_token` exchange; results are anchored at `now`.
	pub async fn refresh(
		&self,
		refresh_token: &TokenSecret,
		access_token: Option<&TokenSecret>,
		now: OffsetDateTime,
	) -> Result<TokenResult> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.exchange_metrics.record_attempt();

		let result = span
			.instrument(async {
				let form = TokenRequestForm::refresh_token(&self.config, refresh_token, access_token);
				let response = oauth::exchange(
					self.transport.as_ref(),
					self.transport_mapper.as_ref(),
					&self.config.token_endpoint,
					form,
					self.request_timeout,
				)
				.await?;

				Ok(response.into_result(GrantType::RefreshToken, now, Some(refresh_token))?)
			})
			.await;

		self.exchange_metrics.record_outcome(&result);
		obs::record_result(KIND, &result);

		result
	}
}
