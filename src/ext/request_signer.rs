//! Attaching issued tokens to outbound partner API requests.

// self
use crate::auth::TokenResult;

/// Attaches a [`TokenResult`] to an outbound request without fixing the HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it carrying the token's authorization.
	fn attach_token(&self, request: Request, token: &TokenResult) -> Result<Request, Error>;
}

/// Adds `Authorization: Bearer <access_token>` to reqwest requests.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, std::convert::Infallible> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &TokenResult,
	) -> Result<reqwest::RequestBuilder, std::convert::Infallible> {
		Ok(request.bearer_auth(token.access_token.expose()))
	}
}
