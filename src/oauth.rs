//! Partner token endpoint exchange: form encoding, one transport call, response decoding.

pub mod request;
pub mod response;

pub use oauth2;
pub use request::*;
pub use response::*;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::OAuthTransport,
};

/// OAuth 2.0 grants used against the partner token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// First-time connection with an authorization code.
	AuthorizationCode,
	/// Renewal with a refresh token.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 `grant_type` value.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(&self, grant: GrantType, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, _grant: GrantType, err: HttpClientError<ReqwestError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					TransportError::from(*inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Io(std::io::Error::other(message)).into(),
			_ => TransportError::Io(std::io::Error::other("Unrecognized HTTP client error.")).into(),
		}
	}
}

/// Performs exactly one token endpoint call for `form`.
///
/// Transport failures go through `mapper` untouched by any retry; non-2xx answers become
/// [`Error::OAuthExchangeFailed`] with the partner's status and body.
pub(crate) async fn exchange<C, M>(
	transport: &C,
	mapper: &M,
	endpoint: &Url,
	form: TokenRequestForm,
	timeout: Option<StdDuration>,
) -> Result<TokenEndpointResponse>
where
	C: ?Sized + OAuthTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let grant = form.grant();
	let request = form.into_http_request(endpoint)?;
	let handle = transport.handle(timeout);
	let response =
		handle.call(request).await.map_err(|err| mapper.map_transport_error(grant, err))?;
	let status = response.status();

	if !status.is_success() {
		return Err(Error::OAuthExchangeFailed {
			grant,
			status: status.as_u16(),
			body: String::from_utf8_lossy(response.body()).into_owned(),
		});
	}

	Ok(TokenEndpointResponse::decode(status.as_u16(), response.body())?)
}
