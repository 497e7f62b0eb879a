//! `application/x-www-form-urlencoded` bodies for the partner token endpoint.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::TokenSecret, config::PartnerConfig, error::ConfigError, oauth::GrantType};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SENSITIVE_FIELDS: [&str; 4] = ["client_secret", "code", "refresh_token", "access_token"];

/// Ordered form fields for one grant.
///
/// Every form starts with `client_id`, `client_secret`, `grant_type`, and `scope`; the grant
/// then appends its own fields.
#[derive(Clone)]
pub struct TokenRequestForm {
	grant: GrantType,
	fields: Vec<(&'static str, String)>,
}
impl TokenRequestForm {
	/// Form for the authorization-code grant; `redirect_uri` comes from the configuration and
	/// must match the URI registered with the partner.
	pub fn authorization_code(config: &PartnerConfig, code: &TokenSecret) -> Self {
		let mut form = Self::base(config, GrantType::AuthorizationCode);

		form.push("code", code.expose());
		form.push("redirect_uri", config.redirect_uri.as_str());

		form
	}

	/// Form for the refresh-token grant; the expiring access token rides along when known.
	pub fn refresh_token(
		config: &PartnerConfig,
		refresh_token: &TokenSecret,
		access_token: Option<&TokenSecret>,
	) -> Self {
		let mut form = Self::base(config, GrantType::RefreshToken);

		form.push("refresh_token", refresh_token.expose());

		if let Some(access) = access_token {
			form.push("access_token", access.expose());
		}

		form
	}

	fn base(config: &PartnerConfig, grant: GrantType) -> Self {
		let mut form = Self { grant, fields: Vec::with_capacity(8) };

		form.push("client_id", &config.client_id);
		form.push("client_secret", config.client_secret.expose());
		form.push("grant_type", grant.as_str());
		form.push("scope", &config.scope.normalized());

		form
	}

	fn push(&mut self, key: &'static str, value: &str) {
		self.fields.push((key, value.to_owned()));
	}

	/// Grant this form was built for.
	pub fn grant(&self) -> GrantType {
		self.grant
	}

	/// Returns the value of `key`, if present.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.fields.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
	}

	/// Field names in wire order.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().map(|(name, _)| *name)
	}

	/// URL-encodes the fields in order.
	pub fn encode(&self) -> String {
		let mut serializer = Serializer::new(String::new());

		for (key, value) in &self.fields {
			serializer.append_pair(key, value);
		}

		serializer.finish()
	}

	/// Builds the `POST` request for `endpoint`.
	pub fn into_http_request(self, endpoint: &Url) -> Result<HttpRequest, ConfigError> {
		let body = self.encode().into_bytes();

		Ok(Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.body(body)?)
	}
}
impl Debug for TokenRequestForm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (key, value) in &self.fields {
			if SENSITIVE_FIELDS.contains(key) {
				map.entry(key, &"<redacted>");
			} else {
				map.entry(key, value);
			}
		}

		map.finish()
	}
}
