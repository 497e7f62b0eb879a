//! Partner-integration gatekeeper: acquire and refresh delegated OAuth 2.0 tokens for a partner
//! platform, and authenticate the signed page loads and webhooks it sends back.
//!
//! The two stateless cores are [`flows::TokenLifecycleManager`] and
//! [`signature::SignedMessageVerifier`]. Everything they need (cached tokens, signing secrets,
//! the current instant) is handed to them per call; persistence lives behind the
//! [`store`] contracts owned by the caller.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod ext;
pub mod flows;
pub mod http;
pub mod inbound;
pub mod oauth;
pub mod obs;
pub mod signature;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{SigningSecret, TokenSecret},
		clock::{FixedClock, TokenClock},
		config::PartnerConfig,
		flows::TokenLifecycleManager,
		http::ReqwestTransport,
		oauth::ReqwestTransportErrorMapper,
		signature,
	};

	/// Manager type alias used by reqwest-backed integration tests.
	pub type ReqwestTestManager = TokenLifecycleManager<ReqwestTransport, ReqwestTransportErrorMapper>;

	/// Client identifier baked into [`test_partner_config`].
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret baked into [`test_partner_config`].
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// Redirect URI baked into [`test_partner_config`].
	pub const TEST_REDIRECT_URI: &str = "https://integration.example.com/integration/connect";

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Partner configuration pointing its OAuth base URL at `oauth_base_url`.
	pub fn test_partner_config(oauth_base_url: &str) -> PartnerConfig {
		PartnerConfig::builder()
			.oauth_base_url(
				Url::parse(oauth_base_url).expect("Mock OAuth base URL should parse successfully."),
			)
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.redirect_uri(
				Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI should parse successfully."),
			)
			.build()
			.expect("Test partner configuration should build successfully.")
	}

	/// Constructs a [`TokenLifecycleManager`] backed by the reqwest transport and a
	/// [`FixedClock`] pinned at `now`.
	pub fn build_reqwest_test_manager(
		oauth_base_url: &str,
		now: OffsetDateTime,
	) -> (ReqwestTestManager, FixedClock) {
		let clock = FixedClock::new(now);
		let shared: Arc<dyn TokenClock> = Arc::new(clock.clone());
		let manager = ReqwestTestManager::with_transport(
			test_partner_config(oauth_base_url),
			test_reqwest_transport(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_clock(shared);

		(manager, clock)
	}

	/// Produces a `t=<ts>,v1=<hex>` header for `payload` signed with `secret` at `timestamp`.
	pub fn signed_header(payload: &JsonMap<String, JsonValue>, secret: &str, timestamp: i64) -> String {
		signature::sign_payload(payload, &SigningSecret::new(secret), &timestamp.to_string())
			.expect("Signing a test payload should succeed.")
			.header_value()
	}

	/// Wraps a raw string as a [`TokenSecret`].
	pub fn secret(value: &str) -> TokenSecret {
		TokenSecret::new(value)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
