//! Demonstrates the connect-then-refresh lifecycle against a mocked partner token endpoint:
//! exchange the authorization code, persist the result, reuse it while fresh, and refresh it
//! once it nears expiry.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use partner_gate::{
	auth::{OAuthCredentialInput, TenantId},
	clock::{FixedClock, TokenClock},
	config::PartnerConfig,
	flows::ReqwestManager,
	store::{IntegrationRecord, IntegrationStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"expires_in\":3600}",
			);
		})
		.await;
	let config = PartnerConfig::builder()
		.oauth_base_url(Url::parse(&server.base_url())?)
		.client_id("demo-client")
		.client_secret("demo-secret")
		.redirect_uri(Url::parse("https://integration.example.com/integration/connect")?)
		.build()?;
	let clock = FixedClock::new(OffsetDateTime::now_utc());
	let shared: Arc<dyn TokenClock> = Arc::new(clock.clone());
	let manager = ReqwestManager::new(config)?.with_clock(shared);
	let store = MemoryStore::default();
	let tenant = TenantId::new("org-demo")?;

	store.save(IntegrationRecord::new(tenant.clone()).with_base_url("https://app.example.com")).await?;

	let connected =
		manager.acquire_or_refresh_now(&OAuthCredentialInput::authorization_code("demo-code")).await?;

	println!("Connected via {:?}; token valid until {}.", connected.origin, connected.valid_until());

	store.store_token(&tenant, connected).await?;

	for advance in [Duration::minutes(30), Duration::minutes(29) + Duration::seconds(30)] {
		clock.advance(advance);

		let Some(token) = store.fetch(&tenant).await?.and_then(|record| record.token) else {
			unreachable!("The demo tenant always carries a token after connecting.");
		};
		let result = manager.acquire_or_refresh_now(&OAuthCredentialInput::from(&token)).await?;

		println!("At {}: {:?}.", clock.now(), result.origin);

		store.store_token(&tenant, result).await?;
	}

	println!(
		"Exchanges attempted: {}; fast-path hits: {}.",
		manager.exchange_metrics.attempts(),
		manager.exchange_metrics.fast_path_hits()
	);

	token_mock.assert_hits_async(2).await;

	Ok(())
}
