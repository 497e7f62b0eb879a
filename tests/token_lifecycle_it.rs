#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use time::macros;
// self
use partner_gate::{
	_preludet::*,
	auth::{CachedCredentials, OAuthCredentialInput, TokenOrigin},
	error::TokenResponseError,
	oauth::GrantType,
};

const NOW: OffsetDateTime = macros::datetime!(2025-10-02 08:30 UTC);

#[tokio::test]
async fn authorization_code_exchange_returns_tokens_anchored_at_now() {
	let server = MockServer::start_async().await;
	let (manager, _) = build_reqwest_test_manager(&server.base_url(), NOW);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"access-code","refresh_token":"refresh-code","expires_in":7200,"token_type":"Bearer"}"#,
			);
		})
		.await;
	let result = manager
		.acquire_or_refresh(&OAuthCredentialInput::authorization_code("code-live"), NOW)
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(result.access_token.expose(), "access-code");
	assert_eq!(result.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-code"));
	assert_eq!(result.expires_in_seconds, 7200);
	assert_eq!(result.issued_at, NOW);
	assert_eq!(result.origin, TokenOrigin::AuthorizationCode);
}

#[tokio::test]
async fn refresh_without_rotation_keeps_the_callers_refresh_token() {
	let server = MockServer::start_async().await;
	let (manager, clock) = build_reqwest_test_manager(&server.base_url(), NOW);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"access-rotated","expires_in":"900"}"#);
		})
		.await;

	clock.advance(Duration::minutes(10));

	let input = OAuthCredentialInput::Cached(
		CachedCredentials::default()
			.with_refresh_token("refresh-kept")
			.with_access_token("access-old", NOW + Duration::minutes(5)),
	);
	let result = manager.acquire_or_refresh_now(&input).await.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(result.origin, TokenOrigin::RefreshToken);
	assert_eq!(result.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-kept"));
	assert_eq!(result.issued_at, NOW + Duration::minutes(10));
	assert_eq!(result.valid_until(), NOW + Duration::minutes(25));
}

#[tokio::test]
async fn partner_rejection_carries_status_and_body() {
	let server = MockServer::start_async().await;
	let (manager, _) = build_reqwest_test_manager(&server.base_url(), NOW);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"redirect_uri mismatch"}"#);
		})
		.await;
	let err = manager
		.acquire_or_refresh(&OAuthCredentialInput::authorization_code("code-bad"), NOW)
		.await
		.expect_err("A 400 from the partner must fail the exchange.");

	mock.assert_async().await;

	match err {
		Error::OAuthExchangeFailed { grant, status, body } => {
			assert_eq!(grant, GrantType::AuthorizationCode);
			assert_eq!(status, 400);
			assert!(body.contains("redirect_uri mismatch"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(manager.exchange_metrics.failures(), 1);
}

#[tokio::test]
async fn malformed_success_body_is_a_token_response_error() {
	let server = MockServer::start_async().await;
	let (manager, _) = build_reqwest_test_manager(&server.base_url(), NOW);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"a","refresh_token":"r","expires_in":-5}"#);
		})
		.await;
	let err = manager
		.acquire_or_refresh(&OAuthCredentialInput::refresh_token("refresh-any"), NOW)
		.await
		.expect_err("Negative lifetimes must be rejected.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		Error::TokenResponse(TokenResponseError::NonPositiveExpiresIn { value: -5 })
	));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
	let (manager, _) = build_reqwest_test_manager("http://127.0.0.1:1", NOW);
	let err = manager
		.acquire_or_refresh(&OAuthCredentialInput::refresh_token("refresh-any"), NOW)
		.await
		.expect_err("A refused connection must fail the exchange.");

	assert!(matches!(err, Error::Transport(_)), "Unexpected error variant: {err:?}.");
}
