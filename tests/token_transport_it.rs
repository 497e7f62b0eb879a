#![cfg(feature = "reqwest")]

// std
use std::collections::VecDeque;
// crates.io
use time::macros;
use url::form_urlencoded;
// self
use partner_gate::{
	_preludet::*,
	auth::{CachedCredentials, OAuthCredentialInput, TenantId, TokenOrigin, TokenResult},
	error::{ConfigError, TransportError},
	ext::TenantSingleFlight,
	flows::TokenLifecycleManager,
	http::OAuthTransport,
	oauth::{
		GrantType, TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http},
	},
	store::{IntegrationRecord, IntegrationStore, MemoryStore},
};

const NOW: OffsetDateTime = macros::datetime!(2025-10-01 12:00 UTC);
const TOKEN_BODY: &str =
	r#"{"access_token":"access-new","refresh_token":"refresh-new","expires_in":3600}"#;

#[derive(Clone, Debug)]
enum FakeTransportError {
	Reset,
	TimedOut,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Reset => write!(f, "Connection reset."),
			Self::TimedOut => write!(f, "Deadline elapsed."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Debug)]
enum Scripted {
	Respond(u16, &'static str),
	Fail(FakeTransportError),
}

#[derive(Clone, Debug)]
struct RecordedCall {
	uri: String,
	content_type: Option<String>,
	form: HashMap<String, String>,
	timeout: Option<StdDuration>,
}

#[derive(Default)]
struct FakeState {
	script: VecDeque<Scripted>,
	calls: Vec<RecordedCall>,
}

#[derive(Clone, Default)]
struct FakeTransport(Arc<Mutex<FakeState>>);
impl FakeTransport {
	fn scripted(script: impl IntoIterator<Item = Scripted>) -> Self {
		let transport = Self::default();

		transport.0.lock().script.extend(script);

		transport
	}

	fn calls(&self) -> Vec<RecordedCall> {
		self.0.lock().calls.clone()
	}
}
impl OAuthTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = FakeTransportError;

	fn handle(&self, timeout: Option<StdDuration>) -> Self::Handle {
		FakeHandle { state: self.0.clone(), timeout }
	}
}

struct FakeHandle {
	state: Arc<Mutex<FakeState>>,
	timeout: Option<StdDuration>,
}
impl<'c> AsyncHttpClient<'c> for FakeHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let call = RecordedCall {
				uri: request.uri().to_string(),
				content_type: request
					.headers()
					.get(http::header::CONTENT_TYPE)
					.and_then(|value| value.to_str().ok())
					.map(str::to_owned),
				form: form_urlencoded::parse(request.body()).into_owned().collect(),
				timeout: self.timeout,
			};
			let next = {
				let mut state = self.state.lock();

				state.calls.push(call);
				state.script.pop_front().expect("Fake transport ran out of scripted responses.")
			};

			match next {
				Scripted::Respond(status, body) => Ok(http::Response::builder()
					.status(status)
					.header(http::header::CONTENT_TYPE, "application/json")
					.body(body.as_bytes().to_vec())
					.expect("Scripted response should build.")),
				Scripted::Fail(err) => Err(HttpClientError::Reqwest(Box::new(err))),
			}
		})
	}
}

#[derive(Clone, Copy, Default)]
struct FakeMapper;
impl TransportErrorMapper<FakeTransportError> for FakeMapper {
	fn map_transport_error(&self, _grant: GrantType, err: HttpClientError<FakeTransportError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => match *inner {
				FakeTransportError::TimedOut => TransportError::timeout(*inner).into(),
				FakeTransportError::Reset => TransportError::network(*inner).into(),
			},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransportError::Io(std::io::Error::other(other.to_string())).into(),
		}
	}
}

type FakeManager = TokenLifecycleManager<FakeTransport, FakeMapper>;

fn manager(script: impl IntoIterator<Item = Scripted>) -> (FakeManager, FakeTransport) {
	let transport = FakeTransport::scripted(script);
	let manager = FakeManager::with_transport(
		test_partner_config("https://identity.example.com"),
		transport.clone(),
		FakeMapper,
	);

	(manager, transport)
}

#[tokio::test]
async fn fresh_cached_token_skips_the_transport() {
	let (manager, transport) = manager([]);
	let input = OAuthCredentialInput::Cached(
		CachedCredentials::default().with_access_token("abc", NOW + Duration::seconds(120)),
	);
	let result =
		manager.acquire_or_refresh(&input, NOW).await.expect("Fast path should not fail.");

	assert_eq!(result.access_token.expose(), "abc");
	assert_eq!(result.expires_in_seconds, 120);
	assert_eq!(result.origin, TokenOrigin::FastPath);
	assert!(result.refresh_token.is_none());
	assert!(transport.calls().is_empty());
	assert_eq!(manager.exchange_metrics.fast_path_hits(), 1);
	assert_eq!(manager.exchange_metrics.attempts(), 0);
}

#[tokio::test]
async fn token_at_the_margin_is_refreshed_with_the_expiring_access_token() {
	let (manager, transport) = manager([Scripted::Respond(200, TOKEN_BODY)]);
	let input = OAuthCredentialInput::Cached(
		CachedCredentials::default()
			.with_refresh_token("refresh-old")
			.with_access_token("access-old", NOW + Duration::seconds(60)),
	);
	let result = manager.acquire_or_refresh(&input, NOW).await.expect("Refresh should succeed.");
	let calls = transport.calls();

	assert_eq!(result.origin, TokenOrigin::RefreshToken);
	assert_eq!(result.access_token.expose(), "access-new");
	assert_eq!(calls.len(), 1);

	let call = &calls[0];

	assert_eq!(call.uri, "https://identity.example.com/oauth/token");
	assert_eq!(call.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert_eq!(call.form.get("grant_type").map(String::as_str), Some("refresh_token"));
	assert_eq!(call.form.get("refresh_token").map(String::as_str), Some("refresh-old"));
	assert_eq!(call.form.get("access_token").map(String::as_str), Some("access-old"));
	assert_eq!(call.form.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
	assert_eq!(call.form.get("client_secret").map(String::as_str), Some(TEST_CLIENT_SECRET));
	assert_eq!(
		call.form.get("scope").map(String::as_str),
		Some("officernd.api.read officernd.api.write")
	);
	assert!(!call.form.contains_key("code"));
}

#[tokio::test]
async fn authorization_code_input_selects_the_code_grant() {
	let (manager, transport) = manager([Scripted::Respond(200, TOKEN_BODY)]);
	let result = manager
		.acquire_or_refresh(&OAuthCredentialInput::authorization_code("code-123"), NOW)
		.await
		.expect("Code exchange should succeed.");
	let call = transport.calls().pop().expect("One call should be recorded.");

	assert_eq!(result.origin, TokenOrigin::AuthorizationCode);
	assert_eq!(result.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-new"));
	assert_eq!(result.valid_until(), NOW + Duration::hours(1));
	assert_eq!(call.form.get("grant_type").map(String::as_str), Some("authorization_code"));
	assert_eq!(call.form.get("code").map(String::as_str), Some("code-123"));
	assert_eq!(call.form.get("redirect_uri").map(String::as_str), Some(TEST_REDIRECT_URI));
	assert!(!call.form.contains_key("refresh_token"));
}

#[tokio::test]
async fn transport_failures_surface_once_without_retry() {
	let (manager, transport) = manager([
		Scripted::Fail(FakeTransportError::Reset),
		Scripted::Fail(FakeTransportError::TimedOut),
	]);
	let input = OAuthCredentialInput::refresh_token("refresh-old");
	let network = manager
		.acquire_or_refresh(&input, NOW)
		.await
		.expect_err("Connection resets must fail the call.");
	let timeout = manager
		.acquire_or_refresh(&input, NOW)
		.await
		.expect_err("Timeouts must fail the call.");

	assert!(matches!(network, Error::Transport(TransportError::Network { .. })));
	assert!(matches!(timeout, Error::Transport(TransportError::Timeout { .. })));
	assert!(!network.is_unauthorized());
	assert_eq!(transport.calls().len(), 2);
	assert_eq!(manager.exchange_metrics.failures(), 2);
}

#[tokio::test]
async fn missing_refresh_token_fails_before_any_call() {
	let (manager, transport) = manager([]);
	let stale = OAuthCredentialInput::Cached(
		CachedCredentials::default().with_access_token("abc", NOW - Duration::seconds(1)),
	);
	let err = manager
		.acquire_or_refresh(&stale, NOW)
		.await
		.expect_err("Stale tokens without refresh tokens cannot be renewed.");

	assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
	assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn request_timeout_reaches_every_handle() {
	let (manager, transport) =
		manager([Scripted::Respond(200, TOKEN_BODY), Scripted::Respond(200, TOKEN_BODY)]);
	let input = OAuthCredentialInput::refresh_token("refresh-old");

	manager.acquire_or_refresh(&input, NOW).await.expect("Refresh should succeed.");

	let manager = manager.with_request_timeout(Some(StdDuration::from_millis(750)));

	manager.acquire_or_refresh(&input, NOW).await.expect("Refresh should succeed.");

	let timeouts = transport.calls().into_iter().map(|call| call.timeout).collect::<Vec<_>>();

	assert_eq!(timeouts, [Some(StdDuration::from_secs(3)), Some(StdDuration::from_millis(750))]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_flight_wrapper_deduplicates_concurrent_refreshes() {
	let (manager, transport) = manager([Scripted::Respond(200, TOKEN_BODY)]);
	let manager = Arc::new(manager);
	let store = Arc::new(MemoryStore::default());
	let flights = TenantSingleFlight::default();
	let tenant = TenantId::new("org-race").expect("Tenant fixture should be valid.");
	let mut seeded = IntegrationRecord::new(tenant.clone());

	seeded.token = Some(TokenResult {
		access_token: secret("access-old"),
		refresh_token: Some(secret("refresh-old")),
		expires_in_seconds: 30,
		issued_at: NOW,
		origin: TokenOrigin::RefreshToken,
	});
	store.save(seeded).await.expect("Seeding the store should succeed.");

	let mut handles = Vec::new();

	for _ in 0..4 {
		let (manager, store, flights, tenant) =
			(manager.clone(), store.clone(), flights.clone(), tenant.clone());

		handles.push(tokio::spawn(async move {
			flights
				.run(&tenant, || async {
					let record = store
						.fetch(&tenant)
						.await?
						.expect("Seeded record should exist.");
					let cached = record.token.as_ref().map(OAuthCredentialInput::from).ok_or(
						ConfigError::MissingRefreshToken,
					)?;
					let token = manager.acquire_or_refresh(&cached, NOW).await?;

					store.store_token(&tenant, token.clone()).await?;

					Ok::<_, Error>(token)
				})
				.await
		}));
	}

	for handle in handles {
		let token = handle
			.await
			.expect("Task should not panic.")
			.expect("Every caller should end up with a token.");

		assert_eq!(token.access_token.expose(), "access-new");
	}

	assert_eq!(transport.calls().len(), 1);
	assert_eq!(manager.exchange_metrics.fast_path_hits(), 3);
}
