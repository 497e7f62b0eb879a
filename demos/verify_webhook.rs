//! Demonstrates authenticating a partner webhook against a per-tenant secret kept in the
//! in-memory store, including what a replayed delivery looks like a few minutes later.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use partner_gate::{
	auth::{SigningSecret, TenantId},
	clock::{FixedClock, TokenClock},
	inbound::{InboundVerifier, WEBHOOK_SIGNATURE_HEADER},
	signature,
	store::{IntegrationRecord, IntegrationSecrets, IntegrationStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let tenant = TenantId::new("org-demo")?;
	let store = Arc::new(MemoryStore::default());

	store
		.save(IntegrationRecord::new(tenant.clone()).with_webhook_secret("demo-webhook-secret"))
		.await?;

	let clock = FixedClock::new(OffsetDateTime::now_utc());
	let shared: Arc<dyn TokenClock> = Arc::new(clock.clone());
	let verifier =
		InboundVerifier::new(Arc::new(IntegrationSecrets::webhook(store))).with_clock(shared);
	let body = json!({
		"event": "membership.created",
		"data": { "_id": "mem-42", "name": "Ada" },
		"memberId": null,
	});
	let serde_json::Value::Object(payload) = body.clone() else {
		unreachable!("The demo body is a JSON object.");
	};
	let header = signature::sign_payload(
		&payload,
		&SigningSecret::new("demo-webhook-secret"),
		&clock.now().unix_timestamp().to_string(),
	)?
	.header_value();

	println!("{WEBHOOK_SIGNATURE_HEADER}: {header}");

	let verified =
		verifier.verify_webhook(&tenant, Some(&header), body.to_string().as_bytes()).await?;

	println!("Accepted event `{}`.", verified["event"]);

	clock.advance(Duration::minutes(5));

	match verifier.verify_webhook(&tenant, Some(&header), body.to_string().as_bytes()).await {
		Ok(_) => println!("Replay was unexpectedly accepted."),
		Err(e) => println!("Replay rejected (unauthorized: {}): {e}", e.is_unauthorized()),
	}

	Ok(())
}
