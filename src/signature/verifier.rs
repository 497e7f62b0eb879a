//! Drift-window and HMAC gates.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::SigningSecret,
	error::VerificationError,
	obs::{self, FlowKind, FlowSpan},
	signature::{CanonicalPayload, SignedMessage},
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age, in whole seconds, of an accepted signature.
pub const DRIFT_WINDOW_SECONDS: i64 = 60;

/// Stateless verifier for signed page loads and webhooks.
///
/// The window is fixed at [`DRIFT_WINDOW_SECONDS`]; timestamps from the future are rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignedMessageVerifier;
impl SignedMessageVerifier {
	/// Verifies `raw_header` over `payload` with `secret` at `now`.
	///
	/// Gates run in order and the first failure wins: parse, timestamp, then HMAC.
	pub fn verify(
		&self,
		raw_header: &str,
		payload: &JsonMap<String, JsonValue>,
		secret: &SigningSecret,
		now: OffsetDateTime,
	) -> Result<(), VerificationError> {
		let span = FlowSpan::new(FlowKind::Verify, "verify");
		let result = {
			let _guard = span.clone().entered();

			check(raw_header, payload, secret, now)
		};

		if let Err(err) = &result {
			span.record_failure(err.kind());
		}

		obs::record_result(FlowKind::Verify, &result);

		result
	}
}

fn check(
	raw_header: &str,
	payload: &JsonMap<String, JsonValue>,
	secret: &SigningSecret,
	now: OffsetDateTime,
) -> Result<(), VerificationError> {
	let message = SignedMessage::parse(raw_header)?;
	let timestamp = message.timestamp_seconds()?;
	let drift_seconds = drift_seconds(timestamp, now);

	if !(0..=DRIFT_WINDOW_SECONDS).contains(&drift_seconds) {
		return Err(VerificationError::SignatureExpired { drift_seconds });
	}

	let canonical = CanonicalPayload::new(payload, &message.timestamp);
	let expected = hex::encode(mac(secret, &canonical)?);

	if bool::from(expected.as_bytes().ct_eq(message.signature_hex.as_bytes())) {
		Ok(())
	} else {
		Err(VerificationError::InvalidSignature)
	}
}

/// Signs `payload` at the raw `timestamp` text, producing what a partner would send.
pub fn sign_payload(
	payload: &JsonMap<String, JsonValue>,
	secret: &SigningSecret,
	timestamp: &str,
) -> Result<SignedMessage, VerificationError> {
	let canonical = CanonicalPayload::new(payload, timestamp);

	Ok(SignedMessage {
		timestamp: timestamp.to_owned(),
		signature_hex: hex::encode(mac(secret, &canonical)?),
	})
}

fn mac(secret: &SigningSecret, canonical: &CanonicalPayload) -> Result<Vec<u8>, VerificationError> {
	let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
		.map_err(|_| VerificationError::InvalidSignature)?;

	mac.update(canonical.as_bytes());

	Ok(mac.finalize().into_bytes().to_vec())
}

// Whole seconds between the signature and `now`, truncated toward zero on millisecond values.
fn drift_seconds(timestamp: f64, now: OffsetDateTime) -> i64 {
	let timestamp_ms = (timestamp * 1_000.).trunc() as i128;
	let now_ms = now.unix_timestamp_nanos() / 1_000_000;
	let drift = now_ms.saturating_sub(timestamp_ms) / 1_000;

	drift.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
