//! Deterministic payload serialization used as HMAC input.

// self
use crate::_prelude::*;

/// Field dropped from the signed payload when it is absent or falsy.
///
/// The partner signs some payloads without this field even though it may be present upstream,
/// so it is removed only when empty. No other optional field is treated this way.
pub const MEMBER_ID_FIELD: &str = "memberId";

/// Exact byte string fed into the HMAC: `canonical_json(payload) + "." + timestamp`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalPayload(String);
impl CanonicalPayload {
	/// Canonicalizes `payload` and appends the raw timestamp text.
	pub fn new(payload: &JsonMap<String, JsonValue>, timestamp: &str) -> Self {
		let mut canonical = canonical_json(payload);

		canonical.push('.');
		canonical.push_str(timestamp);

		Self(canonical)
	}

	/// Returns the canonical string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the canonical bytes.
	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_bytes()
	}
}

/// Compact JSON for `payload` with object keys sorted at every depth and an empty
/// [`MEMBER_ID_FIELD`] removed from the top level.
pub fn canonical_json(payload: &JsonMap<String, JsonValue>) -> String {
	let mut object = sorted_object(payload);

	if object.get(MEMBER_ID_FIELD).is_none_or(is_falsy) {
		object.remove(MEMBER_ID_FIELD);
	}

	JsonValue::Object(object).to_string()
}

// Mirrors the loose truthiness the partner's signer applies to `memberId`.
fn is_falsy(value: &JsonValue) -> bool {
	match value {
		JsonValue::Null => true,
		JsonValue::Bool(flag) => !flag,
		JsonValue::Number(number) => number.as_f64() == Some(0.0),
		JsonValue::String(text) => text.is_empty(),
		JsonValue::Array(_) | JsonValue::Object(_) => false,
	}
}

fn sorted_object(object: &JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
	let mut entries = object.iter().collect::<Vec<_>>();

	entries.sort_by(|(a, _), (b, _)| a.cmp(b));

	entries.into_iter().map(|(key, value)| (key.clone(), sorted_value(value))).collect()
}

fn sorted_value(value: &JsonValue) -> JsonValue {
	match value {
		JsonValue::Object(object) => JsonValue::Object(sorted_object(object)),
		JsonValue::Array(items) => JsonValue::Array(items.iter().map(sorted_value).collect()),
		other => other.clone(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn object(value: JsonValue) -> JsonMap<String, JsonValue> {
		match value {
			JsonValue::Object(map) => map,
			_ => panic!("Fixture must be a JSON object."),
		}
	}

	#[test]
	fn key_order_does_not_change_the_canonical_form() {
		let a: JsonMap<String, JsonValue> =
			serde_json::from_str(r#"{"b":1,"a":{"y":true,"x":[{"k2":1,"k1":2}]}}"#)
				.expect("Fixture should parse.");
		let b: JsonMap<String, JsonValue> =
			serde_json::from_str(r#"{"a":{"x":[{"k1":2,"k2":1}],"y":true},"b":1}"#)
				.expect("Fixture should parse.");

		assert_eq!(canonical_json(&a), canonical_json(&b));
		assert_eq!(canonical_json(&a), r#"{"a":{"x":[{"k1":2,"k2":1}],"y":true},"b":1}"#);
	}

	#[test]
	fn empty_member_id_is_dropped() {
		for empty in [json!(null), json!(""), json!(0), json!(false)] {
			let payload = object(json!({ "event": "member.created", "memberId": empty }));

			assert_eq!(canonical_json(&payload), r#"{"event":"member.created"}"#);
		}

		let present = object(json!({ "event": "member.created", "memberId": "m-1" }));

		assert_eq!(canonical_json(&present), r#"{"event":"member.created","memberId":"m-1"}"#);
	}

	#[test]
	fn other_empty_fields_are_kept() {
		let payload = object(json!({ "companyId": "", "memberId": "m-1" }));

		assert_eq!(canonical_json(&payload), r#"{"companyId":"","memberId":"m-1"}"#);
	}

	#[test]
	fn timestamp_text_is_appended_verbatim() {
		let payload = object(json!({ "organization": "org-1" }));
		let canonical = CanonicalPayload::new(&payload, "01700000000");

		assert_eq!(canonical.as_str(), r#"{"organization":"org-1"}.01700000000"#);
	}
}
