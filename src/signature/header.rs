//! `t=<ts>,v1=<hex>` signature strings.

// self
use crate::{_prelude::*, error::VerificationError};

/// Key carrying the Unix timestamp (seconds).
pub const TIMESTAMP_KEY: &str = "t";
/// Key carrying the hex-encoded HMAC.
pub const SIGNATURE_KEY: &str = "v1";

/// Parsed signature string.
///
/// The timestamp is kept as received because the signed input embeds the literal text, not a
/// re-rendered number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
	/// Raw `t` value.
	pub timestamp: String,
	/// Raw `v1` value.
	pub signature_hex: String,
}
impl SignedMessage {
	/// Parses a signature string.
	///
	/// Segments are split on `,`, then on `=`. The first component names the key and the *last*
	/// component is the value, so values may contain `=`. Keys are matched order-independently,
	/// unknown keys and segments without `=` are skipped, and the first occurrence of a key wins.
	/// A missing or empty `t` or `v1` yields [`VerificationError::MissingSignature`].
	pub fn parse(raw: &str) -> Result<Self, VerificationError> {
		let mut timestamp = None;
		let mut signature_hex = None;

		for segment in raw.split(',') {
			let mut parts = segment.split('=');
			let key = parts.next().unwrap_or_default().trim();
			let Some(value) = parts.next_back() else {
				continue;
			};
			let value = value.trim();
			let slot = match key {
				TIMESTAMP_KEY => &mut timestamp,
				SIGNATURE_KEY => &mut signature_hex,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value);
			}
		}

		match (timestamp, signature_hex) {
			(Some(timestamp), Some(signature_hex))
				if !timestamp.is_empty() && !signature_hex.is_empty() =>
				Ok(Self { timestamp: timestamp.to_owned(), signature_hex: signature_hex.to_owned() }),
			_ => Err(VerificationError::MissingSignature),
		}
	}

	/// Interprets the timestamp as (possibly fractional) Unix seconds.
	pub fn timestamp_seconds(&self) -> Result<f64, VerificationError> {
		self.timestamp
			.parse::<f64>()
			.ok()
			.filter(|value| value.is_finite())
			.ok_or_else(|| VerificationError::MalformedTimestamp { value: self.timestamp.clone() })
	}

	/// Renders the `t=<ts>,v1=<hex>` form.
	pub fn header_value(&self) -> String {
		format!("{TIMESTAMP_KEY}={},{SIGNATURE_KEY}={}", self.timestamp, self.signature_hex)
	}
}
impl Display for SignedMessage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.header_value())
	}
}
impl FromStr for SignedMessage {
	type Err = VerificationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
