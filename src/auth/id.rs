//! Tenant identifiers used to key signing secrets and integration records.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const TENANT_ID_MAX_LEN: usize = 128;

/// Error returned when tenant identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Tenant identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Tenant identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed byte length.
	#[error("Tenant identifier exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Partner organization (or integration instance) that owns a signing secret.
///
/// The partner hands these out as opaque ids (`organizationId` query parameter, the `orgId`
/// segment of webhook URLs); only emptiness, whitespace, and length are checked.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);
impl TenantId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for TenantId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for TenantId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for TenantId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<TenantId> for String {
	fn from(value: TenantId) -> Self {
		value.0
	}
}
impl TryFrom<String> for TenantId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for TenantId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for TenantId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Tenant({})", self.0)
	}
}
impl Display for TenantId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > TENANT_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { max: TENANT_ID_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tenant_ids_reject_padding_and_blank_values() {
		assert!(TenantId::new(" 5f1a2b3c").is_err(), "Leading whitespace must be rejected.");
		assert!(TenantId::new("5f1a2b3c ").is_err(), "Trailing whitespace must be rejected.");
		assert_eq!(TenantId::new(""), Err(IdentifierError::Empty));

		let tenant = TenantId::new("5f1a2b3c").expect("Tenant fixture should be considered valid.");

		assert_eq!(tenant.as_ref(), "5f1a2b3c");
		assert_eq!(format!("{tenant:?}"), "Tenant(5f1a2b3c)");
	}

	#[test]
	fn serde_enforces_validation() {
		let tenant: TenantId =
			serde_json::from_str("\"org-42\"").expect("Tenant should deserialize successfully.");

		assert_eq!(tenant.as_ref(), "org-42");
		assert!(serde_json::from_str::<TenantId>("\"with space\"").is_err());
		assert_eq!(
			serde_json::to_string(&tenant).expect("Tenant should serialize."),
			"\"org-42\""
		);
	}

	#[test]
	fn length_limit_is_inclusive() {
		TenantId::new("a".repeat(TENANT_ID_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			TenantId::new("a".repeat(TENANT_ID_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { max: TENANT_ID_MAX_LEN })
		);
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<TenantId, u8> = HashMap::from_iter([(
			TenantId::new("org-acme").expect("Tenant used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("org-acme"), Some(&7));
	}
}
