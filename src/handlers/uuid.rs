//! Built-in handler for UUID-tagged fields.

use serde_json::Value;
use uuid::Uuid;

use super::{HandlerError, TypeHandler, wire_str};

/// Validates UUID strings.
///
/// Accepts any form `uuid::Uuid` can parse (hyphenated, simple, urn) and
/// stores the canonical hyphenated lowercase form, so records always hold
/// one spelling.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{TypeHandler, UuidHandler};
/// use serde_json::json;
///
/// let handler = UuidHandler;
/// let wire = json!("67E55044-10B1-426F-9247-BB680E5FE0C8");
/// let stored = handler.deserialize(&wire).unwrap();
/// assert_eq!(stored, json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
/// assert!(handler.validate(&json!("not-a-uuid")).is_err());
/// ```
pub struct UuidHandler;

impl UuidHandler {
	fn parse(text: &str) -> Result<Uuid, HandlerError> {
		Uuid::parse_str(text).map_err(|_| HandlerError::expected("a valid UUID"))
	}
}

impl TypeHandler for UuidHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		wire_str(stored, "a UUID string in the record")?;
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		let text = wire_str(wire, "a valid UUID")?;
		let parsed = Self::parse(text)?;
		Ok(Value::String(parsed.hyphenated().to_string()))
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		let text = wire_str(wire, "a valid UUID")?;
		Self::parse(text).map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("67e55044-10b1-426f-9247-bb680e5fe0c8")]
	#[case("67E55044-10B1-426F-9247-BB680E5FE0C8")]
	#[case("67e5504410b1426f9247bb680e5fe0c8")]
	fn test_valid_uuids(#[case] uuid: &str) {
		// Arrange
		let handler = UuidHandler;

		// Act + Assert
		assert!(handler.validate(&json!(uuid)).is_ok(), "expected '{uuid}' to be valid");
	}

	#[rstest]
	#[case("")]
	#[case("not-a-uuid")]
	#[case("67e55044-10b1-426f-9247")]
	#[case("zze55044-10b1-426f-9247-bb680e5fe0c8")]
	fn test_invalid_uuids(#[case] uuid: &str) {
		// Arrange
		let handler = UuidHandler;

		// Act + Assert
		assert!(handler.validate(&json!(uuid)).is_err(), "expected '{uuid}' to be invalid");
	}

	#[test]
	fn test_deserialize_normalizes_to_hyphenated_lowercase() {
		let handler = UuidHandler;
		let stored = handler
			.deserialize(&json!("67E5504410B1426F9247BB680E5FE0C8"))
			.unwrap();
		assert_eq!(stored, json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
	}

	#[test]
	fn test_non_string_wire_node_is_rejected() {
		let handler = UuidHandler;
		assert!(handler.validate(&json!(123)).is_err());
	}
}
