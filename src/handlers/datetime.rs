//! Built-in handler for datetime-tagged fields.

use chrono::DateTime;
use serde_json::Value;

use super::{HandlerError, TypeHandler, wire_str};

/// Validates RFC 3339 datetime strings; stored and wire forms are both the
/// datetime text, unchanged.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{DateTimeHandler, TypeHandler};
/// use serde_json::json;
///
/// let handler = DateTimeHandler;
/// assert!(handler.validate(&json!("2024-06-01T12:30:00Z")).is_ok());
/// assert!(handler.validate(&json!("2024-06-01T12:30:00+09:00")).is_ok());
/// assert!(handler.validate(&json!("2024-06-01")).is_err());
/// ```
pub struct DateTimeHandler;

impl DateTimeHandler {
	fn check(text: &str) -> Result<(), HandlerError> {
		DateTime::parse_from_rfc3339(text)
			.map(|_| ())
			.map_err(|_| HandlerError::expected("an RFC 3339 datetime"))
	}
}

impl TypeHandler for DateTimeHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		wire_str(stored, "a datetime string in the record")?;
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		let text = wire_str(wire, "an RFC 3339 datetime")?;
		Self::check(text)?;
		Ok(wire.clone())
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		let text = wire_str(wire, "an RFC 3339 datetime")?;
		Self::check(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("2024-06-01T12:30:00Z")]
	#[case("2024-06-01T12:30:00.250Z")]
	#[case("2024-06-01T12:30:00+09:00")]
	fn test_valid_datetimes(#[case] datetime: &str) {
		// Arrange
		let handler = DateTimeHandler;

		// Act + Assert
		assert!(
			handler.validate(&json!(datetime)).is_ok(),
			"expected '{datetime}' to be valid"
		);
	}

	#[rstest]
	#[case("")]
	#[case("2024-06-01")]
	#[case("2024-06-01 12:30:00")]
	#[case("12:30:00Z")]
	#[case("2024-06-01T25:00:00Z")]
	fn test_invalid_datetimes(#[case] datetime: &str) {
		// Arrange
		let handler = DateTimeHandler;

		// Act + Assert
		assert!(
			handler.validate(&json!(datetime)).is_err(),
			"expected '{datetime}' to be invalid"
		);
	}

	#[test]
	fn test_non_string_wire_node_is_rejected() {
		let handler = DateTimeHandler;
		assert!(handler.validate(&json!(false)).is_err());
	}
}
