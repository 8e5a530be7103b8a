//! Built-in handler for email-tagged fields.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{HandlerError, TypeHandler, wire_str};

// Anchored local@domain shape: dotted local part with the usual special
// characters, dotted domain with a 2+ letter top level.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
		.expect("EMAIL_REGEX: invalid regex pattern")
});

/// Validates email-shaped strings; stored and wire forms are both the
/// address text, unchanged.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{EmailHandler, TypeHandler};
/// use serde_json::json;
///
/// let handler = EmailHandler;
/// assert!(handler.validate(&json!("user@example.com")).is_ok());
/// assert!(handler.validate(&json!("user.name+tag@example.co.uk")).is_ok());
/// assert!(handler.validate(&json!("not-an-email")).is_err());
/// ```
pub struct EmailHandler;

impl EmailHandler {
	fn check(text: &str) -> Result<(), HandlerError> {
		if EMAIL_REGEX.is_match(text) {
			Ok(())
		} else {
			Err(HandlerError::expected("a valid email address"))
		}
	}
}

impl TypeHandler for EmailHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		wire_str(stored, "an email string in the record")?;
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		let text = wire_str(wire, "a valid email address")?;
		Self::check(text)?;
		Ok(wire.clone())
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		let text = wire_str(wire, "a valid email address")?;
		Self::check(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("test@example.com")]
	#[case("user.name+tag@example.co.uk")]
	#[case("a_b%c-d@sub.domain.org")]
	fn test_valid_emails(#[case] email: &str) {
		// Arrange
		let handler = EmailHandler;

		// Act + Assert
		assert!(handler.validate(&json!(email)).is_ok(), "expected '{email}' to be valid");
	}

	#[rstest]
	#[case("")]
	#[case("invalid")]
	#[case("invalid@")]
	#[case("@example.com")]
	#[case("user@nodot")]
	#[case("user@domain.c")]
	fn test_invalid_emails(#[case] email: &str) {
		// Arrange
		let handler = EmailHandler;

		// Act + Assert
		assert!(
			handler.validate(&json!(email)).is_err(),
			"expected '{email}' to be invalid"
		);
	}

	#[test]
	fn test_non_string_wire_node_is_rejected() {
		let handler = EmailHandler;
		assert!(handler.validate(&json!(42)).is_err());
		assert!(handler.deserialize(&json!(null)).is_err());
	}

	#[test]
	fn test_deserialize_passes_address_through() {
		let handler = EmailHandler;
		let wire = json!("alice@example.com");
		assert_eq!(handler.deserialize(&wire).unwrap(), wire);
	}
}
