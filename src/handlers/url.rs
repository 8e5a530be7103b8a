//! Built-in handler for URL-tagged fields.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{HandlerError, TypeHandler, wire_str};

// HTTP/HTTPS URL pattern.
//
// Validates URLs with:
// - http or https scheme only
// - Valid domain labels (no leading/trailing hyphens)
// - Optional port number (1-5 digits)
// - Optional path, query string, and fragment
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^https?://[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)*(:[0-9]{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#[^\s]*)?$",
	)
	.expect("URL_REGEX: invalid regex pattern")
});

/// Validates http/https URLs; stored and wire forms are both the URL text,
/// unchanged.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{TypeHandler, UrlHandler};
/// use serde_json::json;
///
/// let handler = UrlHandler;
/// assert!(handler.validate(&json!("https://example.com/path?q=1")).is_ok());
/// assert!(handler.validate(&json!("ftp://example.com")).is_err());
/// ```
pub struct UrlHandler;

impl UrlHandler {
	fn check(text: &str) -> Result<(), HandlerError> {
		if URL_REGEX.is_match(text) {
			Ok(())
		} else {
			Err(HandlerError::expected("a valid http or https URL"))
		}
	}
}

impl TypeHandler for UrlHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		wire_str(stored, "a URL string in the record")?;
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		let text = wire_str(wire, "a valid http or https URL")?;
		Self::check(text)?;
		Ok(wire.clone())
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		let text = wire_str(wire, "a valid http or https URL")?;
		Self::check(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("http://example.com")]
	#[case("https://www.example.com/")]
	#[case("http://localhost:8080/path")]
	#[case("https://example.com/path?query=value#section")]
	#[case("http://valid-domain.com/")]
	fn test_valid_urls(#[case] url: &str) {
		// Arrange
		let handler = UrlHandler;

		// Act + Assert
		assert!(handler.validate(&json!(url)).is_ok(), "expected '{url}' to be valid");
	}

	#[rstest]
	#[case("")]
	#[case("not-a-url")]
	#[case("ftp://example.com")]
	#[case("http://")]
	#[case("http://-invalid.com")]
	#[case("example.com")]
	fn test_invalid_urls(#[case] url: &str) {
		// Arrange
		let handler = UrlHandler;

		// Act + Assert
		assert!(handler.validate(&json!(url)).is_err(), "expected '{url}' to be invalid");
	}

	#[test]
	fn test_non_string_wire_node_is_rejected() {
		let handler = UrlHandler;
		assert!(handler.validate(&json!(["https://example.com"])).is_err());
	}
}
