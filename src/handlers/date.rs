//! Built-in handler for date-tagged fields.

use chrono::NaiveDate;
use serde_json::Value;

use super::{HandlerError, TypeHandler, wire_str};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates `YYYY-MM-DD` date strings; stored and wire forms are both the
/// date text, unchanged.
///
/// Calendar rules apply, so `2023-02-30` is rejected, not just reshaped
/// input.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{DateHandler, TypeHandler};
/// use serde_json::json;
///
/// let handler = DateHandler;
/// assert!(handler.validate(&json!("2024-02-29")).is_ok());
/// assert!(handler.validate(&json!("2023-02-29")).is_err());
/// assert!(handler.validate(&json!("01/02/2024")).is_err());
/// ```
pub struct DateHandler;

impl DateHandler {
	fn check(text: &str) -> Result<(), HandlerError> {
		// chrono accepts unpadded months and days, the wire form does not.
		let well_formed =
			text.len() == 10 && NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok();
		if well_formed {
			Ok(())
		} else {
			Err(HandlerError::expected("a date in YYYY-MM-DD form"))
		}
	}
}

impl TypeHandler for DateHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		wire_str(stored, "a date string in the record")?;
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		let text = wire_str(wire, "a date in YYYY-MM-DD form")?;
		Self::check(text)?;
		Ok(wire.clone())
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		let text = wire_str(wire, "a date in YYYY-MM-DD form")?;
		Self::check(text)
	}
}
