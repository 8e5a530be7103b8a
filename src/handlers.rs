//! Pluggable type handlers for scalar-like types the engine does not build in.
//!
//! A handler owns the conversion and format rules for one named type. The
//! built-ins cover `email`, `url`, `uuid`, `date`, and `datetime`; callers
//! register their own handlers (or override the built-ins) through the
//! [`TypeHandlerRegistry`].

pub mod date;
pub mod datetime;
pub mod email;
pub mod registry;
pub mod url;
pub mod uuid;

pub use self::date::DateHandler;
pub use self::datetime::DateTimeHandler;
pub use self::email::EmailHandler;
pub use self::registry::{TypeHandlerRegistry, handler, register_handler};
pub use self::url::UrlHandler;
pub use self::uuid::UuidHandler;

use serde_json::Value;

/// Failure raised by a handler, carrying what the handler expected.
///
/// The engines fold this into the field-level error, so the message should
/// read as an expectation: "a valid email address", "an RFC 3339 datetime".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
	pub fn expected(what: impl Into<String>) -> Self {
		Self(what.into())
	}
}

/// Conversion and format logic for one named type.
///
/// Implementations must be stateless and reentrant: one instance serves every
/// concurrent caller for the process lifetime.
pub trait TypeHandler: Send + Sync {
	/// Converts the stored form (as read off the record) into the wire form.
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError>;

	/// Converts (and checks) the wire form into the stored form.
	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError>;

	/// Checks the wire form without converting it.
	fn validate(&self, wire: &Value) -> Result<(), HandlerError>;
}

/// Pulls the string out of a wire node, the common first step for
/// string-backed handlers.
pub fn wire_str<'v>(wire: &'v Value, expected: &str) -> Result<&'v str, HandlerError> {
	wire.as_str()
		.ok_or_else(|| HandlerError::expected(expected.to_string()))
}
