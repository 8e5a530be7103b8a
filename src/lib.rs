//! Schema-driven serialization, deserialization, and validation for REST
//! records.
//!
//! Describe a record type's fields once (name, type, accessor pair,
//! validation rules) and reuse that description three ways:
//!
//! - [`Serializer`]: convert a populated record into a JSON value tree,
//!   best-effort (a broken field degrades to null, the call completes)
//! - [`Deserializer`]: write a value tree into a record, strict and
//!   fail-fast on required/type violations
//! - [`Validator`]: check a value tree against every rule without touching
//!   any record
//!
//! All three traverse fields in declaration order, which also fixes the
//! serializer's output key order and the fail-fast tie-break. Email, URL,
//! UUID, date, and datetime fields are plain strings validated by pluggable
//! [`TypeHandler`](handlers::TypeHandler)s; the
//! [`TypeHandlerRegistry`](handlers::TypeHandlerRegistry) ships those five
//! built-ins and accepts overrides and custom types.
//!
//! # Examples
//!
//! ```
//! use grappelli::{FieldType, Schema};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Signup {
//! 	username: String,
//! 	email: String,
//! 	age: i32,
//! 	active: bool,
//! 	tags: Vec<String>,
//! }
//!
//! let mut builder = Schema::<Signup>::builder();
//! builder
//! 	.field("username", |s: &Signup| s.username.clone(), |s, v| s.username = v)
//! 	.required()
//! 	.min_length(3)
//! 	.max_length(20)
//! 	.pattern("[a-z][a-z0-9_]*");
//! builder
//! 	.string_as("email", FieldType::Email, |s: &Signup| s.email.clone(), |s, v| {
//! 		s.email = v
//! 	})
//! 	.required();
//! builder
//! 	.field("age", |s: &Signup| s.age, |s, v| s.age = v)
//! 	.range(18.0, 120.0);
//! builder
//! 	.field("active", |s: &Signup| s.active, |s, v| s.active = v)
//! 	.required();
//! builder.array("tags", |s: &Signup| s.tags.clone(), |s, v| s.tags = v);
//! let schema = builder.build().unwrap();
//!
//! let input = json!({
//! 	"username": "alice",
//! 	"email": "alice@example.com",
//! 	"age": 30,
//! 	"active": true,
//! 	"tags": ["admin", "beta"],
//! });
//!
//! schema.validate(&input).unwrap();
//! let signup: Signup = schema.deserialize(&input).unwrap();
//! assert_eq!(signup.username, "alice");
//!
//! // Round-trip: output keys follow declaration order.
//! assert_eq!(schema.serialize(&signup), input);
//! ```
//!
//! The engines run against the process-wide handler registry by default;
//! construct them with [`Serializer::with_registry`] (and friends) to use an
//! isolated [`handlers::TypeHandlerRegistry`] instead, e.g. in tests.

pub mod deserializer;
pub mod error;
pub mod fields;
pub mod handlers;
pub mod rules;
pub mod schema;
pub mod serializer;
pub mod validator;

pub use deserializer::Deserializer;
pub use error::{SchemaError, ValidationError};
pub use fields::{FieldDefinition, FieldType, ScalarValue};
pub use handlers::{HandlerError, TypeHandler, TypeHandlerRegistry, register_handler};
pub use rules::{Pattern, ValidationRules};
pub use schema::{FieldHandle, Schema, SchemaBuilder};
pub use serializer::Serializer;
pub use validator::Validator;

/// Commonly used types, importable in one line.
pub mod prelude {
	pub use crate::deserializer::Deserializer;
	pub use crate::error::{SchemaError, ValidationError};
	pub use crate::fields::FieldType;
	pub use crate::handlers::{HandlerError, TypeHandler, TypeHandlerRegistry};
	pub use crate::schema::{Schema, SchemaBuilder};
	pub use crate::serializer::Serializer;
	pub use crate::validator::Validator;
}
