//! Field descriptions: type tags, scalar conversions, and accessor bindings.
//!
//! A [`FieldDefinition`] ties a field name and type tag to the pair of
//! closures that read and write the field on a concrete record type. The
//! closures are captured once, when the field is declared on the builder, so
//! no offset arithmetic or reflection happens at traversal time.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidationError;
use crate::handlers::TypeHandlerRegistry;
use crate::rules::ValidationRules;
use crate::schema::Schema;

/// Closed set of type tags understood by the engine.
///
/// Date, datetime, email, URL, and UUID fields are stored as strings and
/// validated by a registered [`TypeHandler`](crate::handlers::TypeHandler);
/// they are tags, not distinct storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
	Boolean,
	Int8,
	Int16,
	Int32,
	Int64,
	UInt8,
	UInt16,
	UInt32,
	UInt64,
	Float32,
	Float64,
	String,
	Date,
	DateTime,
	Email,
	Url,
	Uuid,
	Array,
	Nested,
	Custom,
}

impl FieldType {
	/// True for the eight integer widths.
	pub fn is_integer(&self) -> bool {
		matches!(
			self,
			FieldType::Int8
				| FieldType::Int16
				| FieldType::Int32
				| FieldType::Int64
				| FieldType::UInt8
				| FieldType::UInt16
				| FieldType::UInt32
				| FieldType::UInt64
		)
	}

	/// True for integers and floats.
	pub fn is_numeric(&self) -> bool {
		self.is_integer() || matches!(self, FieldType::Float32 | FieldType::Float64)
	}

	/// True for fields whose storage is a string, whatever the tag.
	pub fn is_string_backed(&self) -> bool {
		matches!(
			self,
			FieldType::String
				| FieldType::Date
				| FieldType::DateTime
				| FieldType::Email
				| FieldType::Url
				| FieldType::Uuid
		)
	}

	/// The registry name of the built-in handler backing this tag, if any.
	pub(crate) fn handler_name(&self) -> Option<&'static str> {
		match self {
			FieldType::Date => Some("date"),
			FieldType::DateTime => Some("datetime"),
			FieldType::Email => Some("email"),
			FieldType::Url => Some("url"),
			FieldType::Uuid => Some("uuid"),
			_ => None,
		}
	}

	/// Whether a value-tree node has the right kind and width for this tag.
	///
	/// Format checks for handler-backed tags are the handler's job; here a
	/// string node is enough. Integer tags reject floats and out-of-width
	/// numbers, so `300` does not conform to `Int8`.
	pub(crate) fn conforms(&self, value: &Value) -> bool {
		match self {
			FieldType::Boolean => value.is_boolean(),
			FieldType::Int8 => value.as_i64().is_some_and(|n| i8::try_from(n).is_ok()),
			FieldType::Int16 => value.as_i64().is_some_and(|n| i16::try_from(n).is_ok()),
			FieldType::Int32 => value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
			FieldType::Int64 => value.as_i64().is_some(),
			FieldType::UInt8 => value.as_u64().is_some_and(|n| u8::try_from(n).is_ok()),
			FieldType::UInt16 => value.as_u64().is_some_and(|n| u16::try_from(n).is_ok()),
			FieldType::UInt32 => value.as_u64().is_some_and(|n| u32::try_from(n).is_ok()),
			FieldType::UInt64 => value.as_u64().is_some(),
			FieldType::Float32 | FieldType::Float64 => value.as_f64().is_some(),
			FieldType::String
			| FieldType::Date
			| FieldType::DateTime
			| FieldType::Email
			| FieldType::Url
			| FieldType::Uuid => value.is_string(),
			FieldType::Array => value.is_array(),
			FieldType::Nested => value.is_object(),
			// The registered handler owns the shape check.
			FieldType::Custom => true,
		}
	}

	/// What the deserializer expected, for error messages.
	pub(crate) fn expectation(&self) -> &'static str {
		match self {
			FieldType::Boolean => "a boolean",
			FieldType::Int8 => "an integer in -128..=127",
			FieldType::Int16 => "an integer in -32768..=32767",
			FieldType::Int32 => "a 32-bit integer",
			FieldType::Int64 => "a 64-bit integer",
			FieldType::UInt8 => "an integer in 0..=255",
			FieldType::UInt16 => "an integer in 0..=65535",
			FieldType::UInt32 => "an unsigned 32-bit integer",
			FieldType::UInt64 => "an unsigned 64-bit integer",
			FieldType::Float32 | FieldType::Float64 => "a number",
			FieldType::String => "a string",
			FieldType::Date => "a date string",
			FieldType::DateTime => "a datetime string",
			FieldType::Email => "an email string",
			FieldType::Url => "a URL string",
			FieldType::Uuid => "a UUID string",
			FieldType::Array => "an array",
			FieldType::Nested => "an object",
			FieldType::Custom => "a handler-accepted value",
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			FieldType::Boolean => "boolean",
			FieldType::Int8 => "int8",
			FieldType::Int16 => "int16",
			FieldType::Int32 => "int32",
			FieldType::Int64 => "int64",
			FieldType::UInt8 => "uint8",
			FieldType::UInt16 => "uint16",
			FieldType::UInt32 => "uint32",
			FieldType::UInt64 => "uint64",
			FieldType::Float32 => "float32",
			FieldType::Float64 => "float64",
			FieldType::String => "string",
			FieldType::Date => "date",
			FieldType::DateTime => "datetime",
			FieldType::Email => "email",
			FieldType::Url => "url",
			FieldType::Uuid => "uuid",
			FieldType::Array => "array",
			FieldType::Nested => "nested",
			FieldType::Custom => "custom",
		};
		f.write_str(name)
	}
}

/// Raised by a write accessor when an already shape-checked node cannot be
/// represented by the field's storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionError;

/// Reads a field off a record as a value-tree node.
pub type ReadFn<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Writes a value-tree node into a field on a record.
pub type WriteFn<T> = Arc<dyn Fn(&mut T, &Value) -> Result<(), ConversionError> + Send + Sync>;

/// A Rust storage type that maps onto one scalar [`FieldType`] tag.
///
/// Implemented for `bool`, the eight integer widths, `f32`/`f64`, and
/// `String`. Array declarations are bounded by this trait, which is what
/// keeps arrays single-level: there is no implementation for `Vec<_>`.
pub trait ScalarValue: Sized {
	/// The tag a field of this storage type is declared under.
	const FIELD_TYPE: FieldType;

	/// Converts the stored value into a value-tree node.
	fn into_value(self) -> Value;

	/// Converts a value-tree node back, rejecting wrong kinds and widths.
	fn from_value(value: &Value) -> Option<Self>;
}

impl ScalarValue for bool {
	const FIELD_TYPE: FieldType = FieldType::Boolean;

	fn into_value(self) -> Value {
		Value::Bool(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.as_bool()
	}
}

macro_rules! impl_signed_scalar {
	($($ty:ty => $tag:expr),* $(,)?) => {
		$(impl ScalarValue for $ty {
			const FIELD_TYPE: FieldType = $tag;

			fn into_value(self) -> Value {
				Value::from(self)
			}

			fn from_value(value: &Value) -> Option<Self> {
				value.as_i64().and_then(|n| <$ty>::try_from(n).ok())
			}
		})*
	};
}

macro_rules! impl_unsigned_scalar {
	($($ty:ty => $tag:expr),* $(,)?) => {
		$(impl ScalarValue for $ty {
			const FIELD_TYPE: FieldType = $tag;

			fn into_value(self) -> Value {
				Value::from(self)
			}

			fn from_value(value: &Value) -> Option<Self> {
				value.as_u64().and_then(|n| <$ty>::try_from(n).ok())
			}
		})*
	};
}

impl_signed_scalar! {
	i8 => FieldType::Int8,
	i16 => FieldType::Int16,
	i32 => FieldType::Int32,
	i64 => FieldType::Int64,
}

impl_unsigned_scalar! {
	u8 => FieldType::UInt8,
	u16 => FieldType::UInt16,
	u32 => FieldType::UInt32,
	u64 => FieldType::UInt64,
}

impl ScalarValue for f32 {
	const FIELD_TYPE: FieldType = FieldType::Float32;

	fn into_value(self) -> Value {
		Value::from(f64::from(self))
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.as_f64().map(|n| n as f32)
	}
}

impl ScalarValue for f64 {
	const FIELD_TYPE: FieldType = FieldType::Float64;

	fn into_value(self) -> Value {
		Value::from(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.as_f64()
	}
}

impl ScalarValue for String {
	const FIELD_TYPE: FieldType = FieldType::String;

	fn into_value(self) -> Value {
		Value::String(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.as_str().map(ToOwned::to_owned)
	}
}

/// How a field is traversed, beyond its tag.
pub(crate) enum FieldKind<T> {
	/// Built-in scalar with a direct accessor pair.
	Scalar { read: ReadFn<T>, write: WriteFn<T> },
	/// Homogeneous array of one scalar element type.
	Array {
		element: FieldType,
		read: ReadFn<T>,
		write: WriteFn<T>,
	},
	/// A sub-record traversed by delegating to its own schema.
	Nested(Arc<dyn NestedAccess<T>>),
	/// A field whose conversion is owned by a registered type handler.
	Handler {
		handler: Cow<'static, str>,
		read: ReadFn<T>,
		write: WriteFn<T>,
	},
}

/// One field of a schema: name, tag, accessor binding, and rules.
pub struct FieldDefinition<T> {
	pub(crate) name: String,
	pub(crate) field_type: FieldType,
	pub(crate) rules: ValidationRules,
	pub(crate) kind: FieldKind<T>,
}

impl<T> FieldDefinition<T> {
	/// The field's name, which is also its key in the value tree.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The field's type tag.
	pub fn field_type(&self) -> FieldType {
		self.field_type
	}

	/// The field's validation rules.
	pub fn rules(&self) -> &ValidationRules {
		&self.rules
	}

	/// The element tag for array fields.
	pub fn element_type(&self) -> Option<FieldType> {
		match &self.kind {
			FieldKind::Array { element, .. } => Some(*element),
			_ => None,
		}
	}

	/// The registry name for handler-backed fields.
	pub fn handler_name(&self) -> Option<&str> {
		match &self.kind {
			FieldKind::Handler { handler, .. } => Some(handler.as_ref()),
			_ => None,
		}
	}
}

impl<T> fmt::Debug for FieldDefinition<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDefinition")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("rules", &self.rules)
			.finish_non_exhaustive()
	}
}

/// Type-erased access to a nested sub-record.
///
/// Pairs a child schema with the projections from the owning record to the
/// sub-record, so the engines can recurse without knowing the child type.
pub(crate) trait NestedAccess<T>: Send + Sync {
	fn serialize(&self, record: &T, registry: &TypeHandlerRegistry) -> Value;

	fn deserialize_into(
		&self,
		tree: &Value,
		record: &mut T,
		registry: &TypeHandlerRegistry,
	) -> Result<(), ValidationError>;

	fn validate(&self, tree: &Value, registry: &TypeHandlerRegistry)
	-> Result<(), ValidationError>;
}

pub(crate) struct NestedField<T, U> {
	pub(crate) schema: Arc<Schema<U>>,
	pub(crate) get: Arc<dyn Fn(&T) -> &U + Send + Sync>,
	pub(crate) get_mut: Arc<dyn Fn(&mut T) -> &mut U + Send + Sync>,
}

impl<T, U> NestedAccess<T> for NestedField<T, U> {
	fn serialize(&self, record: &T, registry: &TypeHandlerRegistry) -> Value {
		crate::serializer::serialize_fields(&self.schema, (self.get)(record), registry)
	}

	fn deserialize_into(
		&self,
		tree: &Value,
		record: &mut T,
		registry: &TypeHandlerRegistry,
	) -> Result<(), ValidationError> {
		crate::deserializer::deserialize_fields(&self.schema, tree, (self.get_mut)(record), registry)
	}

	fn validate(
		&self,
		tree: &Value,
		registry: &TypeHandlerRegistry,
	) -> Result<(), ValidationError> {
		crate::validator::validate_fields(&self.schema, tree, registry)
	}
}
