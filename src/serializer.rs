//! Conversion of populated records into value trees.
//!
//! Outbound production is best-effort: a field whose handler is missing or
//! failing degrades to a null value and the call as a whole still completes.
//! This is the deliberate counterpart to the strict, fail-fast inbound path
//! in [`crate::deserializer`].

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::fields::FieldKind;
use crate::handlers::TypeHandlerRegistry;
use crate::schema::Schema;

/// Walks a schema and a record, producing a value tree.
///
/// Output always has exactly one entry per declared field, in declaration
/// order; no keys are invented or dropped.
///
/// # Examples
///
/// ```
/// use grappelli::{Schema, Serializer};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// let mut builder = Schema::<Point>::builder();
/// builder.field("x", |p: &Point| p.x, |p, v| p.x = v);
/// builder.field("y", |p: &Point| p.y, |p, v| p.y = v);
/// let schema = builder.build().unwrap();
///
/// let tree = Serializer::new().serialize(&schema, &Point { x: 3, y: 4 });
/// assert_eq!(tree, json!({"x": 3, "y": 4}));
/// ```
pub struct Serializer<'r> {
	registry: &'r TypeHandlerRegistry,
}

impl Serializer<'static> {
	/// A serializer over the process-wide handler registry.
	pub fn new() -> Self {
		Self {
			registry: TypeHandlerRegistry::global(),
		}
	}
}

impl Default for Serializer<'static> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'r> Serializer<'r> {
	/// A serializer over an explicit handler registry.
	pub fn with_registry(registry: &'r TypeHandlerRegistry) -> Self {
		Self { registry }
	}

	/// Converts a record into a value tree. Never fails as a whole.
	pub fn serialize<T>(&self, schema: &Schema<T>, record: &T) -> Value {
		serialize_fields(schema, record, self.registry)
	}

	/// Converts a record into JSON text via the collaborator.
	pub fn serialize_to_string<T>(
		&self,
		schema: &Schema<T>,
		record: &T,
	) -> Result<String, ValidationError> {
		let tree = self.serialize(schema, record);
		serde_json::to_string(&tree).map_err(|error| ValidationError::MalformedInput {
			message: error.to_string(),
		})
	}
}

pub(crate) fn serialize_fields<T>(
	schema: &Schema<T>,
	record: &T,
	registry: &TypeHandlerRegistry,
) -> Value {
	let mut output = Map::with_capacity(schema.len());
	for field in schema.fields() {
		let value = match &field.kind {
			FieldKind::Scalar { read, .. } | FieldKind::Array { read, .. } => read(record),
			FieldKind::Nested(access) => access.serialize(record, registry),
			FieldKind::Handler { handler, read, .. } => match registry.get(handler) {
				Some(resolved) => match resolved.serialize(&read(record)) {
					Ok(value) => value,
					Err(error) => {
						tracing::warn!(
							field = %field.name,
							handler = %handler,
							%error,
							"type handler failed to serialize field, emitting null"
						);
						Value::Null
					}
				},
				None => {
					tracing::warn!(
						field = %field.name,
						handler = %handler,
						"type handler not registered, emitting null"
					);
					Value::Null
				}
			},
		};
		output.insert(field.name.clone(), value);
	}
	Value::Object(output)
}
