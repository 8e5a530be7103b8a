//! Strict conversion of value trees into record memory.
//!
//! The inbound path is fail-fast: the first field (in declaration order)
//! that is missing-while-required or shape-mismatched aborts the whole call.
//! The record's partial state after a failure is unspecified.

use serde_json::Value;

use crate::error::{ValidationError, describe_node};
use crate::fields::{FieldDefinition, FieldKind};
use crate::handlers::TypeHandlerRegistry;
use crate::schema::Schema;

/// Walks a schema and a value tree, writing into a record.
///
/// Only presence and type/shape are enforced here; rule checking (lengths,
/// ranges, patterns, enums) is the [`Validator`](crate::Validator)'s job and
/// runs before deserialization in the usual request flow.
///
/// # Examples
///
/// ```
/// use grappelli::{Deserializer, Schema};
/// use serde_json::json;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// let mut builder = Schema::<Point>::builder();
/// builder.field("x", |p: &Point| p.x, |p, v| p.x = v).required();
/// builder.field("y", |p: &Point| p.y, |p, v| p.y = v).required();
/// let schema = builder.build().unwrap();
///
/// let point: Point = Deserializer::new()
/// 	.deserialize(&schema, &json!({"x": 3, "y": 4}))
/// 	.unwrap();
/// assert_eq!(point, Point { x: 3, y: 4 });
/// ```
pub struct Deserializer<'r> {
	registry: &'r TypeHandlerRegistry,
}

impl Deserializer<'static> {
	/// A deserializer over the process-wide handler registry.
	pub fn new() -> Self {
		Self {
			registry: TypeHandlerRegistry::global(),
		}
	}
}

impl Default for Deserializer<'static> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'r> Deserializer<'r> {
	/// A deserializer over an explicit handler registry.
	pub fn with_registry(registry: &'r TypeHandlerRegistry) -> Self {
		Self { registry }
	}

	/// Populates a fresh `T::default()` record from a value tree.
	pub fn deserialize<T>(&self, schema: &Schema<T>, tree: &Value) -> Result<T, ValidationError>
	where
		T: Default,
	{
		let mut record = T::default();
		self.deserialize_into(schema, tree, &mut record)?;
		Ok(record)
	}

	/// Writes a value tree into a caller-owned record.
	pub fn deserialize_into<T>(
		&self,
		schema: &Schema<T>,
		tree: &Value,
		record: &mut T,
	) -> Result<(), ValidationError> {
		deserialize_fields(schema, tree, record, self.registry)
	}

	/// Parses JSON text via the collaborator, then deserializes.
	///
	/// Syntactically invalid text short-circuits with
	/// [`ValidationError::MalformedInput`]; traversal never starts.
	pub fn deserialize_str<T>(&self, schema: &Schema<T>, text: &str) -> Result<T, ValidationError>
	where
		T: Default,
	{
		let tree: Value =
			serde_json::from_str(text).map_err(|error| ValidationError::MalformedInput {
				message: error.to_string(),
			})?;
		self.deserialize(schema, &tree)
	}
}

pub(crate) fn deserialize_fields<T>(
	schema: &Schema<T>,
	tree: &Value,
	record: &mut T,
	registry: &TypeHandlerRegistry,
) -> Result<(), ValidationError> {
	let entries = tree.as_object().ok_or_else(|| ValidationError::MalformedInput {
		message: format!(
			"expected an object at the top level, got {}",
			describe_node(tree)
		),
	})?;

	for field in schema.fields() {
		let value = match entries.get(&field.name) {
			// A null entry counts as absent.
			None | Some(Value::Null) => {
				if field.rules.required {
					return Err(ValidationError::MissingRequiredField {
						field: field.name.clone(),
					});
				}
				continue;
			}
			Some(value) => value,
		};

		match &field.kind {
			FieldKind::Scalar { write, .. } => {
				write(record, value).map_err(|_| type_mismatch(field, value))?;
			}
			FieldKind::Array { element, write, .. } => {
				let nodes = value.as_array().ok_or_else(|| type_mismatch(field, value))?;
				for node in nodes {
					if !element.conforms(node) {
						return Err(ValidationError::TypeMismatch {
							field: field.name.clone(),
							expected: format!("array elements to be {}", element.expectation()),
							actual: describe_node(node),
						});
					}
				}
				write(record, value).map_err(|_| type_mismatch(field, value))?;
			}
			FieldKind::Nested(access) => {
				if !value.is_object() {
					return Err(type_mismatch(field, value));
				}
				access
					.deserialize_into(value, record, registry)
					.map_err(|error| error.nested(&field.name))?;
			}
			FieldKind::Handler { handler, write, .. } => {
				let resolved = registry.get(handler).ok_or_else(|| {
					ValidationError::UnregisteredTypeHandler {
						field: field.name.clone(),
						handler: handler.to_string(),
					}
				})?;
				let stored = resolved.deserialize(value).map_err(|error| {
					ValidationError::TypeMismatch {
						field: field.name.clone(),
						expected: error.0,
						actual: describe_node(value),
					}
				})?;
				write(record, &stored).map_err(|_| type_mismatch(field, value))?;
			}
		}
	}
	Ok(())
}

fn type_mismatch<T>(field: &FieldDefinition<T>, value: &Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.name.clone(),
		expected: field.field_type.expectation().to_string(),
		actual: describe_node(value),
	}
}
