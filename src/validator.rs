//! Rule checking over value trees, without touching record memory.

use serde_json::Value;

use crate::error::{ValidationError, describe_node};
use crate::fields::{FieldDefinition, FieldKind};
use crate::handlers::TypeHandlerRegistry;
use crate::schema::Schema;

/// Walks a schema and a value tree, enforcing every rule.
///
/// Per field, checks run in a fixed order and stop at the first failure:
/// required-presence, shape/type conformance, length bounds, numeric range
/// bounds, pattern, enum membership. The first field (in declaration order)
/// that fails any check terminates the whole call and is the sole reported
/// error.
///
/// # Examples
///
/// ```
/// use grappelli::{Schema, Validator};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Signup {
/// 	username: String,
/// }
///
/// let mut builder = Schema::<Signup>::builder();
/// builder
/// 	.field("username", |s: &Signup| s.username.clone(), |s, v| s.username = v)
/// 	.required()
/// 	.min_length(3);
/// let schema = builder.build().unwrap();
///
/// let validator = Validator::new();
/// assert!(validator.validate(&schema, &json!({"username": "alice"})).is_ok());
///
/// let error = validator
/// 	.validate(&schema, &json!({"username": "ab"}))
/// 	.unwrap_err();
/// assert_eq!(error.field(), Some("username"));
/// ```
pub struct Validator<'r> {
	registry: &'r TypeHandlerRegistry,
}

impl Validator<'static> {
	/// A validator over the process-wide handler registry.
	pub fn new() -> Self {
		Self {
			registry: TypeHandlerRegistry::global(),
		}
	}
}

impl Default for Validator<'static> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'r> Validator<'r> {
	/// A validator over an explicit handler registry.
	pub fn with_registry(registry: &'r TypeHandlerRegistry) -> Self {
		Self { registry }
	}

	/// Checks a value tree against every rule of the schema.
	pub fn validate<T>(&self, schema: &Schema<T>, tree: &Value) -> Result<(), ValidationError> {
		validate_fields(schema, tree, self.registry)
	}
}

pub(crate) fn validate_fields<T>(
	schema: &Schema<T>,
	tree: &Value,
	registry: &TypeHandlerRegistry,
) -> Result<(), ValidationError> {
	let entries = tree.as_object().ok_or_else(|| ValidationError::MalformedInput {
		message: format!(
			"expected an object at the top level, got {}",
			describe_node(tree)
		),
	})?;

	for field in schema.fields() {
		// (1) required-presence; a null entry counts as absent.
		let value = match entries.get(&field.name) {
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

		// (2) shape/type conformance.
		match &field.kind {
			FieldKind::Scalar { .. } => {
				if !field.field_type.conforms(value) {
					return Err(type_mismatch(field, value));
				}
			}
			FieldKind::Array { element, .. } => {
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
			}
			FieldKind::Nested(access) => {
				if !value.is_object() {
					return Err(type_mismatch(field, value));
				}
				access
					.validate(value, registry)
					.map_err(|error| error.nested(&field.name))?;
				// Rules on a nested field itself stop at presence; the child
				// schema owns everything inside.
				continue;
			}
			FieldKind::Handler { handler, .. } => {
				let resolved = registry.get(handler).ok_or_else(|| {
					ValidationError::UnregisteredTypeHandler {
						field: field.name.clone(),
						handler: handler.to_string(),
					}
				})?;
				resolved.validate(value).map_err(|error| {
					ValidationError::TypeMismatch {
						field: field.name.clone(),
						expected: error.0,
						actual: describe_node(value),
					}
				})?;
			}
		}

		// (3) length bounds.
		check_length(field, value)?;
		// (4) numeric range bounds.
		check_range(field, value)?;
		// (5) pattern, entire string.
		check_pattern(field, value)?;
		// (6) enum membership.
		check_one_of(field, value)?;
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

fn check_length<T>(field: &FieldDefinition<T>, value: &Value) -> Result<(), ValidationError> {
	let rules = &field.rules;
	if rules.min_length.is_none() && rules.max_length.is_none() {
		return Ok(());
	}
	let length = match value {
		// Characters, not bytes, so multi-byte text measures correctly.
		Value::String(text) => text.chars().count(),
		Value::Array(nodes) => nodes.len(),
		_ => return Ok(()),
	};
	let too_short = rules.min_length.is_some_and(|min| length < min);
	let too_long = rules.max_length.is_some_and(|max| length > max);
	if too_short || too_long {
		return Err(ValidationError::LengthOutOfBounds {
			field: field.name.clone(),
			length,
			min: rules.min_length,
			max: rules.max_length,
		});
	}
	Ok(())
}

fn check_range<T>(field: &FieldDefinition<T>, value: &Value) -> Result<(), ValidationError> {
	let rules = &field.rules;
	if rules.min_value.is_none() && rules.max_value.is_none() {
		return Ok(());
	}
	let Some(number) = value.as_f64() else {
		return Ok(());
	};
	let below = rules.min_value.is_some_and(|min| number < min);
	let above = rules.max_value.is_some_and(|max| number > max);
	if below || above {
		return Err(ValidationError::ValueOutOfRange {
			field: field.name.clone(),
			value: number,
			min: rules.min_value,
			max: rules.max_value,
		});
	}
	Ok(())
}

fn check_pattern<T>(field: &FieldDefinition<T>, value: &Value) -> Result<(), ValidationError> {
	if let (Some(pattern), Some(text)) = (&field.rules.pattern, value.as_str())
		&& !pattern.matches(text)
	{
		return Err(ValidationError::PatternMismatch {
			field: field.name.clone(),
			pattern: pattern.source().to_string(),
		});
	}
	Ok(())
}

fn check_one_of<T>(field: &FieldDefinition<T>, value: &Value) -> Result<(), ValidationError> {
	let Some(allowed) = &field.rules.one_of else {
		return Ok(());
	};
	let representation = match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	};
	if !allowed.iter().any(|candidate| candidate == &representation) {
		return Err(ValidationError::EnumViolation {
			field: field.name.clone(),
			value: representation,
		});
	}
	Ok(())
}
