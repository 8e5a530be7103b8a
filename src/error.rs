//! Error types for schema building and record traversal.

use serde_json::Value;

use crate::fields::FieldType;

/// Error raised while a schema is being built.
///
/// Builder misuse is a configuration problem, not a request-time problem:
/// rule methods stay chainable and the first offending call is reported by
/// [`SchemaBuilder::build`](crate::schema::SchemaBuilder::build).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
	/// A rule was attached to a field whose type cannot carry it,
	/// e.g. `pattern` on a boolean field.
	#[error("field '{field}': rule '{rule}' does not apply to {field_type} fields")]
	IncompatibleRule {
		field: String,
		rule: &'static str,
		field_type: FieldType,
	},

	/// A `pattern` rule failed to compile.
	#[error("field '{field}': invalid pattern: {source}")]
	InvalidPattern {
		field: String,
		source: regex::Error,
	},

	/// Two fields were declared under the same name.
	#[error("duplicate field '{field}' in schema")]
	DuplicateField { field: String },

	/// A declaration method was given a type tag it cannot express,
	/// e.g. `string_as` with a non-string-backed tag.
	#[error("field '{field}': type {field_type} cannot be declared this way")]
	UnsupportedTag {
		field: String,
		field_type: FieldType,
	},
}

/// Error raised by `validate`, `deserialize`, and the text-boundary helpers.
///
/// Traversal is fail-fast: the first field (in declaration order) that fails
/// any check aborts the whole call, and this is the sole reported error. The
/// variant is the machine-readable kind; `Display` carries the human-readable
/// message.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
	/// A required field has no entry (or a null entry) in the input tree.
	MissingRequiredField { field: String },
	/// The input node's kind or width does not fit the declared field type.
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// A string or array is shorter/longer than the inclusive length bounds.
	LengthOutOfBounds {
		field: String,
		length: usize,
		min: Option<usize>,
		max: Option<usize>,
	},
	/// A numeric value lies outside the inclusive range bounds.
	ValueOutOfRange {
		field: String,
		value: f64,
		min: Option<f64>,
		max: Option<f64>,
	},
	/// A string does not match the field's pattern in its entirety.
	PatternMismatch { field: String, pattern: String },
	/// A value is not a member of the field's allowed set.
	EnumViolation { field: String, value: String },
	/// A handler-backed field references a name with no registry entry.
	UnregisteredTypeHandler { field: String, handler: String },
	/// The text boundary rejected the input before traversal began.
	MalformedInput { message: String },
}

impl ValidationError {
	/// The name of the field the error refers to, if any.
	///
	/// `MalformedInput` carries no field: it is raised before traversal.
	pub fn field(&self) -> Option<&str> {
		match self {
			ValidationError::MissingRequiredField { field }
			| ValidationError::TypeMismatch { field, .. }
			| ValidationError::LengthOutOfBounds { field, .. }
			| ValidationError::ValueOutOfRange { field, .. }
			| ValidationError::PatternMismatch { field, .. }
			| ValidationError::EnumViolation { field, .. }
			| ValidationError::UnregisteredTypeHandler { field, .. } => Some(field),
			ValidationError::MalformedInput { .. } => None,
		}
	}

	/// Rewrites the field name to `parent.field`.
	///
	/// Applied when an error bubbles out of a nested schema, so the caller
	/// sees the full path to the offending field.
	pub(crate) fn nested(self, parent: &str) -> Self {
		let prefix = |field: String| format!("{parent}.{field}");
		match self {
			ValidationError::MissingRequiredField { field } => {
				ValidationError::MissingRequiredField { field: prefix(field) }
			}
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: prefix(field),
				expected,
				actual,
			},
			ValidationError::LengthOutOfBounds {
				field,
				length,
				min,
				max,
			} => ValidationError::LengthOutOfBounds {
				field: prefix(field),
				length,
				min,
				max,
			},
			ValidationError::ValueOutOfRange {
				field,
				value,
				min,
				max,
			} => ValidationError::ValueOutOfRange {
				field: prefix(field),
				value,
				min,
				max,
			},
			ValidationError::PatternMismatch { field, pattern } => {
				ValidationError::PatternMismatch {
					field: prefix(field),
					pattern,
				}
			}
			ValidationError::EnumViolation { field, value } => {
				ValidationError::EnumViolation {
					field: prefix(field),
					value,
				}
			}
			ValidationError::UnregisteredTypeHandler { field, handler } => {
				ValidationError::UnregisteredTypeHandler {
					field: prefix(field),
					handler,
				}
			}
			other @ ValidationError::MalformedInput { .. } => other,
		}
	}
}

impl std::fmt::Display for ValidationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ValidationError::MissingRequiredField { field } => {
				write!(f, "Field '{field}' is required")
			}
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => {
				write!(f, "Field '{field}' expected {expected}, got {actual}")
			}
			ValidationError::LengthOutOfBounds {
				field,
				length,
				min,
				max,
			} => match (min, max) {
				(Some(min), Some(max)) => write!(
					f,
					"Field '{field}' must have length between {min} and {max} (it has {length})"
				),
				(Some(min), None) => write!(
					f,
					"Field '{field}' must have length at least {min} (it has {length})"
				),
				(None, Some(max)) => write!(
					f,
					"Field '{field}' must have length at most {max} (it has {length})"
				),
				(None, None) => write!(f, "Field '{field}' has invalid length {length}"),
			},
			ValidationError::ValueOutOfRange {
				field,
				value,
				min,
				max,
			} => match (min, max) {
				(Some(min), Some(max)) => write!(
					f,
					"Field '{field}' must be between {min} and {max} (it is {value})"
				),
				(Some(min), None) => {
					write!(f, "Field '{field}' must be at least {min} (it is {value})")
				}
				(None, Some(max)) => {
					write!(f, "Field '{field}' must be at most {max} (it is {value})")
				}
				(None, None) => write!(f, "Field '{field}' has invalid value {value}"),
			},
			ValidationError::PatternMismatch { field, pattern } => {
				write!(f, "Field '{field}' must fully match pattern '{pattern}'")
			}
			ValidationError::EnumViolation { field, value } => {
				write!(f, "Field '{field}' has value '{value}' outside the allowed set")
			}
			ValidationError::UnregisteredTypeHandler { field, handler } => {
				write!(
					f,
					"Field '{field}' uses type handler '{handler}', which is not registered"
				)
			}
			ValidationError::MalformedInput { message } => {
				write!(f, "Malformed input: {message}")
			}
		}
	}
}

impl std::error::Error for ValidationError {}

/// Short, message-friendly description of a value-tree node.
pub(crate) fn describe_node(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => format!("boolean {b}"),
		Value::Number(n) => format!("number {n}"),
		Value::String(s) => {
			if s.chars().count() > 40 {
				let head: String = s.chars().take(40).collect();
				format!("\"{head}…\"")
			} else {
				format!("\"{s}\"")
			}
		}
		Value::Array(_) => "an array".to_string(),
		Value::Object(_) => "an object".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_field_accessor_returns_field_name() {
		let err = ValidationError::MissingRequiredField {
			field: "username".to_string(),
		};
		assert_eq!(err.field(), Some("username"));

		let err = ValidationError::MalformedInput {
			message: "bad".to_string(),
		};
		assert_eq!(err.field(), None);
	}

	#[test]
	fn test_nested_prefixes_field_name() {
		let err = ValidationError::TypeMismatch {
			field: "street".to_string(),
			expected: "a string".to_string(),
			actual: "number 5".to_string(),
		};
		let err = err.nested("address");
		assert_eq!(err.field(), Some("address.street"));
	}

	#[test]
	fn test_display_length_bounds_message() {
		let err = ValidationError::LengthOutOfBounds {
			field: "username".to_string(),
			length: 2,
			min: Some(3),
			max: Some(20),
		};
		assert_eq!(
			err.to_string(),
			"Field 'username' must have length between 3 and 20 (it has 2)"
		);
	}

	#[test]
	fn test_describe_node_truncates_long_strings() {
		let long = "x".repeat(100);
		let described = describe_node(&Value::String(long));
		assert!(described.chars().count() < 50);
		assert!(described.ends_with("…\""));
	}
}
