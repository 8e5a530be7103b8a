//! Schema construction and the reusable schema artifact.
//!
//! A [`Schema`] is built once per record type through [`SchemaBuilder`],
//! then shared read-only for the process lifetime. Every declaration method
//! returns a [`FieldHandle`] bound to the field it just added; rule calls
//! chain on the handle, so the target field is unambiguous regardless of
//! call order.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::deserializer::Deserializer;
use crate::error::{SchemaError, ValidationError};
use crate::fields::{
	ConversionError, FieldDefinition, FieldKind, FieldType, NestedField, ReadFn, ScalarValue,
	WriteFn,
};
use crate::rules::Pattern;
use crate::serializer::Serializer;
use crate::validator::Validator;

/// An ordered, immutable-after-build description of a record type's fields.
///
/// Field order is permanent: it drives traversal order for all three engines,
/// the serializer's output key order, and the fail-fast tie-break.
///
/// The convenience methods on this type run against the process-wide
/// [`TypeHandlerRegistry`](crate::handlers::TypeHandlerRegistry); construct a
/// [`Serializer`], [`Deserializer`], or [`Validator`] directly to use an
/// isolated registry.
///
/// # Examples
///
/// ```
/// use grappelli::Schema;
/// use serde_json::json;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct User {
/// 	username: String,
/// 	age: i32,
/// 	active: bool,
/// }
///
/// let mut builder = Schema::<User>::builder();
/// builder
/// 	.field("username", |u: &User| u.username.clone(), |u, v| u.username = v)
/// 	.required()
/// 	.min_length(3)
/// 	.max_length(20);
/// builder
/// 	.field("age", |u: &User| u.age, |u, v| u.age = v)
/// 	.range(18.0, 120.0);
/// builder
/// 	.field("active", |u: &User| u.active, |u, v| u.active = v)
/// 	.required();
/// let schema = builder.build().unwrap();
///
/// let input = json!({"username": "alice", "age": 30, "active": true});
/// schema.validate(&input).unwrap();
///
/// let user: User = schema.deserialize(&input).unwrap();
/// assert_eq!(user.username, "alice");
/// assert_eq!(schema.serialize(&user), input);
/// ```
pub struct Schema<T> {
	pub(crate) fields: Vec<FieldDefinition<T>>,
}

impl<T> Schema<T> {
	/// Starts a builder for a record type.
	pub fn builder() -> SchemaBuilder<T> {
		SchemaBuilder::new()
	}

	/// The field definitions, in declaration order.
	pub fn fields(&self) -> &[FieldDefinition<T>] {
		&self.fields
	}

	/// The field names, in declaration order.
	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|field| field.name())
	}

	/// Number of declared fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the schema has no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Converts a record into a value tree (best-effort, never fails).
	pub fn serialize(&self, record: &T) -> Value {
		Serializer::new().serialize(self, record)
	}

	/// Converts a record into JSON text via the collaborator.
	pub fn serialize_to_string(&self, record: &T) -> Result<String, ValidationError> {
		Serializer::new().serialize_to_string(self, record)
	}

	/// Populates a fresh record from a value tree (strict, fail-fast).
	pub fn deserialize(&self, tree: &Value) -> Result<T, ValidationError>
	where
		T: Default,
	{
		Deserializer::new().deserialize(self, tree)
	}

	/// Writes a value tree into a caller-owned record (strict, fail-fast).
	///
	/// On failure the record's partial state is unspecified and must not be
	/// treated as usable.
	pub fn deserialize_into(&self, tree: &Value, record: &mut T) -> Result<(), ValidationError> {
		Deserializer::new().deserialize_into(self, tree, record)
	}

	/// Parses JSON text via the collaborator, then deserializes.
	///
	/// Syntactically invalid text fails with
	/// [`ValidationError::MalformedInput`] before traversal begins.
	pub fn deserialize_str(&self, text: &str) -> Result<T, ValidationError>
	where
		T: Default,
	{
		Deserializer::new().deserialize_str(self, text)
	}

	/// Checks a value tree against every rule without touching any record.
	pub fn validate(&self, tree: &Value) -> Result<(), ValidationError> {
		Validator::new().validate(self, tree)
	}
}

impl<T> fmt::Debug for Schema<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Schema").field("fields", &self.fields).finish()
	}
}

/// Field-declaration builder for a [`Schema`].
///
/// Declaration methods append a field and return a [`FieldHandle`] for
/// attaching rules. Misconfigurations (a rule on an incompatible type, an
/// invalid pattern, a duplicate name) are recorded and reported by
/// [`build`](SchemaBuilder::build); rule calls themselves never fail, so
/// chains stay clean.
pub struct SchemaBuilder<T> {
	fields: Vec<FieldDefinition<T>>,
	error: Option<SchemaError>,
}

impl<T> SchemaBuilder<T> {
	pub fn new() -> Self {
		Self {
			fields: Vec::new(),
			error: None,
		}
	}

	fn push(&mut self, name: String, field_type: FieldType, kind: FieldKind<T>) -> FieldHandle<'_, T> {
		self.fields.push(FieldDefinition {
			name,
			field_type,
			rules: Default::default(),
			kind,
		});
		let index = self.fields.len() - 1;
		FieldHandle {
			builder: self,
			index,
		}
	}

	fn record_error(&mut self, error: SchemaError) {
		// First configuration error wins; later ones are consequences as
		// often as not.
		if self.error.is_none() {
			self.error = Some(error);
		}
	}

	/// Declares a scalar field; the tag is derived from the accessor type.
	///
	/// `V` ranges over `bool`, the integer widths, `f32`/`f64`, and
	/// `String` (see [`ScalarValue`]).
	pub fn field<V, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> FieldHandle<'_, T>
	where
		V: ScalarValue,
		G: Fn(&T) -> V + Send + Sync + 'static,
		S: Fn(&mut T, V) + Send + Sync + 'static,
	{
		let read: ReadFn<T> = Arc::new(move |record| get(record).into_value());
		let write: WriteFn<T> = Arc::new(move |record, value| {
			let parsed = V::from_value(value).ok_or(ConversionError)?;
			set(record, parsed);
			Ok(())
		});
		self.push(name.into(), V::FIELD_TYPE, FieldKind::Scalar { read, write })
	}

	/// Declares a string-backed field under a handler-validated tag:
	/// [`FieldType::Date`], [`FieldType::DateTime`], [`FieldType::Email`],
	/// [`FieldType::Url`], or [`FieldType::Uuid`].
	///
	/// Any other tag is a configuration error reported by `build`.
	pub fn string_as<G, S>(
		&mut self,
		name: impl Into<String>,
		tag: FieldType,
		get: G,
		set: S,
	) -> FieldHandle<'_, T>
	where
		G: Fn(&T) -> String + Send + Sync + 'static,
		S: Fn(&mut T, String) + Send + Sync + 'static,
	{
		let name = name.into();
		let read: ReadFn<T> = Arc::new(move |record| Value::String(get(record)));
		let write: WriteFn<T> = Arc::new(move |record, value| {
			let parsed = value.as_str().ok_or(ConversionError)?;
			set(record, parsed.to_string());
			Ok(())
		});
		match tag.handler_name() {
			Some(handler) => self.push(
				name,
				tag,
				FieldKind::Handler {
					handler: Cow::Borrowed(handler),
					read,
					write,
				},
			),
			None => {
				self.record_error(SchemaError::UnsupportedTag {
					field: name.clone(),
					field_type: tag,
				});
				self.push(name, FieldType::String, FieldKind::Scalar { read, write })
			}
		}
	}

	/// Declares a homogeneous array of one scalar element type.
	///
	/// The element type is bounded by [`ScalarValue`], which is what keeps
	/// arrays single-level: there is no scalar implementation for `Vec<_>`.
	pub fn array<V, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> FieldHandle<'_, T>
	where
		V: ScalarValue,
		G: Fn(&T) -> Vec<V> + Send + Sync + 'static,
		S: Fn(&mut T, Vec<V>) + Send + Sync + 'static,
	{
		let read: ReadFn<T> = Arc::new(move |record| {
			Value::Array(get(record).into_iter().map(ScalarValue::into_value).collect())
		});
		let write: WriteFn<T> = Arc::new(move |record, value| {
			let nodes = value.as_array().ok_or(ConversionError)?;
			let mut parsed = Vec::with_capacity(nodes.len());
			for node in nodes {
				parsed.push(V::from_value(node).ok_or(ConversionError)?);
			}
			// Replacing wholesale clears whatever the target held before.
			set(record, parsed);
			Ok(())
		});
		self.push(
			name.into(),
			FieldType::Array,
			FieldKind::Array {
				element: V::FIELD_TYPE,
				read,
				write,
			},
		)
	}

	/// Declares a nested-record field backed by a pre-built child schema.
	///
	/// Traversal recurses by delegating to the child schema against the
	/// projected sub-record; errors from inside carry `name.child_field`
	/// paths.
	pub fn nested<U, G, M>(
		&mut self,
		name: impl Into<String>,
		schema: Arc<Schema<U>>,
		get: G,
		get_mut: M,
	) -> FieldHandle<'_, T>
	where
		U: 'static,
		T: 'static,
		G: Fn(&T) -> &U + Send + Sync + 'static,
		M: Fn(&mut T) -> &mut U + Send + Sync + 'static,
	{
		let access = NestedField {
			schema,
			get: Arc::new(get),
			get_mut: Arc::new(get_mut),
		};
		self.push(name.into(), FieldType::Nested, FieldKind::Nested(Arc::new(access)))
	}

	/// Declares a field whose conversion is owned by a named type handler.
	///
	/// The handler is resolved from the registry on every call, so a later
	/// re-registration takes effect without rebuilding the schema. An
	/// unregistered name serializes as null and hard-fails deserialization.
	pub fn custom<G, S>(
		&mut self,
		name: impl Into<String>,
		handler: impl Into<String>,
		get: G,
		set: S,
	) -> FieldHandle<'_, T>
	where
		G: Fn(&T) -> Value + Send + Sync + 'static,
		S: Fn(&mut T, Value) + Send + Sync + 'static,
	{
		let read: ReadFn<T> = Arc::new(move |record| get(record));
		let write: WriteFn<T> = Arc::new(move |record, value| {
			set(record, value.clone());
			Ok(())
		});
		self.push(
			name.into(),
			FieldType::Custom,
			FieldKind::Handler {
				handler: Cow::Owned(handler.into()),
				read,
				write,
			},
		)
	}

	/// Finishes the builder phase.
	///
	/// Reports the first recorded configuration error, then checks for
	/// duplicate field names. The returned schema is immutable and safe for
	/// unlimited concurrent reads.
	pub fn build(self) -> Result<Schema<T>, SchemaError> {
		if let Some(error) = self.error {
			return Err(error);
		}
		let mut seen = HashSet::new();
		for field in &self.fields {
			if !seen.insert(field.name.as_str()) {
				return Err(SchemaError::DuplicateField {
					field: field.name.clone(),
				});
			}
		}
		Ok(Schema {
			fields: self.fields,
		})
	}
}

impl<T> Default for SchemaBuilder<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// Handle to one declared field, returned by the declaration methods.
///
/// Rule calls chain on the handle and always target the field it was bound
/// to. A rule that does not apply to the field's type records a
/// configuration error surfaced by [`SchemaBuilder::build`].
pub struct FieldHandle<'b, T> {
	builder: &'b mut SchemaBuilder<T>,
	index: usize,
}

impl<T> FieldHandle<'_, T> {
	fn field_type(&self) -> FieldType {
		self.builder.fields[self.index].field_type
	}

	fn field_name(&self) -> String {
		self.builder.fields[self.index].name.clone()
	}

	fn incompatible(&mut self, rule: &'static str) {
		let error = SchemaError::IncompatibleRule {
			field: self.field_name(),
			rule,
			field_type: self.field_type(),
		};
		self.builder.record_error(error);
	}

	/// Marks the field as required: its entry must be present (and non-null)
	/// in the input tree.
	pub fn required(mut self) -> Self {
		self.builder.fields[self.index].rules.required = true;
		self
	}

	/// Marks the field as optional (the default): an absent entry leaves the
	/// record untouched.
	pub fn optional(mut self) -> Self {
		self.builder.fields[self.index].rules.required = false;
		self
	}

	/// Inclusive minimum length, in characters for strings and elements for
	/// arrays.
	pub fn min_length(mut self, min: usize) -> Self {
		if self.field_type().is_string_backed() || self.field_type() == FieldType::Array {
			self.builder.fields[self.index].rules.min_length = Some(min);
		} else {
			self.incompatible("min_length");
		}
		self
	}

	/// Inclusive maximum length, in characters for strings and elements for
	/// arrays.
	pub fn max_length(mut self, max: usize) -> Self {
		if self.field_type().is_string_backed() || self.field_type() == FieldType::Array {
			self.builder.fields[self.index].rules.max_length = Some(max);
		} else {
			self.incompatible("max_length");
		}
		self
	}

	/// Inclusive numeric bounds.
	pub fn range(mut self, min: f64, max: f64) -> Self {
		if self.field_type().is_numeric() {
			let rules = &mut self.builder.fields[self.index].rules;
			rules.min_value = Some(min);
			rules.max_value = Some(max);
		} else {
			self.incompatible("range");
		}
		self
	}

	/// Full-match pattern for string-backed fields.
	///
	/// The entire value must match, not merely contain a match.
	pub fn pattern(mut self, source: &str) -> Self {
		if self.field_type().is_string_backed() {
			match Pattern::compile(source) {
				Ok(pattern) => {
					self.builder.fields[self.index].rules.pattern = Some(pattern);
				}
				Err(cause) => {
					let error = SchemaError::InvalidPattern {
						field: self.field_name(),
						source: cause,
					};
					self.builder.record_error(error);
				}
			}
		} else {
			self.incompatible("pattern");
		}
		self
	}

	/// Restricts the field to an allowed set of string representations,
	/// matched exactly and case-sensitively.
	pub fn one_of<I, V>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		if self.field_type().is_string_backed() || self.field_type().is_numeric() {
			self.builder.fields[self.index].rules.one_of =
				Some(values.into_iter().map(Into::into).collect());
		} else {
			self.incompatible("one_of");
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Default)]
	struct Sample {
		name: String,
		count: i32,
		enabled: bool,
	}

	fn name_field(builder: &mut SchemaBuilder<Sample>) -> FieldHandle<'_, Sample> {
		builder.field("name", |s: &Sample| s.name.clone(), |s, v| s.name = v)
	}

	#[test]
	fn test_builder_preserves_declaration_order() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder);
		builder.field("count", |s: &Sample| s.count, |s, v| s.count = v);
		builder.field("enabled", |s: &Sample| s.enabled, |s, v| s.enabled = v);
		let schema = builder.build().unwrap();

		let names: Vec<&str> = schema.field_names().collect();
		assert_eq!(names, vec!["name", "count", "enabled"]);
	}

	#[test]
	fn test_scalar_tags_are_derived_from_accessor_types() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder);
		builder.field("count", |s: &Sample| s.count, |s, v| s.count = v);
		builder.field("enabled", |s: &Sample| s.enabled, |s, v| s.enabled = v);
		let schema = builder.build().unwrap();

		let tags: Vec<FieldType> = schema.fields().iter().map(|f| f.field_type()).collect();
		assert_eq!(tags, vec![FieldType::String, FieldType::Int32, FieldType::Boolean]);
	}

	#[test]
	fn test_pattern_on_boolean_is_a_build_error() {
		let mut builder = Schema::<Sample>::builder();
		builder
			.field("enabled", |s: &Sample| s.enabled, |s, v| s.enabled = v)
			.pattern("[a-z]+");
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::IncompatibleRule { rule: "pattern", .. }));
	}

	#[test]
	fn test_range_on_string_is_a_build_error() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder).range(0.0, 10.0);
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::IncompatibleRule { rule: "range", .. }));
	}

	#[test]
	fn test_invalid_pattern_is_a_build_error() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder).pattern("[unclosed");
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::InvalidPattern { .. }));
	}

	#[test]
	fn test_duplicate_field_name_is_a_build_error() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder);
		name_field(&mut builder);
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::DuplicateField { .. }));
	}

	#[test]
	fn test_string_as_rejects_non_handler_tags() {
		let mut builder = Schema::<Sample>::builder();
		builder.string_as(
			"name",
			FieldType::Int32,
			|s: &Sample| s.name.clone(),
			|s, v| s.name = v,
		);
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::UnsupportedTag { .. }));
	}

	#[test]
	fn test_first_configuration_error_wins() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder).range(0.0, 1.0);
		builder
			.field("enabled", |s: &Sample| s.enabled, |s, v| s.enabled = v)
			.pattern("x");
		let error = builder.build().unwrap_err();
		assert!(matches!(error, SchemaError::IncompatibleRule { rule: "range", .. }));
	}

	#[test]
	fn test_fields_default_to_optional() {
		let mut builder = Schema::<Sample>::builder();
		name_field(&mut builder);
		let schema = builder.build().unwrap();
		assert!(!schema.fields()[0].rules().required);
	}

	#[test]
	fn test_built_schema_is_shareable_across_threads() {
		fn assert_send_sync<X: Send + Sync>() {}
		assert_send_sync::<Schema<Sample>>();
	}
}
