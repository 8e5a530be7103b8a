//! Integration tests for type handler registration and override.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use grappelli::handlers::{HandlerError, TypeHandler, TypeHandlerRegistry, wire_str};
use grappelli::{Deserializer, FieldType, Schema, Serializer, Validator};
use serde_json::{Value, json};

#[derive(Debug, Default, PartialEq)]
struct Contact {
	email: String,
}

fn contact_schema() -> Schema<Contact> {
	let mut builder = Schema::<Contact>::builder();
	builder
		.string_as(
			"email",
			FieldType::Email,
			|c: &Contact| c.email.clone(),
			|c, v| c.email = v,
		)
		.required();
	builder.build().unwrap()
}

/// Accepts only addresses under one domain, and counts invocations so tests
/// can prove which handler ran.
struct CorpEmailHandler {
	calls: Arc<AtomicUsize>,
}

impl TypeHandler for CorpEmailHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		self.validate(wire)?;
		Ok(wire.clone())
	}

	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let text = wire_str(wire, "a corp email address")?;
		if text.ends_with("@corp.example") {
			Ok(())
		} else {
			Err(HandlerError::expected("an address under corp.example"))
		}
	}
}

/// Counts every call so a test can assert it was never reached.
struct CountingHandler {
	calls: Arc<AtomicUsize>,
}

impl TypeHandler for CountingHandler {
	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(stored.clone())
	}

	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(wire.clone())
	}

	fn validate(&self, _wire: &Value) -> Result<(), HandlerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[test]
fn test_builtin_email_handler_is_used_by_default() {
	let registry = TypeHandlerRegistry::with_builtins();
	let schema = contact_schema();
	let validator = Validator::with_registry(&registry);

	assert!(validator.validate(&schema, &json!({"email": "a@example.com"})).is_ok());
	assert!(validator.validate(&schema, &json!({"email": "nope"})).is_err());
}

#[test]
fn test_override_replaces_builtin_for_all_three_operations() {
	let registry = TypeHandlerRegistry::with_builtins();
	let calls = Arc::new(AtomicUsize::new(0));
	registry.register("email", CorpEmailHandler { calls: calls.clone() });

	let schema = contact_schema();
	let validator = Validator::with_registry(&registry);
	let deserializer = Deserializer::with_registry(&registry);
	let serializer = Serializer::with_registry(&registry);

	// A perfectly ordinary address no longer passes.
	assert!(
		validator
			.validate(&schema, &json!({"email": "a@example.com"}))
			.is_err()
	);
	assert!(
		validator
			.validate(&schema, &json!({"email": "a@corp.example"}))
			.is_ok()
	);

	let contact: Contact = deserializer
		.deserialize(&schema, &json!({"email": "a@corp.example"}))
		.unwrap();
	assert_eq!(contact.email, "a@corp.example");
	assert!(
		deserializer
			.deserialize::<Contact>(&schema, &json!({"email": "a@example.com"}))
			.is_err()
	);

	let tree = serializer.serialize(&schema, &contact);
	assert_eq!(tree, json!({"email": "a@corp.example"}));

	// Every one of those calls went through the override.
	assert!(calls.load(Ordering::SeqCst) >= 5);
}

#[test]
fn test_replaced_handler_is_never_invoked_again() {
	let registry = TypeHandlerRegistry::empty();
	let old_calls = Arc::new(AtomicUsize::new(0));
	let new_calls = Arc::new(AtomicUsize::new(0));

	registry.register("stamp", CountingHandler { calls: old_calls.clone() });
	registry.register("stamp", CountingHandler { calls: new_calls.clone() });

	let handler = registry.get("stamp").unwrap();
	handler.validate(&json!("x")).unwrap();
	handler.serialize(&json!("x")).unwrap();
	handler.deserialize(&json!("x")).unwrap();

	assert_eq!(old_calls.load(Ordering::SeqCst), 0);
	assert_eq!(new_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_custom_type_resolves_at_call_time() {
	// Registering after the schema is built still takes effect: handler
	// names are looked up per call, not captured at build time.
	#[derive(Debug, Default)]
	struct Doc {
		body: String,
	}

	let mut builder = Schema::<Doc>::builder();
	builder
		.custom(
			"body",
			"passthrough",
			|d: &Doc| Value::String(d.body.clone()),
			|d, v| d.body = v.as_str().unwrap_or_default().to_string(),
		)
		.required();
	let schema = builder.build().unwrap();

	let registry = TypeHandlerRegistry::empty();
	let deserializer = Deserializer::with_registry(&registry);
	assert!(
		deserializer
			.deserialize::<Doc>(&schema, &json!({"body": "hello"}))
			.is_err()
	);

	let calls = Arc::new(AtomicUsize::new(0));
	registry.register("passthrough", CountingHandler { calls });
	let doc: Doc = deserializer
		.deserialize(&schema, &json!({"body": "hello"}))
		.unwrap();
	assert_eq!(doc.body, "hello");
}

#[test]
fn test_global_registry_serves_builtins() {
	// Read-only use of the process-wide instance; override tests stay on
	// isolated registries so parallel tests cannot observe each other.
	let global = TypeHandlerRegistry::global();
	for name in ["email", "url", "uuid", "date", "datetime"] {
		assert!(global.contains(name), "missing builtin '{name}'");
	}
}
