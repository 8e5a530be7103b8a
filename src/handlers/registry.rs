//! Name-to-handler registry with a process-wide default instance.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::{DateHandler, DateTimeHandler, EmailHandler, TypeHandler, UrlHandler, UuidHandler};

static GLOBAL_REGISTRY: Lazy<TypeHandlerRegistry> = Lazy::new(TypeHandlerRegistry::with_builtins);

/// Mapping from type name to handler.
///
/// The process-wide instance behind [`TypeHandlerRegistry::global`] is
/// initialized with the built-ins exactly once, no matter how many threads
/// race to touch it first. `register` is last-writer-wins, including over the
/// built-ins, and carries no synchronization guarantee against concurrent
/// `get` calls: register handlers during startup configuration, before
/// concurrent traffic begins.
///
/// Standalone instances ([`TypeHandlerRegistry::with_builtins`] or
/// [`TypeHandlerRegistry::empty`]) exist so tests and embedded setups can run
/// isolated configurations; every engine accepts one in place of the global.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::TypeHandlerRegistry;
///
/// let registry = TypeHandlerRegistry::with_builtins();
/// assert!(registry.contains("email"));
/// assert!(registry.contains("uuid"));
/// assert!(!registry.contains("money"));
/// ```
pub struct TypeHandlerRegistry {
	handlers: RwLock<HashMap<String, Arc<dyn TypeHandler>>>,
}

impl TypeHandlerRegistry {
	/// Creates a registry with no handlers at all.
	pub fn empty() -> Self {
		Self {
			handlers: RwLock::new(HashMap::new()),
		}
	}

	/// Creates a registry populated with the built-in handlers:
	/// `email`, `url`, `uuid`, `date`, `datetime`.
	pub fn with_builtins() -> Self {
		let registry = Self::empty();
		{
			let mut handlers = registry.handlers.write();
			handlers.insert("email".to_string(), Arc::new(EmailHandler));
			handlers.insert("url".to_string(), Arc::new(UrlHandler));
			handlers.insert("uuid".to_string(), Arc::new(UuidHandler));
			handlers.insert("date".to_string(), Arc::new(DateHandler));
			handlers.insert("datetime".to_string(), Arc::new(DateTimeHandler));
		}
		registry
	}

	/// The process-wide registry used by the `Schema` convenience methods.
	pub fn global() -> &'static TypeHandlerRegistry {
		&GLOBAL_REGISTRY
	}

	/// Registers a handler under `name`, replacing any previous entry.
	pub fn register(&self, name: impl Into<String>, handler: impl TypeHandler + 'static) {
		let name = name.into();
		let replaced = self
			.handlers
			.write()
			.insert(name.clone(), Arc::new(handler));
		if replaced.is_some() {
			tracing::debug!(handler = %name, "replacing registered type handler");
		}
	}

	/// Looks up a handler by name.
	pub fn get(&self, name: &str) -> Option<Arc<dyn TypeHandler>> {
		self.handlers.read().get(name).cloned()
	}

	/// Whether a handler is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.handlers.read().contains_key(name)
	}
}

impl Default for TypeHandlerRegistry {
	fn default() -> Self {
		Self::with_builtins()
	}
}

/// Registers a handler in the process-wide registry.
///
/// # Examples
///
/// ```
/// use grappelli::handlers::{HandlerError, TypeHandler, register_handler, wire_str};
/// use serde_json::Value;
///
/// struct HexColorHandler;
///
/// impl TypeHandler for HexColorHandler {
/// 	fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
/// 		Ok(stored.clone())
/// 	}
///
/// 	fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
/// 		self.validate(wire)?;
/// 		Ok(wire.clone())
/// 	}
///
/// 	fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
/// 		let text = wire_str(wire, "a hex color string")?;
/// 		let ok = text.len() == 7
/// 			&& text.starts_with('#')
/// 			&& text[1..].chars().all(|c| c.is_ascii_hexdigit());
/// 		if ok {
/// 			Ok(())
/// 		} else {
/// 			Err(HandlerError::expected("a hex color like #a1b2c3"))
/// 		}
/// 	}
/// }
///
/// register_handler("hex_color", HexColorHandler);
/// ```
pub fn register_handler(name: impl Into<String>, handler: impl TypeHandler + 'static) {
	TypeHandlerRegistry::global().register(name, handler);
}

/// Looks up a handler in the process-wide registry.
pub fn handler(name: &str) -> Option<Arc<dyn TypeHandler>> {
	TypeHandlerRegistry::global().get(name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::HandlerError;
	use serde_json::{Value, json};

	struct UppercaseHandler;

	impl TypeHandler for UppercaseHandler {
		fn serialize(&self, stored: &Value) -> Result<Value, HandlerError> {
			Ok(stored.clone())
		}

		fn deserialize(&self, wire: &Value) -> Result<Value, HandlerError> {
			self.validate(wire)?;
			Ok(wire.clone())
		}

		fn validate(&self, wire: &Value) -> Result<(), HandlerError> {
			let text = crate::handlers::wire_str(wire, "an uppercase string")?;
			if text.chars().all(|c| !c.is_lowercase()) {
				Ok(())
			} else {
				Err(HandlerError::expected("an uppercase string"))
			}
		}
	}

	#[test]
	fn test_empty_registry_has_no_builtins() {
		let registry = TypeHandlerRegistry::empty();
		assert!(!registry.contains("email"));
		assert!(registry.get("email").is_none());
	}

	#[test]
	fn test_builtins_are_present() {
		let registry = TypeHandlerRegistry::with_builtins();
		for name in ["email", "url", "uuid", "date", "datetime"] {
			assert!(registry.contains(name), "missing builtin '{name}'");
		}
	}

	#[test]
	fn test_register_is_last_writer_wins() {
		let registry = TypeHandlerRegistry::with_builtins();

		// The builtin accepts a well-formed address; the override does not.
		let email = json!("alice@example.com");
		assert!(registry.get("email").unwrap().validate(&email).is_ok());

		registry.register("email", UppercaseHandler);
		assert!(registry.get("email").unwrap().validate(&email).is_err());
		assert!(
			registry
				.get("email")
				.unwrap()
				.validate(&json!("ALICE"))
				.is_ok()
		);
	}

	#[test]
	fn test_global_registry_is_initialized_once() {
		let first = TypeHandlerRegistry::global() as *const _;
		let second = TypeHandlerRegistry::global() as *const _;
		assert_eq!(first, second);
		assert!(TypeHandlerRegistry::global().contains("date"));
	}
}
