//! Named form storage.
//!
//! This module provides the [`FormRegistry`] type that stores the dashboard's
//! form schemas (device, message, webhook, API key, ...) under names, so the
//! code that renders a form and the code that validates a submission share
//! one definition.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::FieldErrors;
use crate::path::FieldPath;
use crate::schema::{DefinitionError, FieldSchema};
use crate::summary::{summarize, SummaryEntry};
use crate::ValidationResult;

/// Type alias for the form storage map.
type FormMap = Arc<RwLock<IndexMap<String, Arc<FieldSchema>>>>;

/// A thread-safe registry of named form schemas.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// Cloning a registry is cheap and the clones share storage.
///
/// # Example
///
/// ```rust
/// use formcheck::{FormRegistry, Schema};
/// use serde_json::json;
///
/// let registry = FormRegistry::new();
/// registry
///     .register(
///         "apiKey",
///         Schema::object()
///             .field("name", Schema::string().trim().min_len(3))
///             .field("expiresAt", Schema::date()),
///     )
///     .unwrap();
///
/// let result = registry
///     .validate("apiKey", &json!({"name": "ci", "expiresAt": "2025-01-01"}))
///     .unwrap();
/// assert!(result.is_failure());
/// ```
pub struct FormRegistry {
    forms: FormMap,
}

impl FormRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            forms: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Registers a schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register(
        &self,
        name: impl Into<String>,
        schema: impl Into<FieldSchema>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut forms = self.forms.write();

        if forms.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        debug!(form = %name, "form registered");
        forms.insert(name, Arc::new(schema.into()));
        Ok(())
    }

    /// Compiles a JSON schema document and registers it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::FormRegistry;
    /// use serde_json::json;
    ///
    /// let registry = FormRegistry::new();
    /// registry
    ///     .register_json("message", r#"{
    ///         "type": "object",
    ///         "fields": {
    ///             "to": { "type": "string", "phone": true },
    ///             "body": { "type": "string", "non_empty": true, "max_length": 1600 }
    ///         }
    ///     }"#)
    ///     .unwrap();
    ///
    /// let errors = registry
    ///     .validate("message", &json!({"to": "12", "body": "hi"}))
    ///     .unwrap()
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().path.to_string(), "to");
    /// ```
    pub fn register_json(&self, name: impl Into<String>, json: &str) -> Result<(), RegistryError> {
        let schema = FieldSchema::from_json_str(json)?;
        self.register(name, schema)
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<FieldSchema>> {
        self.forms.read().get(name).cloned()
    }

    /// Returns true if a form is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.forms.read().contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.forms.read().keys().cloned().collect()
    }

    fn require(&self, name: &str) -> Result<Arc<FieldSchema>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))
    }

    /// Validates a value against a named form.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the form name doesn't exist.
    pub fn validate(&self, name: &str, value: &Value) -> Result<ValidationResult, RegistryError> {
        let schema = self.require(name)?;
        Ok(schema.validate(value, &FieldPath::root()))
    }

    /// Validates only the named top-level fields of a form.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` for an unknown form and
    /// `RegistryError::NotAnObject` when the form is not an object schema.
    pub fn validate_subset<I, S>(
        &self,
        name: &str,
        value: &Value,
        fields: I,
    ) -> Result<ValidationResult<Map<String, Value>>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schema = self.require(name)?;
        let object = schema
            .as_object()
            .ok_or_else(|| RegistryError::NotAnObject(name.to_string()))?;
        Ok(object.validate_subset(value, &FieldPath::root(), fields))
    }

    /// Orders `errors` for the summary of a named form.
    pub fn summarize(&self, name: &str, errors: &FieldErrors) -> Result<Vec<SummaryEntry>, RegistryError> {
        let schema = self.require(name)?;
        Ok(summarize(schema.as_ref(), errors))
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FormRegistry {
    fn clone(&self) -> Self {
        Self {
            forms: Arc::clone(&self.forms),
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a form with a name that already exists.
    #[error("form '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to use a form name that doesn't exist.
    #[error("form '{0}' not found")]
    SchemaNotFound(String),

    /// Partial validation was requested for a form that is not an object.
    #[error("form '{0}' is not an object schema")]
    NotAnObject(String),

    /// A schema document could not be loaded.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    #[test]
    fn test_duplicate_name() {
        let registry = FormRegistry::new();
        registry.register("device", Schema::object()).unwrap();
        assert!(matches!(
            registry.register("device", Schema::object()),
            Err(RegistryError::DuplicateName(n)) if n == "device"
        ));
    }

    #[test]
    fn test_names_in_registration_order() {
        let registry = FormRegistry::new();
        registry.register("webhook", Schema::object()).unwrap();
        registry.register("account", Schema::object()).unwrap();
        assert_eq!(registry.names(), vec!["webhook", "account"]);
        assert!(registry.contains("account"));
        assert!(registry.get("billing").is_none());
    }

    #[test]
    fn test_unknown_form() {
        let registry = FormRegistry::new();
        assert!(matches!(
            registry.validate("missing", &json!({})),
            Err(RegistryError::SchemaNotFound(n)) if n == "missing"
        ));
    }

    #[test]
    fn test_subset_requires_object() {
        let registry = FormRegistry::new();
        registry.register("tags", Schema::array(Schema::string())).unwrap();
        assert!(matches!(
            registry.validate_subset("tags", &json!([]), ["a"]),
            Err(RegistryError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_register_json_surfaces_definition_errors() {
        let registry = FormRegistry::new();
        let err = registry
            .register_json("broken", r#"{"type": "array"}"#)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Definition(_)));
        assert!(!registry.contains("broken"));
    }

    #[test]
    fn test_clones_share_storage() {
        let registry = FormRegistry::new();
        let clone = registry.clone();
        clone.register("device", Schema::object()).unwrap();
        assert!(registry.contains("device"));
    }
}
