//! Boolean schema validation.

use serde_json::Value;
use stillwater::Validation;

use crate::error::FieldError;
use crate::path::FieldPath;
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{fail, type_error};

/// A schema for checkbox and toggle values.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let terms = Schema::boolean()
///     .accepted()
///     .error("you must accept the terms of service");
///
/// assert!(terms.validate(&json!(true), &FieldPath::root()).is_success());
/// let errors = terms.validate(&json!(false), &FieldPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().message, "you must accept the terms of service");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    accepted: Option<Option<String>>,
    type_error_message: Option<String>,
}

impl BooleanSchema {
    /// Creates a new boolean schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the value to be `true`.
    pub fn accepted(mut self) -> Self {
        self.accepted = Some(None);
        self
    }

    /// Sets the message for `accepted`, or the type error message when
    /// `accepted` has not been declared.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.accepted.as_mut() {
            Some(m) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<bool> {
        let b = match value.as_bool() {
            Some(b) => b,
            None => return type_error(path, &self.type_error_message, "boolean", value),
        };

        match &self.accepted {
            Some(message) if !b => fail(
                FieldError::new(
                    path.clone(),
                    message.clone().unwrap_or_else(|| "must be accepted".to_string()),
                )
                .with_code("accepted"),
            ),
            _ => Validation::Success(b),
        }
    }
}

impl SchemaLike for BooleanSchema {
    type Output = bool;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<bool> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::Bool)
    }
}
