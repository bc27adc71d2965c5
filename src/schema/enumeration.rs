//! Enum-of-literals schema validation.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, SchemaConstructionError};
use crate::path::FieldPath;
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{fail, type_error};

/// A schema accepting one of a fixed set of string literals.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let role = Schema::enumeration(["admin", "user", "guest"]).unwrap();
///
/// let errors = role.validate(&json!("superadmin"), &FieldPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().message, "must be one of: admin, user, guest");
/// ```
#[derive(Debug, Clone)]
pub struct EnumSchema {
    variants: Vec<String>,
    message: Option<String>,
}

impl EnumSchema {
    /// Creates an enum schema.
    ///
    /// Fails when no variants are given or a variant repeats.
    pub fn new<I, S>(variants: I) -> Result<Self, SchemaConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for variant in variants {
            let variant = variant.into();
            if collected.contains(&variant) {
                return Err(SchemaConstructionError::DuplicateVariant(variant));
            }
            collected.push(variant);
        }
        if collected.is_empty() {
            return Err(SchemaConstructionError::EmptyEnum);
        }
        Ok(Self {
            variants: collected,
            message: None,
        })
    }

    /// Returns the declared variants in order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Sets the message reported for a non-member value.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Validates a value against this schema.
    ///
    /// A non-string is a type error; a string outside the set is an `enum`
    /// error. Either way exactly one error is reported.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<String> {
        let Some(s) = value.as_str() else {
            return type_error(path, &None, "string", value);
        };

        if self.variants.iter().any(|v| v == s) {
            Validation::Success(s.to_string())
        } else {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("must be one of: {}", self.variants.join(", ")));
            fail(FieldError::new(path.clone(), message).with_code("enum"))
        }
    }
}

impl SchemaLike for EnumSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<String> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::String)
    }
}
