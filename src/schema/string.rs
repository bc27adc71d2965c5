//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating text inputs with
//! length, pattern, email and phone-number predicates.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, SchemaConstructionError};
use crate::path::FieldPath;
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{fail, type_error};

/// `local@domain.tld`: no whitespace, dot-separated domain labels that do not
/// start or end with `-`, and a top-level label of at least two characters.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@(?:[^\s@.\-](?:[^\s@.]*[^\s@.\-])?\.)+[^\s@.\-][^\s@.]*[^\s@.\-]$")
        .expect("email pattern is valid")
});

/// E.164: `+`, a non-zero leading digit, 8 to 15 digits in total.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("phone pattern is valid"));

/// A predicate applied to string values.
#[derive(Debug, Clone)]
enum StringConstraint {
    NonEmpty {
        message: Option<String>,
    },
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Length {
        len: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Email {
        message: Option<String>,
    },
    Phone {
        message: Option<String>,
    },
}

/// A schema for validating string values.
///
/// Predicates run in declaration order and the first failing one is the only
/// error reported for the field. A non-string value fails the type check and
/// no predicate runs.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::string()
///     .trim()
///     .min_len(3)
///     .max_len(20)
///     .pattern(r"^[a-z0-9-]+$")
///     .unwrap();
///
/// let result = schema.validate(&json!("  gateway-01 "), &FieldPath::root());
/// assert_eq!(result.into_result().unwrap(), "gateway-01");
///
/// // Too short AND not matching: only the first failure is reported.
/// let errors = schema.validate(&json!("A!"), &FieldPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().code, "min_length");
/// ```
#[derive(Debug, Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    trim: bool,
    type_error_message: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            trim: false,
            type_error_message: None,
        }
    }

    /// Trims surrounding whitespace before predicates run.
    ///
    /// The trimmed string is also the validated output.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Requires at least one character. Reported with the `required` code.
    pub fn non_empty(mut self) -> Self {
        self.constraints
            .push(StringConstraint::NonEmpty { message: None });
        self
    }

    /// Adds a minimum length constraint, counted in characters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().min_len(2);
    ///
    /// let errors = schema.validate(&json!("A"), &FieldPath::root()).into_result().unwrap_err();
    /// assert_eq!(errors.first().message, "must be at least 2 characters");
    /// ```
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    /// Adds a maximum length constraint, counted in characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires exactly `len` characters.
    pub fn length(mut self, len: usize) -> Self {
        self.constraints
            .push(StringConstraint::Length { len, message: None });
        self
    }

    /// Adds a regex pattern constraint.
    ///
    /// Returns an error if the pattern does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaConstructionError> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires a plausible email address (`local@domain.tld`).
    pub fn email(mut self) -> Self {
        self.constraints.push(StringConstraint::Email { message: None });
        self
    }

    /// Requires an E.164 phone number (`+` followed by 8 to 15 digits).
    pub fn phone(mut self) -> Self {
        self.constraints.push(StringConstraint::Phone { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when the value is not a string).
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string()
    ///     .min_len(8)
    ///     .error("password must be at least 8 characters");
    ///
    /// let errors = schema.validate(&json!("hunter2"), &FieldPath::root()).into_result().unwrap_err();
    /// assert_eq!(errors.first().message, "password must be at least 8 characters");
    /// ```
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                StringConstraint::NonEmpty { message: m }
                | StringConstraint::MinLength { message: m, .. }
                | StringConstraint::MaxLength { message: m, .. }
                | StringConstraint::Length { message: m, .. }
                | StringConstraint::Pattern { message: m, .. }
                | StringConstraint::Email { message: m }
                | StringConstraint::Phone { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    ///
    /// Returns the (possibly trimmed) string on success, or a single error
    /// for the first failing predicate.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<String> {
        let raw = match value.as_str() {
            Some(s) => s,
            None => return type_error(path, &self.type_error_message, "string", value),
        };
        let s = if self.trim { raw.trim() } else { raw };

        match self
            .constraints
            .iter()
            .find_map(|c| check_constraint(c, s, path))
        {
            Some(error) => fail(error),
            None => Validation::Success(s.to_string()),
        }
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<String> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::String)
    }
}

/// Checks a single constraint and returns an error if it fails.
fn check_constraint(
    constraint: &StringConstraint,
    value: &str,
    path: &FieldPath,
) -> Option<FieldError> {
    let violation = |message: &Option<String>, default: String, code: &str| {
        Some(
            FieldError::new(path.clone(), message.clone().unwrap_or(default)).with_code(code),
        )
    };

    match constraint {
        StringConstraint::NonEmpty { message } if value.is_empty() => {
            violation(message, "is required".to_string(), "required")
        }
        StringConstraint::MinLength { min, message } if value.chars().count() < *min => violation(
            message,
            format!("must be at least {} characters", min),
            "min_length",
        ),
        StringConstraint::MaxLength { max, message } if value.chars().count() > *max => violation(
            message,
            format!("must be at most {} characters", max),
            "max_length",
        ),
        StringConstraint::Length { len, message } if value.chars().count() != *len => violation(
            message,
            format!("must be exactly {} characters", len),
            "length",
        ),
        StringConstraint::Pattern { regex, message } if !regex.is_match(value) => violation(
            message,
            format!("must match pattern '{}'", regex.as_str()),
            "pattern",
        ),
        StringConstraint::Email { message } if !EMAIL_RE.is_match(value) => {
            violation(message, "invalid email address".to_string(), "email")
        }
        StringConstraint::Phone { message } if !PHONE_RE.is_match(value) => {
            violation(message, "invalid phone number".to_string(), "phone")
        }
        _ => None,
    }
}
