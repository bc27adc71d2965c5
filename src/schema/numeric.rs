//! Numeric schema validation.
//!
//! This module provides [`NumberSchema`] for validating numeric inputs with
//! integer, bound and sign predicates. Form inputs usually arrive as strings,
//! so a schema can opt into coercing numeric strings with
//! [`NumberSchema::coerce`].

use serde_json::{Number, Value};
use std::ops::RangeInclusive;
use stillwater::Validation;

use crate::error::FieldError;
use crate::path::FieldPath;
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{fail, type_error};

/// A predicate applied to numeric values.
#[derive(Debug, Clone)]
enum NumberConstraint {
    Int { message: Option<String> },
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    Positive { message: Option<String> },
    NonNegative { message: Option<String> },
}

/// A schema for validating numbers.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let age = Schema::integer().range(18..=120);
///
/// assert!(age.validate(&json!(42), &FieldPath::root()).is_success());
///
/// let errors = age.validate(&json!(15), &FieldPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().message, "must be at least 18");
/// ```
#[derive(Debug, Clone)]
pub struct NumberSchema {
    constraints: Vec<NumberConstraint>,
    coerce: bool,
    type_error_message: Option<String>,
}

impl NumberSchema {
    /// Creates a new number schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            coerce: false,
            type_error_message: None,
        }
    }

    /// Accepts strings holding a finite number (`"42"`, `" 3.5 "`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let port = Schema::integer().coerce().range(1..=65535);
    /// let result = port.validate(&json!("8080"), &FieldPath::root());
    /// assert_eq!(result.into_result().unwrap().as_i64(), Some(8080));
    /// ```
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Requires a whole number.
    pub fn int(mut self) -> Self {
        self.constraints.push(NumberConstraint::Int { message: None });
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: impl Into<f64>) -> Self {
        self.constraints.push(NumberConstraint::Min {
            value: value.into(),
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: impl Into<f64>) -> Self {
        self.constraints.push(NumberConstraint::Max {
            value: value.into(),
            message: None,
        });
        self
    }

    /// Adds both minimum and maximum value constraints (inclusive range).
    ///
    /// Equivalent to `.min(start).max(end)`.
    pub fn range<N: Into<f64> + Copy>(self, range: RangeInclusive<N>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Requires a value greater than 0.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Positive { message: None });
        self
    }

    /// Requires a value greater than or equal to 0.
    pub fn non_negative(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::NonNegative { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when the value is not a number).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                NumberConstraint::Int { message: m }
                | NumberConstraint::Min { message: m, .. }
                | NumberConstraint::Max { message: m, .. }
                | NumberConstraint::Positive { message: m }
                | NumberConstraint::NonNegative { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    ///
    /// Returns the number on success (as parsed, when coercion applied), or
    /// a single error for the type check or the first failing predicate.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Number> {
        let (number, n) = match self.conform(value) {
            Some(pair) => pair,
            None => return type_error(path, &self.type_error_message, "number", value),
        };

        match self
            .constraints
            .iter()
            .find_map(|c| check_constraint(c, n, path))
        {
            Some(error) => fail(error),
            None => Validation::Success(number),
        }
    }

    /// Type conformance: the JSON number itself, or a parsed string when
    /// coercion is enabled.
    fn conform(&self, value: &Value) -> Option<(Number, f64)> {
        match value {
            Value::Number(num) => num.as_f64().map(|n| (num.clone(), n)),
            Value::String(s) if self.coerce => {
                let n: f64 = s.trim().parse().ok()?;
                if !n.is_finite() {
                    return None;
                }
                Some((to_number(n)?, n))
            }
            _ => None,
        }
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for NumberSchema {
    type Output = Number;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Number> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::Number)
    }
}

/// Whole numbers within i64 range keep an integer representation.
fn to_number(n: f64) -> Option<Number> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

/// Checks a single constraint and returns an error if it fails.
fn check_constraint(constraint: &NumberConstraint, n: f64, path: &FieldPath) -> Option<FieldError> {
    let violation = |message: &Option<String>, default: String, code: &str| {
        Some(
            FieldError::new(path.clone(), message.clone().unwrap_or(default)).with_code(code),
        )
    };

    match constraint {
        NumberConstraint::Int { message } if n.fract() != 0.0 => {
            violation(message, "must be an integer".to_string(), "integer")
        }
        NumberConstraint::Min { value, message } if n < *value => {
            violation(message, format!("must be at least {}", value), "min")
        }
        NumberConstraint::Max { value, message } if n > *value => {
            violation(message, format!("must be at most {}", value), "max")
        }
        NumberConstraint::Positive { message } if n <= 0.0 => {
            violation(message, "must be greater than 0".to_string(), "positive")
        }
        NumberConstraint::NonNegative { message } if n < 0.0 => {
            violation(message, "must not be negative".to_string(), "non_negative")
        }
        _ => None,
    }
}
