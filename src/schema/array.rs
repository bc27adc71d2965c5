//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for dynamic list fields (skills, phone
//! numbers, webhook headers): one element schema plus length and uniqueness
//! constraints.

use serde_json::Value;
use stillwater::Validation;
use tracing::debug;

use crate::error::{FieldError, FieldErrors};
use crate::path::{FieldPath, PathSegment};
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{type_error, FieldSchema};

/// A constraint applied to the array as a whole.
#[derive(Debug, Clone)]
enum ArrayConstraint {
    MinItems { min: usize, message: Option<String> },
    MaxItems { max: usize, message: Option<String> },
    Unique { message: Option<String> },
}

/// A schema for validating arrays.
///
/// Length violations are reported at the array's own path (`skills`);
/// element violations at the element path (`skills.2`). Every element is
/// validated even when a length constraint fails.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let skills = Schema::array(Schema::string().trim().non_empty().error("cannot be empty"))
///     .min_len(1)
///     .error("at least one skill is required");
///
/// let errors = skills
///     .validate(&json!([]), &FieldPath::from_field("skills"))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "skills");
///
/// let errors = skills
///     .validate(&json!(["rust", "sql", " "]), &FieldPath::from_field("skills"))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "skills.2");
/// assert_eq!(errors.first().message, "cannot be empty");
/// ```
#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Box<FieldSchema>,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl ArraySchema {
    /// Creates a new array schema with the given element schema.
    pub fn new(element: impl Into<FieldSchema>) -> Self {
        Self {
            element: Box::new(element.into()),
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Returns the element schema.
    pub fn element(&self) -> &FieldSchema {
        &self.element
    }

    /// Requires at least `min` items.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinItems { min, message: None });
        self
    }

    /// Requires at most `max` items.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxItems { max, message: None });
        self
    }

    /// Requires at least one item. Equivalent to `.min_len(1)`.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Requires distinct items. Later duplicates are reported at their own
    /// element path.
    pub fn unique(mut self) -> Self {
        self.constraints
            .push(ArrayConstraint::Unique { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when the value is not an array).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                ArrayConstraint::MinItems { message: m, .. }
                | ArrayConstraint::MaxItems { message: m, .. }
                | ArrayConstraint::Unique { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    ///
    /// # Validation Process
    ///
    /// 1. Check that the value is an array (type check)
    /// 2. Check length constraints; the first failing one is reported
    /// 3. Validate each item against the element schema
    /// 4. Report duplicates for items that passed their own validation
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Vec<Value>> {
        let arr = match value.as_array() {
            Some(a) => a,
            None => return type_error(path, &self.type_error_message, "array", value),
        };

        let mut errors = Vec::new();

        let length_violation = self.constraints.iter().find_map(|c| match c {
            ArrayConstraint::MinItems { min, message } if arr.len() < *min => Some(
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| format!("must contain at least {} items", min)),
                )
                .with_code("min_items"),
            ),
            ArrayConstraint::MaxItems { max, message } if arr.len() > *max => Some(
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| format!("must contain at most {} items", max)),
                )
                .with_code("max_items"),
            ),
            _ => None,
        });
        errors.extend(length_violation);

        let mut outputs: Vec<Option<Value>> = Vec::with_capacity(arr.len());
        for (index, item) in arr.iter().enumerate() {
            match self.element.validate(item, &path.push_index(index)) {
                Validation::Success(v) => outputs.push(Some(v)),
                Validation::Failure(e) => {
                    outputs.push(None);
                    errors.extend(e);
                }
            }
        }

        for constraint in &self.constraints {
            if let ArrayConstraint::Unique { message } = constraint {
                for index in duplicate_indices(&outputs) {
                    errors.push(
                        FieldError::new(
                            path.push_index(index),
                            message.clone().unwrap_or_else(|| "duplicate value".to_string()),
                        )
                        .with_code("unique"),
                    );
                }
            }
        }

        match FieldErrors::from_vec(errors) {
            None => Validation::Success(outputs.into_iter().flatten().collect()),
            Some(errors) => {
                debug!(path = %path, items = arr.len(), errors = errors.len(), "array validation failed");
                Validation::Failure(errors)
            }
        }
    }

    pub(crate) fn resolve_segments(&self, segments: &[PathSegment]) -> Option<&FieldSchema> {
        match segments.split_first() {
            None => None,
            Some((PathSegment::Index(_), rest)) => self.element.resolve_segments(rest),
            Some((PathSegment::Field(_), _)) => None,
        }
    }

    pub(crate) fn rank_segments(&self, segments: &[PathSegment], ranks: &mut Vec<usize>) {
        match segments.split_first() {
            None => {}
            Some((PathSegment::Index(idx), rest)) => {
                ranks.push(*idx);
                self.element.rank_segments(rest, ranks);
            }
            Some((PathSegment::Field(_), _)) => {
                ranks.extend(std::iter::repeat(usize::MAX).take(segments.len()))
            }
        }
    }
}

impl SchemaLike for ArraySchema {
    type Output = Vec<Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Vec<Value>> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::Array)
    }
}

/// Indices of validated items equal to an earlier validated item.
///
/// Items compare by their normalized output, so `"a"` and `" a"` collide
/// under a trimming element schema. Items that failed are `None` and never
/// count as duplicates.
fn duplicate_indices(outputs: &[Option<Value>]) -> Vec<usize> {
    outputs
        .iter()
        .enumerate()
        .filter(|(i, item)| item.is_some() && outputs[..*i].contains(item))
        .map(|(i, _)| i)
        .collect()
}
