//! Traits for schema polymorphism.
//!
//! This module provides the [`SchemaLike`] trait shared by every schema kind,
//! so each kind can report its typed output while the tree evaluator works
//! uniformly with `serde_json::Value`.

use serde_json::Value;

use crate::path::FieldPath;
use crate::ValidationResult;

/// A trait for schema types that can validate form values.
///
/// The `Send + Sync` bounds let schemas be shared through the
/// [`FormRegistry`](crate::FormRegistry).
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// fn check<S: SchemaLike>(schema: &S) -> bool {
///     schema.validate_to_value(&json!("hi"), &FieldPath::root()).is_success()
/// }
///
/// assert!(check(&Schema::string().min_len(1)));
/// assert!(!check(&Schema::integer()));
/// ```
pub trait SchemaLike: Send + Sync {
    /// The output type produced by successful validation.
    type Output;

    /// Validates a value against this schema.
    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Self::Output>;

    /// Validates a value and returns the result as a `serde_json::Value`.
    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult;
}
