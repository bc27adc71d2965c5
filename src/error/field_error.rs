//! Value-level validation error types.
//!
//! This module provides [`FieldError`] for a single failure at one path and
//! [`FieldErrors`] for the non-empty set of failures produced by one
//! validation call.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::prelude::*;

use crate::path::FieldPath;

/// A single validation failure for one field.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldError, FieldPath};
///
/// let error = FieldError::new(FieldPath::from_field("email"), "invalid email address")
///     .with_code("email");
///
/// assert_eq!(error.code, "email");
/// assert_eq!(error.to_string(), "email: invalid email address");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The path the error is attributed to.
    pub path: FieldPath,
    /// Human-readable message shown next to the field.
    pub message: String,
    /// Machine-readable code (e.g. `min_length`, `required`).
    pub code: String,
}

impl FieldError {
    /// Creates a new error with the default `validation_error` code.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for FieldError {}

/// The failures produced by one validation call.
///
/// `FieldErrors` is never empty. Errors keep the order in which the evaluator
/// produced them (field declaration order, then refinements), and several
/// errors may share a path: a refinement failure aimed at a field that
/// already failed its own predicates is appended after the field error.
///
/// `FieldErrors` implements `Semigroup`, so `Validation` results can be
/// combined while accumulating every failure:
///
/// ```rust
/// use formcheck::{FieldError, FieldErrors, FieldPath};
/// use stillwater::prelude::*;
///
/// let name = FieldErrors::single(FieldError::new(FieldPath::from_field("name"), "is required"));
/// let email = FieldErrors::single(FieldError::new(FieldPath::from_field("email"), "is required"));
///
/// let combined = name.combine(email);
/// assert_eq!(combined.len(), 2);
/// assert_eq!(combined.path_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a vec, or `None` when the vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the total number of messages across all paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the number of distinct paths carrying errors.
    pub fn path_count(&self) -> usize {
        self.by_path().len()
    }

    /// Returns an iterator over every error in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first error produced.
    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Returns the distinct paths in first-seen order.
    pub fn paths(&self) -> Vec<&FieldPath> {
        self.by_path().into_keys().collect()
    }

    /// Returns all errors at the given path.
    pub fn get(&self, path: &FieldPath) -> Vec<&FieldError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns the messages at the given path, in order.
    pub fn messages_at(&self, path: &FieldPath) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| &e.path == path)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Returns true if at least one error is attributed to `path`.
    pub fn contains_path(&self, path: &FieldPath) -> bool {
        self.0.iter().any(|e| &e.path == path)
    }

    /// Returns all errors with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Groups errors by path, preserving first-seen path order and message
    /// order within each path.
    pub fn by_path(&self) -> IndexMap<&FieldPath, Vec<&FieldError>> {
        let mut grouped: IndexMap<&FieldPath, Vec<&FieldError>> = IndexMap::new();
        for error in self.0.iter() {
            grouped.entry(&error.path).or_default().push(error);
        }
        grouped
    }

    /// Returns the `path -> messages` map a form renderer consumes.
    pub fn to_message_map(&self) -> IndexMap<String, Vec<String>> {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        for error in self.0.iter() {
            map.entry(error.path.to_string())
                .or_default()
                .push(error.message.clone());
        }
        map
    }

    /// Renders the message map as a JSON object (`{"name": ["is required"]}`).
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .to_message_map()
            .into_iter()
            .map(|(path, messages)| {
                let messages = messages.into_iter().map(Value::String).collect();
                (path, Value::Array(messages))
            })
            .collect();
        Value::Object(map)
    }

    /// Appends an error after the existing ones.
    pub fn push(self, error: FieldError) -> Self {
        self.combine(Self::single(error))
    }

    /// Keeps only errors for which `keep` returns true.
    ///
    /// Returns `None` when nothing remains.
    pub fn retain(self, keep: impl Fn(&FieldError) -> bool) -> Option<Self> {
        let kept: Vec<FieldError> = self.0.into_vec().into_iter().filter(|e| keep(e)).collect();
        Self::from_vec(kept)
    }

    /// Converts this collection into a `Vec<FieldError>`.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error(path: &str, message: &str) -> FieldError {
        FieldError::new(FieldPath::parse(path), message)
    }

    #[test]
    fn test_field_error_defaults() {
        let e = error("name", "is required");
        assert_eq!(e.code, "validation_error");
        assert_eq!(e.to_string(), "name: is required");
    }

    #[test]
    fn test_field_error_display_root() {
        let e = FieldError::new(FieldPath::root(), "expected object");
        assert_eq!(e.to_string(), "(root): expected object");
    }

    #[test]
    fn test_from_vec_empty_is_none() {
        assert!(FieldErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_combine_appends_at_shared_path() {
        let errors = FieldErrors::single(error("confirmPassword", "is required"))
            .combine(FieldErrors::single(error("name", "too short")))
            .combine(FieldErrors::single(error("confirmPassword", "passwords do not match")));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.path_count(), 2);
        assert_eq!(
            errors.messages_at(&FieldPath::parse("confirmPassword")),
            vec!["is required", "passwords do not match"]
        );
    }

    #[test]
    fn test_paths_in_first_seen_order() {
        let errors = FieldErrors::from_vec(vec![
            error("b", "1"),
            error("a", "2"),
            error("b", "3"),
        ])
        .unwrap();
        let paths: Vec<String> = errors.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["b", "a"]);
    }

    #[test]
    fn test_with_code() {
        let errors = FieldErrors::from_vec(vec![
            error("a", "x").with_code("required"),
            error("b", "y").with_code("pattern"),
            error("c", "z").with_code("required"),
        ])
        .unwrap();
        assert_eq!(errors.with_code("required").len(), 2);
        assert!(errors.with_code("nothing").is_empty());
    }

    #[test]
    fn test_to_json() {
        let errors = FieldErrors::from_vec(vec![
            error("skills", "at least one skill is required"),
            error("skills.2", "cannot be empty"),
        ])
        .unwrap();
        assert_eq!(
            errors.to_json(),
            json!({
                "skills": ["at least one skill is required"],
                "skills.2": ["cannot be empty"]
            })
        );
    }

    #[test]
    fn test_retain() {
        let errors = FieldErrors::from_vec(vec![error("a", "x"), error("b", "y")]).unwrap();
        let kept = errors.clone().retain(|e| e.path.to_string() == "b").unwrap();
        assert_eq!(kept.len(), 1);
        assert!(errors.retain(|_| false).is_none());
    }

    #[test]
    fn test_display() {
        let errors = FieldErrors::single(error("name", "is required"))
            .combine(FieldErrors::single(error("email", "invalid email address")));
        let display = errors.to_string();
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name: is required"));
        assert!(display.contains("email: invalid email address"));
    }
}
