//! Error presentation.
//!
//! Turns the [`FieldErrors`] of a validation run into what a form shows: an
//! ordered summary list (top of the form) and per-field inline messages.
//!
//! The summary follows the schema's declaration order rather than the order
//! errors were produced in, so a refinement error aimed at an early field is
//! listed with that field.

use std::fmt::{self, Display};

use indexmap::IndexMap;

use crate::error::FieldErrors;
use crate::path::{FieldPath, PathSegment};
use crate::schema::{FieldSchema, ObjectSchema};

/// Schemas that can rank paths by declaration order.
pub trait DeclarationOrder {
    /// Ordering key for `path`; see [`FieldSchema::declaration_rank`].
    fn declaration_rank(&self, path: &FieldPath) -> Vec<usize>;
}

impl DeclarationOrder for FieldSchema {
    fn declaration_rank(&self, path: &FieldPath) -> Vec<usize> {
        FieldSchema::declaration_rank(self, path)
    }
}

impl DeclarationOrder for ObjectSchema {
    fn declaration_rank(&self, path: &FieldPath) -> Vec<usize> {
        let segments: Vec<PathSegment> = path.segments().cloned().collect();
        let mut ranks = Vec::with_capacity(segments.len());
        self.rank_segments(&segments, &mut ranks);
        ranks
    }
}

/// One line of the error summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub path: FieldPath,
    pub message: String,
    pub code: String,
}

impl Display for SummaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Lists every error in schema declaration order.
///
/// An array's own errors come before its elements' errors, elements are
/// ordered by index, and paths the schema does not declare come last.
/// Messages at the same path keep their production order.
///
/// # Example
///
/// ```rust
/// use formcheck::{summarize, FieldPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min_len(2))
///     .field("password", Schema::string())
///     .field("confirmPassword", Schema::string())
///     .fields_match("password", "confirmPassword", "passwords do not match")
///     .unwrap();
///
/// let errors = schema
///     .validate(&json!({"name": "A", "password": "a", "confirmPassword": "b"}), &FieldPath::root())
///     .into_result()
///     .unwrap_err();
///
/// let lines: Vec<String> = summarize(&schema, &errors).iter().map(ToString::to_string).collect();
/// assert_eq!(
///     lines,
///     vec!["name: must be at least 2 characters", "confirmPassword: passwords do not match"]
/// );
/// ```
pub fn summarize<S: DeclarationOrder + ?Sized>(schema: &S, errors: &FieldErrors) -> Vec<SummaryEntry> {
    let mut ranked: Vec<(Vec<usize>, SummaryEntry)> = errors
        .iter()
        .map(|e| {
            (
                schema.declaration_rank(&e.path),
                SummaryEntry {
                    path: e.path.clone(),
                    message: e.message.clone(),
                    code: e.code.clone(),
                },
            )
        })
        .collect();
    // stable: same-path messages keep production order
    ranked.sort_by(|(a, _), (b, _)| a.cmp(b));
    ranked.into_iter().map(|(_, entry)| entry).collect()
}

/// Groups messages by path for inline display under each field.
///
/// The array path (`skills`) and element paths (`skills.0`) are separate keys.
pub fn inline(errors: &FieldErrors) -> IndexMap<FieldPath, Vec<String>> {
    let mut map: IndexMap<FieldPath, Vec<String>> = IndexMap::new();
    for error in errors.iter() {
        map.entry(error.path.clone())
            .or_default()
            .push(error.message.clone());
    }
    map
}

/// The first message per path, for inputs that show a single line of help text.
pub fn first_messages(errors: &FieldErrors) -> IndexMap<FieldPath, String> {
    let mut map: IndexMap<FieldPath, String> = IndexMap::new();
    for error in errors.iter() {
        map.entry(error.path.clone())
            .or_insert_with(|| error.message.clone());
    }
    map
}
