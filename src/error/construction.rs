//! Schema construction errors.

use thiserror::Error;

/// A defect in a schema detected while it is being built.
///
/// These are contract violations by the schema author, not user input
/// problems: a form cannot operate with a malformed schema, so the builder
/// call that introduces the defect returns this error instead of deferring it
/// to validation time.
#[derive(Debug, Error)]
pub enum SchemaConstructionError {
    /// An enum schema was declared without any variants.
    #[error("enum schema must declare at least one variant")]
    EmptyEnum,

    /// An enum schema lists the same literal twice.
    #[error("enum variant '{0}' is declared more than once")]
    DuplicateVariant(String),

    /// A string pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A lower bound exceeds its upper bound.
    #[error("invalid bounds: minimum {min} is greater than maximum {max}")]
    InvalidBounds { min: String, max: String },

    /// An array definition has no element schema.
    #[error("array schema at '{0}' is missing its element type")]
    MissingElement(String),

    /// A refinement target or wizard field does not exist in the schema.
    #[error("path '{0}' does not exist in the schema")]
    UnknownPath(String),

    /// A refinement declares a dependency that is not a field of its object.
    #[error("refinement dependency '{0}' is not a field of the object")]
    UnknownDependency(String),

    /// A date bound could not be parsed.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A wizard step lists no fields.
    #[error("wizard step '{0}' has no fields")]
    EmptyStep(String),
}
