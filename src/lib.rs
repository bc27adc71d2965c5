//! # Formcheck
//!
//! Schema-driven validation for the forms of an SMS-management dashboard
//! (devices, messages, webhooks, API keys, accounts, billing plans).
//!
//! Validation accumulates ALL failures of a submission instead of stopping at
//! the first one, so every invalid field can show its message at once. This
//! is achieved through stillwater's `Validation` type for applicative error
//! accumulation.
//!
//! ## Core Types
//!
//! - [`FieldPath`]: dotted paths to values (`address.zipCode`, `skills.2`)
//! - [`FieldError`] / [`FieldErrors`]: value-level failures, keyed by path
//! - [`Schema`] / [`FieldSchema`]: builders and the schema tree
//! - [`Refinement`]: cross-field rules with an explicit error target
//! - [`FieldArray`]: list fields with stable row identity
//! - [`summarize`]: errors in the order the form declares its fields
//! - [`Wizard`]: multi-step forms driven by partial validation
//! - [`FormRegistry`]: named, shareable form schemas
//!
//! ## Example
//!
//! ```rust
//! use formcheck::{FieldPath, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .field("name", Schema::string().min_len(2))
//!     .field("age", Schema::integer().range(18..=120));
//!
//! let errors = schema
//!     .validate(&json!({"name": "A", "age": 15}), &FieldPath::root())
//!     .into_result()
//!     .unwrap_err();
//!
//! assert_eq!(
//!     errors.to_json(),
//!     json!({
//!         "name": ["must be at least 2 characters"],
//!         "age": ["must be at least 18"]
//!     })
//! );
//! ```

pub mod error;
pub mod field_array;
pub mod path;
pub mod registry;
pub mod schema;
pub mod summary;
pub mod wizard;

pub use error::{FieldError, FieldErrors, SchemaConstructionError};
pub use field_array::{FieldArray, FieldArrayError, Row, RowId};
pub use path::{FieldPath, PathSegment};
pub use registry::{FormRegistry, RegistryError};
pub use schema::{
    ArraySchema, BooleanSchema, DateSchema, DefinitionError, EnumSchema, FieldSchema,
    NumberSchema, ObjectSchema, Refinement, Schema, SchemaDef, SchemaKind, SchemaLike,
    StringSchema,
};
pub use summary::{first_messages, inline, summarize, DeclarationOrder, SummaryEntry};
pub use wizard::{Wizard, WizardError, WizardState, WizardStep};

/// Type alias for validation results using FieldErrors
pub type ValidationResult<T = serde_json::Value> = stillwater::Validation<T, FieldErrors>;
