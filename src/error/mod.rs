//! Error types for form validation.
//!
//! Value-level failures ([`FieldError`], collected into [`FieldErrors`]) are
//! data returned from validation. Defects in a schema itself are reported as
//! [`SchemaConstructionError`] by the builder call that introduced them.

mod construction;
mod field_error;

pub use construction::SchemaConstructionError;
pub use field_error::{FieldError, FieldErrors};
