//! Schema definitions for form validation.
//!
//! A form schema is a tree of [`FieldSchema`] nodes. Each node is one kind of
//! value (string, number, boolean, date, enum, object, array) carrying its
//! predicates in declaration order. Schemas are built once, never mutated by
//! validation, and can be shared freely between threads.
//!
//! # Example
//!
//! ```rust
//! use formcheck::{FieldPath, Schema};
//! use serde_json::json;
//!
//! let device = Schema::object()
//!     .field("name", Schema::string().trim().min_len(2).max_len(64))
//!     .field("phoneNumber", Schema::string().phone())
//!     .field("dailyLimit", Schema::integer().coerce().range(1..=10_000))
//!     .optional("simSlot", Schema::enumeration(["1", "2"]).unwrap());
//!
//! let result = device.validate(
//!     &json!({"name": " Office gateway ", "phoneNumber": "+14155550123", "dailyLimit": "500"}),
//!     &FieldPath::root(),
//! );
//! assert!(result.is_success());
//! ```

mod array;
mod boolean;
mod date;
mod definition;
mod enumeration;
mod numeric;
mod object;
mod refinement;
mod string;
mod traits;

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors, SchemaConstructionError};
use crate::path::{FieldPath, PathSegment};
use crate::ValidationResult;

pub use array::ArraySchema;
pub use boolean::BooleanSchema;
pub use date::DateSchema;
pub use definition::{
    ArrayDef, BooleanDef, Constraint, DateDef, DefinitionError, EnumDef, FieldDef, NumberDef,
    ObjectDef, RefinementDef, SchemaDef, StringDef,
};
pub use enumeration::EnumSchema;
pub use numeric::NumberSchema;
pub use object::ObjectSchema;
pub use refinement::{Refinement, RefinementFn};
pub use string::StringSchema;
pub use traits::SchemaLike;

pub(crate) use date::parse_bound;

/// Entry point for creating validation schemas.
pub struct Schema;

impl Schema {
    /// Creates a new string schema.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates a new number schema.
    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// Creates a number schema that only accepts whole numbers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::integer().min(0);
    /// assert!(schema.validate(&json!(3), &FieldPath::root()).is_success());
    /// assert!(schema.validate(&json!(1.5), &FieldPath::root()).is_failure());
    /// ```
    pub fn integer() -> NumberSchema {
        NumberSchema::new().int()
    }

    /// Creates a new boolean schema.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// Creates a new date schema.
    pub fn date() -> DateSchema {
        DateSchema::new()
    }

    /// Creates an enum-of-literals schema.
    ///
    /// Fails when `variants` is empty or contains duplicates.
    pub fn enumeration<I, S>(variants: I) -> Result<EnumSchema, SchemaConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumSchema::new(variants)
    }

    /// Creates a new object schema.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates an array schema for the given element schema.
    pub fn array(element: impl Into<FieldSchema>) -> ArraySchema {
        ArraySchema::new(element)
    }
}

/// The kind discriminator of a [`FieldSchema`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    Object,
    Array,
}

impl Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Date => "date",
            SchemaKind::Enum => "enum",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// One node of a schema tree.
#[derive(Debug, Clone)]
pub enum FieldSchema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Enum(EnumSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
}

impl FieldSchema {
    /// Returns the kind discriminator.
    pub fn kind(&self) -> SchemaKind {
        match self {
            FieldSchema::String(_) => SchemaKind::String,
            FieldSchema::Number(_) => SchemaKind::Number,
            FieldSchema::Boolean(_) => SchemaKind::Boolean,
            FieldSchema::Date(_) => SchemaKind::Date,
            FieldSchema::Enum(_) => SchemaKind::Enum,
            FieldSchema::Object(_) => SchemaKind::Object,
            FieldSchema::Array(_) => SchemaKind::Array,
        }
    }

    /// Returns the object schema if this node is an object.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            FieldSchema::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the array schema if this node is an array.
    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            FieldSchema::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Validates a value against this node.
    ///
    /// Pure: the same schema and value always produce the same result.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        match self {
            FieldSchema::String(s) => s.validate_to_value(value, path),
            FieldSchema::Number(s) => s.validate_to_value(value, path),
            FieldSchema::Boolean(s) => s.validate_to_value(value, path),
            FieldSchema::Date(s) => s.validate_to_value(value, path),
            FieldSchema::Enum(s) => s.validate_to_value(value, path),
            FieldSchema::Object(s) => s.validate_to_value(value, path),
            FieldSchema::Array(s) => s.validate_to_value(value, path),
        }
    }

    /// Finds the node at `path`. The root path resolves to `self`; index
    /// segments pass through arrays to their element schema.
    pub fn resolve(&self, path: &FieldPath) -> Option<&FieldSchema> {
        let segments: Vec<PathSegment> = path.segments().cloned().collect();
        self.resolve_segments(&segments)
    }

    pub(crate) fn resolve_segments(&self, segments: &[PathSegment]) -> Option<&FieldSchema> {
        if segments.is_empty() {
            return Some(self);
        }
        match self {
            FieldSchema::Object(obj) => obj.resolve_segments(segments),
            FieldSchema::Array(arr) => arr.resolve_segments(segments),
            _ => None,
        }
    }

    /// Ordering key for `path` in schema declaration order.
    ///
    /// Field segments rank by declaration position, index segments by index.
    /// Segments the schema does not know rank last. A path ranks before the
    /// paths nested below it, so an array's own errors come before its
    /// elements' errors.
    pub fn declaration_rank(&self, path: &FieldPath) -> Vec<usize> {
        let segments: Vec<PathSegment> = path.segments().cloned().collect();
        let mut ranks = Vec::with_capacity(segments.len());
        self.rank_segments(&segments, &mut ranks);
        ranks
    }

    pub(crate) fn rank_segments(&self, segments: &[PathSegment], ranks: &mut Vec<usize>) {
        if segments.is_empty() {
            return;
        }
        match self {
            FieldSchema::Object(obj) => obj.rank_segments(segments, ranks),
            FieldSchema::Array(arr) => arr.rank_segments(segments, ranks),
            _ => ranks.extend(std::iter::repeat(usize::MAX).take(segments.len())),
        }
    }
}

impl SchemaLike for FieldSchema {
    type Output = Value;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path)
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldSchema {
                fn from(schema: $ty) -> Self {
                    FieldSchema::$variant(schema)
                }
            }
        )*
    };
}

impl_from_kind! {
    String => StringSchema,
    Number => NumberSchema,
    Boolean => BooleanSchema,
    Date => DateSchema,
    Enum => EnumSchema,
    Object => ObjectSchema,
    Array => ArraySchema,
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn fail<T>(error: FieldError) -> ValidationResult<T> {
    Validation::Failure(FieldErrors::single(error))
}

/// A type-conformance failure; remaining predicates for the field are skipped.
pub(crate) fn type_error<T>(
    path: &FieldPath,
    custom: &Option<String>,
    expected: &str,
    value: &Value,
) -> ValidationResult<T> {
    let message = custom
        .clone()
        .unwrap_or_else(|| format!("expected {}, received {}", expected, value_type_name(value)));
    fail(FieldError::new(path.clone(), message).with_code("invalid_type"))
}
