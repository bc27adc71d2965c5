//! Declarative schema documents.
//!
//! [`SchemaDef`] is a serde data literal of the schema tree, so a form can be
//! described in a JSON file and compiled into a [`FieldSchema`]:
//!
//! ```json
//! {
//!   "type": "object",
//!   "fields": {
//!     "name": { "type": "string", "trim": true, "min_length": 2 },
//!     "role": { "type": "enum", "values": ["admin", "user"] },
//!     "skills": {
//!       "type": "array",
//!       "items": { "type": "string", "non_empty": true },
//!       "min_items": { "value": 1, "message": "add at least one skill" }
//!     }
//!   }
//! }
//! ```
//!
//! Constraints accept either a bare value or `{ "value": ..., "message": ... }`.
//! String predicates run in the order `non_empty`, `length`, `min_length`,
//! `max_length`, `pattern`, `email`, `phone`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::SchemaConstructionError;
use crate::path::FieldPath;

use super::{
    parse_bound, ArraySchema, BooleanSchema, DateSchema, EnumSchema, FieldSchema, NumberSchema,
    ObjectSchema, Refinement, StringSchema,
};

/// Errors produced while loading a schema document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document is not valid JSON or does not match the document shape.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but describes an inconsistent schema.
    #[error(transparent)]
    Construction(#[from] SchemaConstructionError),
}

/// A constraint value with an optional custom message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint<T> {
    WithMessage { value: T, message: String },
    Bare(T),
}

impl<T> Constraint<T> {
    fn value(&self) -> &T {
        match self {
            Constraint::WithMessage { value, .. } | Constraint::Bare(value) => value,
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            Constraint::WithMessage { message, .. } => Some(message),
            Constraint::Bare(_) => None,
        }
    }
}

/// One node of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaDef {
    String(StringDef),
    Number(NumberDef),
    Boolean(BooleanDef),
    Date(DateDef),
    Enum(EnumDef),
    Object(ObjectDef),
    Array(ArrayDef),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringDef {
    pub trim: bool,
    pub non_empty: Option<Constraint<bool>>,
    pub length: Option<Constraint<usize>>,
    pub min_length: Option<Constraint<usize>>,
    pub max_length: Option<Constraint<usize>>,
    pub pattern: Option<Constraint<String>>,
    pub email: Option<Constraint<bool>>,
    pub phone: Option<Constraint<bool>>,
    /// Message for non-string values.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberDef {
    pub integer: Option<Constraint<bool>>,
    pub coerce: bool,
    pub min: Option<Constraint<f64>>,
    pub max: Option<Constraint<f64>>,
    pub positive: Option<Constraint<bool>>,
    pub non_negative: Option<Constraint<bool>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanDef {
    pub accepted: Option<Constraint<bool>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateDef {
    pub min: Option<Constraint<String>>,
    pub max: Option<Constraint<String>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDef {
    pub values: Vec<String>,
    /// Message for values outside the set.
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    #[serde(default = "default_true")]
    pub additional_properties: bool,
    #[serde(default)]
    pub refinements: Vec<RefinementDef>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A field entry of an object document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(flatten)]
    pub schema: SchemaDef,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayDef {
    pub items: Option<Box<SchemaDef>>,
    pub min_items: Option<Constraint<usize>>,
    pub max_items: Option<Constraint<usize>>,
    pub unique: Option<Constraint<bool>>,
    pub message: Option<String>,
}

/// Cross-field rules expressible in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RefinementDef {
    /// `confirm` must equal `field`.
    FieldsMatch {
        field: String,
        confirm: String,
        message: String,
    },
    /// `target` is required whenever `field` equals `equals`.
    RequireIf {
        field: String,
        equals: Value,
        target: String,
        message: String,
    },
}

fn default_true() -> bool {
    true
}

impl SchemaDef {
    /// Parses a schema document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a schema document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Compiles this document into a schema tree.
    pub fn compile(&self) -> Result<FieldSchema, SchemaConstructionError> {
        compile_node(self, &FieldPath::root())
    }
}

impl TryFrom<SchemaDef> for FieldSchema {
    type Error = SchemaConstructionError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        def.compile()
    }
}

impl TryFrom<&SchemaDef> for FieldSchema {
    type Error = SchemaConstructionError;

    fn try_from(def: &SchemaDef) -> Result<Self, Self::Error> {
        def.compile()
    }
}

impl FieldSchema {
    /// Parses and compiles a schema document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, FieldSchema};
    /// use serde_json::json;
    ///
    /// let schema = FieldSchema::from_json_str(r#"{
    ///     "type": "object",
    ///     "fields": {
    ///         "password": { "type": "string", "min_length": 8 },
    ///         "confirmPassword": { "type": "string" }
    ///     },
    ///     "refinements": [
    ///         { "rule": "fields_match", "field": "password",
    ///           "confirm": "confirmPassword", "message": "passwords do not match" }
    ///     ]
    /// }"#).unwrap();
    ///
    /// let errors = schema
    ///     .validate(&json!({"password": "longenough", "confirmPassword": "other"}), &FieldPath::root())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().path.to_string(), "confirmPassword");
    /// ```
    pub fn from_json_str(json: &str) -> Result<FieldSchema, DefinitionError> {
        let def = SchemaDef::from_json_str(json)?;
        Ok(def.compile()?)
    }
}

fn compile_node(def: &SchemaDef, path: &FieldPath) -> Result<FieldSchema, SchemaConstructionError> {
    let schema = match def {
        SchemaDef::String(d) => compile_string(d)?.into(),
        SchemaDef::Number(d) => compile_number(d)?.into(),
        SchemaDef::Boolean(d) => compile_boolean(d).into(),
        SchemaDef::Date(d) => compile_date(d)?.into(),
        SchemaDef::Enum(d) => compile_enum(d)?.into(),
        SchemaDef::Object(d) => compile_object(d, path)?.into(),
        SchemaDef::Array(d) => compile_array(d, path)?.into(),
    };
    Ok(schema)
}

/// Applies a constraint message through the builder's `error`, which targets
/// the most recently added predicate.
fn with_message<S, T>(schema: S, constraint: &Constraint<T>, error: fn(S, String) -> S) -> S {
    match constraint.message() {
        Some(message) => error(schema, message.to_string()),
        None => schema,
    }
}

fn check_bounds<T: PartialOrd + ToString>(
    min: Option<&Constraint<T>>,
    max: Option<&Constraint<T>>,
) -> Result<(), SchemaConstructionError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min.value() > max.value() {
            return Err(SchemaConstructionError::InvalidBounds {
                min: min.value().to_string(),
                max: max.value().to_string(),
            });
        }
    }
    Ok(())
}

fn compile_string(def: &StringDef) -> Result<StringSchema, SchemaConstructionError> {
    check_bounds(def.min_length.as_ref(), def.max_length.as_ref())?;

    let error = |s: StringSchema, m: String| s.error(m);
    let mut schema = StringSchema::new();
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }
    if def.trim {
        schema = schema.trim();
    }
    if let Some(c) = def.non_empty.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.non_empty(), c, error);
    }
    if let Some(c) = &def.length {
        schema = with_message(schema.length(*c.value()), c, error);
    }
    if let Some(c) = &def.min_length {
        schema = with_message(schema.min_len(*c.value()), c, error);
    }
    if let Some(c) = &def.max_length {
        schema = with_message(schema.max_len(*c.value()), c, error);
    }
    if let Some(c) = &def.pattern {
        schema = with_message(schema.pattern(c.value())?, c, error);
    }
    if let Some(c) = def.email.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.email(), c, error);
    }
    if let Some(c) = def.phone.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.phone(), c, error);
    }
    Ok(schema)
}

fn compile_number(def: &NumberDef) -> Result<NumberSchema, SchemaConstructionError> {
    check_bounds(def.min.as_ref(), def.max.as_ref())?;

    let error = |s: NumberSchema, m: String| s.error(m);
    let mut schema = NumberSchema::new();
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }
    if def.coerce {
        schema = schema.coerce();
    }
    if let Some(c) = def.integer.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.int(), c, error);
    }
    if let Some(c) = &def.min {
        schema = with_message(schema.min(*c.value()), c, error);
    }
    if let Some(c) = &def.max {
        schema = with_message(schema.max(*c.value()), c, error);
    }
    if let Some(c) = def.positive.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.positive(), c, error);
    }
    if let Some(c) = def.non_negative.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.non_negative(), c, error);
    }
    Ok(schema)
}

fn compile_boolean(def: &BooleanDef) -> BooleanSchema {
    let mut schema = BooleanSchema::new();
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }
    if let Some(c) = def.accepted.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.accepted(), c, |s, m| s.error(m));
    }
    schema
}

fn compile_date(def: &DateDef) -> Result<DateSchema, SchemaConstructionError> {
    let min = def.min.as_ref().map(|c| parse_bound(c.value())).transpose()?;
    let max = def.max.as_ref().map(|c| parse_bound(c.value())).transpose()?;
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(SchemaConstructionError::InvalidBounds {
                min: lo.to_string(),
                max: hi.to_string(),
            });
        }
    }

    let error = |s: DateSchema, m: String| s.error(m);
    let mut schema = DateSchema::new();
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }
    if let (Some(c), Some(date)) = (&def.min, min) {
        schema = with_message(schema.min(date), c, error);
    }
    if let (Some(c), Some(date)) = (&def.max, max) {
        schema = with_message(schema.max(date), c, error);
    }
    Ok(schema)
}

fn compile_enum(def: &EnumDef) -> Result<EnumSchema, SchemaConstructionError> {
    let schema = EnumSchema::new(def.values.iter().cloned())?;
    Ok(match &def.message {
        Some(message) => schema.error(message.clone()),
        None => schema,
    })
}

fn compile_object(def: &ObjectDef, path: &FieldPath) -> Result<ObjectSchema, SchemaConstructionError> {
    let mut schema = ObjectSchema::new().additional_properties(def.additional_properties);
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }

    for (name, field) in &def.fields {
        let field_schema = compile_node(&field.schema, &path.push_field(name))?;
        schema = match (&field.default, field.required) {
            (Some(default), _) => schema.default(name, field_schema, default.clone()),
            (None, true) => schema.field(name, field_schema),
            (None, false) => schema.optional(name, field_schema),
        };
    }

    for rule in &def.refinements {
        let refinement = match rule {
            RefinementDef::FieldsMatch {
                field,
                confirm,
                message,
            } => Refinement::fields_match(field, confirm, message),
            RefinementDef::RequireIf {
                field,
                equals,
                target,
                message,
            } => {
                let expected = equals.clone();
                Refinement::required_if(field, move |v| *v == expected, target, message)
            }
        };
        schema = schema.refine(refinement)?;
    }

    debug!(path = %path, fields = def.fields.len(), "compiled object schema document");
    Ok(schema)
}

fn compile_array(def: &ArrayDef, path: &FieldPath) -> Result<ArraySchema, SchemaConstructionError> {
    let items = def
        .items
        .as_ref()
        .ok_or_else(|| SchemaConstructionError::MissingElement(path.to_string()))?;
    check_bounds(def.min_items.as_ref(), def.max_items.as_ref())?;

    let error = |s: ArraySchema, m: String| s.error(m);
    let mut schema = ArraySchema::new(compile_node(items, &path.push_index(0))?);
    if let Some(message) = &def.message {
        schema = schema.error(message.clone());
    }
    if let Some(c) = &def.min_items {
        schema = with_message(schema.min_len(*c.value()), c, error);
    }
    if let Some(c) = &def.max_items {
        schema = with_message(schema.max_len(*c.value()), c, error);
    }
    if let Some(c) = def.unique.as_ref().filter(|c| *c.value()) {
        schema = with_message(schema.unique(), c, error);
    }
    Ok(schema)
}
