//! Object schema validation.
//!
//! This module provides [`ObjectSchema`]: ordered fields, optional fields
//! with defaults, additional property handling, cross-field refinements and
//! partial (subset-of-fields) validation for multi-step forms.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{FieldError, FieldErrors, SchemaConstructionError};
use crate::path::{FieldPath, PathSegment};
use crate::ValidationResult;

use super::refinement::Refinement;
use super::traits::SchemaLike;
use super::{type_error, FieldSchema};

/// Definition of a field within an object schema.
#[derive(Debug, Clone)]
struct FieldDef {
    schema: FieldSchema,
    required: bool,
    default: Option<Value>,
}

/// A schema for validating form objects.
///
/// Every declared field is evaluated, so errors for all sibling fields are
/// collected in one pass. Refinements run afterwards, in declaration order,
/// on the raw object.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min_len(2))
///     .field("age", Schema::integer().range(18..=120));
///
/// let errors = schema
///     .validate(&json!({"name": "A", "age": 15}), &FieldPath::root())
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.messages_at(&"name".into()), vec!["must be at least 2 characters"]);
/// assert_eq!(errors.messages_at(&"age".into()), vec!["must be at least 18"]);
/// ```
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    refinements: Vec<Refinement>,
    allow_additional: bool,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            refinements: Vec::new(),
            allow_additional: true,
            type_error_message: None,
        }
    }

    /// Adds a required field.
    ///
    /// An absent or `null` value produces a single `required` error.
    ///
    /// Errors for an all-digit name such as `"1"` sit at a field segment, so
    /// look them up with `FieldPath::from_field` rather than by parsing
    /// `"1"`, which yields a list index.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: schema.into(),
                required: true,
                default: None,
            },
        );
        self
    }

    /// Adds an optional field. Absent or `null` values are skipped.
    pub fn optional(mut self, name: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: schema.into(),
                required: false,
                default: None,
            },
        );
        self
    }

    /// Adds an optional field whose value falls back to `default`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .default("status", Schema::enumeration(["active", "inactive"]).unwrap(), json!("active"));
    ///
    /// let value = schema.validate(&json!({}), &FieldPath::root()).into_result().unwrap();
    /// assert_eq!(value.get("status"), Some(&json!("active")));
    /// ```
    pub fn default(
        mut self,
        name: impl Into<String>,
        schema: impl Into<FieldSchema>,
        default: Value,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: schema.into(),
                required: false,
                default: Some(default),
            },
        );
        self
    }

    /// Controls whether undeclared properties are allowed (default) or
    /// reported as `additional_property` errors.
    pub fn additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional = allow;
        self
    }

    /// Sets a custom error message for non-object values.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Attaches a cross-field refinement.
    ///
    /// The target path must exist in this schema (the root path targets the
    /// object itself) and every dependency must be a declared field, so
    /// fields have to be declared before the refinements that use them.
    pub fn refine(mut self, refinement: Refinement) -> Result<Self, SchemaConstructionError> {
        if !refinement.target.is_root() && self.resolve(&refinement.target).is_none() {
            return Err(SchemaConstructionError::UnknownPath(
                refinement.target.to_string(),
            ));
        }
        if let Some(missing) = refinement
            .depends_on
            .iter()
            .find(|d| !self.fields.contains_key(d.as_str()))
        {
            return Err(SchemaConstructionError::UnknownDependency(missing.clone()));
        }
        self.refinements.push(refinement);
        Ok(self)
    }

    /// Requires `target` whenever `condition` holds for `field`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let webhook = Schema::object()
    ///     .field("auth", Schema::enumeration(["none", "bearer"]).unwrap())
    ///     .optional("token", Schema::string())
    ///     .require_if("auth", |v| v == "bearer", "token", "token is required for bearer auth")
    ///     .unwrap();
    ///
    /// let errors = webhook
    ///     .validate(&json!({"auth": "bearer"}), &FieldPath::root())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().code, "conditional_required");
    /// assert_eq!(errors.first().path.to_string(), "token");
    /// ```
    pub fn require_if<F>(
        self,
        field: impl Into<String>,
        condition: F,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, SchemaConstructionError>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.refine(Refinement::required_if(field, condition, target, message))
    }

    /// Requires `confirm` to equal `field`, reporting mismatches at `confirm`.
    pub fn fields_match(
        self,
        field: impl Into<String>,
        confirm: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, SchemaConstructionError> {
        self.refine(Refinement::fields_match(field, confirm, message))
    }

    /// Returns the declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns true if `name` is a declared field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the schema of a declared field.
    pub fn field_schema(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name).map(|def| &def.schema)
    }

    /// Returns the attached refinements in declaration order.
    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    /// Finds the schema node at a non-root path relative to this object.
    pub fn resolve(&self, path: &FieldPath) -> Option<&FieldSchema> {
        let segments: Vec<PathSegment> = path.segments().cloned().collect();
        self.resolve_segments(&segments)
    }

    pub(crate) fn resolve_segments(&self, segments: &[PathSegment]) -> Option<&FieldSchema> {
        match segments.split_first()? {
            (PathSegment::Field(name), rest) => self.fields.get(name)?.schema.resolve_segments(rest),
            (PathSegment::Index(_), _) => None,
        }
    }

    /// Declaration-order ranks for a path relative to this object.
    pub(crate) fn rank_segments(&self, segments: &[PathSegment], ranks: &mut Vec<usize>) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        match first {
            PathSegment::Field(name) => match self.fields.get_full(name) {
                Some((idx, _, def)) => {
                    ranks.push(idx);
                    def.schema.rank_segments(rest, ranks);
                }
                None => ranks.extend(std::iter::repeat(usize::MAX).take(segments.len())),
            },
            PathSegment::Index(_) => ranks.extend(std::iter::repeat(usize::MAX).take(segments.len())),
        }
    }

    /// Validates a value against this schema.
    ///
    /// Returns the validated object (defaults filled in, values normalized by
    /// their field schemas) or every field and refinement failure.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Map<String, Value>> {
        self.evaluate(value, path, None)
    }

    /// Validates only the named top-level fields.
    ///
    /// Excluded fields are never evaluated and never reported, even when
    /// invalid. A refinement runs only when all its declared dependencies are
    /// included. The success value holds only the included fields.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{FieldPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .field("email", Schema::string().email())
    ///     .field("plan", Schema::enumeration(["free", "pro"]).unwrap());
    ///
    /// let step_one = schema.validate_subset(
    ///     &json!({"email": "ops@example.com", "plan": "enterprise"}),
    ///     &FieldPath::root(),
    ///     ["email"],
    /// );
    /// assert!(step_one.is_success());
    /// ```
    pub fn validate_subset<I, S>(
        &self,
        value: &Value,
        path: &FieldPath,
        fields: I,
    ) -> ValidationResult<Map<String, Value>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let included: HashSet<String> = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();
        self.evaluate(value, path, Some(&included))
    }

    fn evaluate(
        &self,
        value: &Value,
        path: &FieldPath,
        subset: Option<&HashSet<String>>,
    ) -> ValidationResult<Map<String, Value>> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => return type_error(path, &self.type_error_message, "object", value),
        };
        let included = |name: &str| subset.map_or(true, |s| s.contains(name));

        let mut errors = Vec::new();
        let mut validated = Map::new();

        for (name, field_def) in &self.fields {
            if !included(name.as_str()) {
                trace!(path = %path, field = %name, "field excluded from partial validation");
                continue;
            }
            let field_path = path.push_field(name);

            match obj.get(name).filter(|v| !v.is_null()) {
                Some(field_value) => match field_def.schema.validate(field_value, &field_path) {
                    Validation::Success(v) => {
                        validated.insert(name.clone(), v);
                    }
                    Validation::Failure(e) => errors.extend(e),
                },
                None if field_def.required => {
                    errors.push(FieldError::new(field_path, "is required").with_code("required"));
                }
                None => {
                    if let Some(default) = &field_def.default {
                        validated.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        for (key, extra) in obj {
            if self.fields.contains_key(key) || !included(key.as_str()) {
                continue;
            }
            if self.allow_additional {
                validated.insert(key.clone(), extra.clone());
            } else {
                errors.push(
                    FieldError::new(path.push_field(key), format!("unknown field '{}'", key))
                        .with_code("additional_property"),
                );
            }
        }

        for refinement in &self.refinements {
            if subset.is_some() && !refinement.runs_within(&included) {
                trace!(path = %path, target = %refinement.target, "refinement skipped in partial validation");
                continue;
            }
            if !refinement.holds(obj) {
                trace!(path = %path, target = %refinement.target, "refinement failed");
                errors.push(
                    FieldError::new(path.join(&refinement.target), refinement.message.clone())
                        .with_code(refinement.code.clone()),
                );
            }
        }

        match FieldErrors::from_vec(errors) {
            None => Validation::Success(validated),
            Some(errors) => {
                debug!(
                    path = %path,
                    errors = errors.len(),
                    partial = subset.is_some(),
                    "object validation failed"
                );
                Validation::Failure(errors)
            }
        }
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    type Output = Map<String, Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<Self::Output> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path).map(Value::Object)
    }
}
