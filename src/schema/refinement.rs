//! Cross-field refinements.
//!
//! A [`Refinement`] is a whole-object predicate kept in a side table on its
//! [`ObjectSchema`](super::ObjectSchema). When the predicate fails, its message
//! is attributed to a target path that may differ from the fields the
//! predicate reads, e.g. a password-confirmation mismatch shown on
//! `confirmPassword`.
//!
//! Each refinement declares the fields it depends on. Partial validation
//! only runs a refinement when every declared dependency (and the target's
//! field) is part of the validated subset.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::path::FieldPath;

/// Type alias for the predicate stored in a refinement.
pub type RefinementFn = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

/// A cross-field rule attached to an object schema.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Refinement, Schema};
/// use serde_json::json;
///
/// let senior_rule = Refinement::new("senior roles require at least 5 years", |obj| {
///     let senior = obj.get("experience").and_then(|v| v.as_str()) == Some("senior");
///     let years = obj.get("yearsOfExperience").and_then(|v| v.as_f64()).unwrap_or(0.0);
///     !senior || years >= 5.0
/// })
/// .depends_on(["experience", "yearsOfExperience"])
/// .target("yearsOfExperience");
///
/// let schema = Schema::object()
///     .field("experience", Schema::enumeration(["junior", "senior"]).unwrap())
///     .field("yearsOfExperience", Schema::integer().non_negative())
///     .refine(senior_rule)
///     .unwrap();
///
/// let errors = schema
///     .validate(&json!({"experience": "senior", "yearsOfExperience": 2}), &FieldPath::root())
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "yearsOfExperience");
/// ```
#[derive(Clone)]
pub struct Refinement {
    pub(crate) predicate: RefinementFn,
    pub(crate) message: String,
    pub(crate) code: String,
    pub(crate) target: FieldPath,
    pub(crate) depends_on: Vec<String>,
}

impl Refinement {
    /// Creates a refinement whose failure is reported at the object's own
    /// path until [`target`](Self::target) redirects it.
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
            code: "refinement".to_string(),
            target: FieldPath::root(),
            depends_on: Vec::new(),
        }
    }

    /// Attributes failures to `path`, relative to the refined object.
    pub fn target(mut self, path: impl Into<FieldPath>) -> Self {
        self.target = path.into();
        self
    }

    /// Declares the top-level fields the predicate reads.
    ///
    /// A refinement with no declared dependencies is treated as depending on
    /// the whole object and only runs during full validation.
    pub fn depends_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the error code reported on failure.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Returns the path failures are attributed to.
    pub fn target_path(&self) -> &FieldPath {
        &self.target
    }

    /// Returns the declared dependencies.
    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    /// Runs the predicate against a raw object value.
    pub fn holds(&self, object: &Map<String, Value>) -> bool {
        (self.predicate)(object)
    }

    /// Whether partial validation of `included` fields may run this rule.
    pub(crate) fn runs_within(&self, included: &dyn Fn(&str) -> bool) -> bool {
        if self.depends_on.is_empty() {
            return false;
        }
        let target_included = self.target.first_field().map_or(true, included);
        target_included && self.depends_on.iter().all(|d| included(d))
    }

    /// A conditional-required rule: when `condition` holds for `field`,
    /// `target` must carry a non-blank value.
    pub fn required_if<F>(
        field: impl Into<String>,
        condition: F,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let field = field.into();
        let target = target.into();
        let (f, t) = (field.clone(), target.clone());
        Self::new(message, move |obj| {
            let triggered = obj.get(&f).is_some_and(|v| condition(v));
            !triggered || obj.get(&t).is_some_and(|v| !is_blank(v))
        })
        .depends_on([field, target.clone()])
        .target(FieldPath::from_field(target))
        .with_code("conditional_required")
    }

    /// A confirmation rule: `confirm` must equal `field`; failures are
    /// reported at `confirm`.
    pub fn fields_match(
        field: impl Into<String>,
        confirm: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let confirm = confirm.into();
        let (f, c) = (field.clone(), confirm.clone());
        Self::new(message, move |obj| obj.get(&f) == obj.get(&c))
            .depends_on([field, confirm.clone()])
            .target(FieldPath::from_field(confirm))
            .with_code("fields_mismatch")
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("message", &self.message)
            .field("code", &self.code)
            .field("target", &self.target.to_string())
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// Null, blank strings and empty arrays count as "not filled in".
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
