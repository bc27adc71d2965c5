//! Multi-step forms.
//!
//! A [`Wizard`] splits one object schema into named steps, each owning a set
//! of top-level fields. Each step is checked with partial validation, so the
//! fields of later steps (still empty while the user is on step one) never
//! block progress. Refinements run as soon as every field they depend on
//! belongs to a validated step.
//!
//! # Example
//!
//! ```rust
//! use formcheck::{Schema, Wizard};
//! use serde_json::json;
//!
//! let signup = Wizard::new(
//!     Schema::object()
//!         .field("email", Schema::string().email())
//!         .field("password", Schema::string().min_len(8))
//!         .field("plan", Schema::enumeration(["free", "pro"]).unwrap()),
//! )
//! .step("account", ["email", "password"])
//! .unwrap()
//! .step("billing", ["plan"])
//! .unwrap();
//!
//! let draft = json!({"email": "ops@example.com", "password": "correct horse"});
//!
//! let mut state = signup.start();
//! assert!(state.advance(&draft).is_success());
//! assert_eq!(state.current_step().map(|s| s.name()), Some("billing"));
//! assert!(state.advance(&draft).is_failure());
//! ```

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::error::{FieldErrors, SchemaConstructionError};
use crate::path::FieldPath;
use crate::schema::ObjectSchema;
use crate::ValidationResult;

/// Errors from addressing a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("step {index} does not exist; the wizard has {steps} steps")]
    UnknownStep { index: usize, steps: usize },

    #[error("step {index} has not been reached yet (current step is {current})")]
    StepNotReached { index: usize, current: usize },
}

/// A named group of top-level fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    name: String,
    fields: Vec<String>,
}

impl WizardStep {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns true if `field` belongs to this step.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// An object schema split into ordered steps.
#[derive(Debug, Clone)]
pub struct Wizard {
    schema: ObjectSchema,
    steps: Vec<WizardStep>,
}

impl Wizard {
    pub fn new(schema: ObjectSchema) -> Self {
        Self {
            schema,
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    ///
    /// Fails with `EmptyStep` when `fields` is empty and with `UnknownPath`
    /// when a field is not declared by the schema.
    pub fn step<I, S>(mut self, name: impl Into<String>, fields: I) -> Result<Self, SchemaConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(SchemaConstructionError::EmptyStep(name));
        }
        if let Some(unknown) = fields.iter().find(|f| !self.schema.has_field(f.as_str())) {
            return Err(SchemaConstructionError::UnknownPath(unknown.clone()));
        }
        self.steps.push(WizardStep { name, fields });
        Ok(self)
    }

    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    fn get_step(&self, index: usize) -> Result<&WizardStep, WizardError> {
        self.steps.get(index).ok_or(WizardError::UnknownStep {
            index,
            steps: self.steps.len(),
        })
    }

    /// Validates only the fields of step `index`.
    pub fn validate_step(
        &self,
        index: usize,
        value: &Value,
    ) -> Result<ValidationResult<Map<String, Value>>, WizardError> {
        let step = self.get_step(index)?;
        Ok(self
            .schema
            .validate_subset(value, &FieldPath::root(), step.fields.iter()))
    }

    /// Validates the fields of every step up to and including `index`.
    pub fn validate_through(
        &self,
        index: usize,
        value: &Value,
    ) -> Result<ValidationResult<Map<String, Value>>, WizardError> {
        self.get_step(index)?;
        let fields = self.steps[..=index].iter().flat_map(|s| s.fields.iter());
        Ok(self.schema.validate_subset(value, &FieldPath::root(), fields))
    }

    /// Full validation, including fields no step lists and refinements
    /// without declared dependencies.
    pub fn validate_all(&self, value: &Value) -> ValidationResult<Map<String, Value>> {
        self.schema.validate(value, &FieldPath::root())
    }

    /// The step owning the top-level field of `path`.
    pub fn step_of(&self, path: &FieldPath) -> Option<usize> {
        let field = path.first_field()?;
        self.steps.iter().position(|s| s.contains(field))
    }

    /// The earliest step that owns one of the failing paths, used to send
    /// the user back after a failed final submission.
    pub fn first_failing_step(&self, errors: &FieldErrors) -> Option<usize> {
        errors.iter().filter_map(|e| self.step_of(&e.path)).min()
    }

    /// Starts a cursor at the first step.
    pub fn start(&self) -> WizardState<'_> {
        WizardState {
            wizard: self,
            current: 0,
        }
    }
}

/// Cursor over a wizard's steps.
#[derive(Debug, Clone)]
pub struct WizardState<'w> {
    wizard: &'w Wizard,
    current: usize,
}

impl<'w> WizardState<'w> {
    pub fn current(&self) -> usize {
        self.current
    }

    /// The step the cursor is on; `None` only for a wizard without steps.
    pub fn current_step(&self) -> Option<&'w WizardStep> {
        self.wizard.steps.get(self.current)
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.wizard.steps.len()
    }

    /// Validates the current step and moves forward on success.
    ///
    /// On the last step a successful validation leaves the cursor in place;
    /// the caller submits with [`Wizard::validate_all`]. A wizard without
    /// steps validates the whole form.
    pub fn advance(&mut self, value: &Value) -> ValidationResult<Map<String, Value>> {
        let result = match self.wizard.validate_step(self.current, value) {
            Ok(result) => result,
            Err(_) => return self.wizard.validate_all(value),
        };
        if result.is_success() {
            if !self.is_last() {
                self.current += 1;
            }
        } else {
            debug!(step = self.current, "wizard step blocked by validation errors");
        }
        result
    }

    /// Moves back one step without validating. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Jumps to an earlier step, e.g. the one returned by
    /// [`Wizard::first_failing_step`]. Later steps cannot be skipped to.
    pub fn go_to(&mut self, index: usize) -> Result<(), WizardError> {
        if index > self.current {
            return Err(WizardError::StepNotReached {
                index,
                current: self.current,
            });
        }
        self.current = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn device_wizard() -> Wizard {
        let schema = Schema::object()
            .field("name", Schema::string().min_len(2))
            .field("phoneNumber", Schema::string().phone())
            .field("password", Schema::string().min_len(8))
            .field("confirmPassword", Schema::string())
            .field("dailyLimit", Schema::integer().positive())
            .fields_match("password", "confirmPassword", "passwords do not match")
            .unwrap();
        Wizard::new(schema)
            .step("device", ["name", "phoneNumber"])
            .unwrap()
            .step("credentials", ["password", "confirmPassword"])
            .unwrap()
            .step("limits", ["dailyLimit"])
            .unwrap()
    }

    #[test]
    fn test_step_rejects_empty_and_unknown() {
        let schema = Schema::object().field("a", Schema::string());
        assert!(matches!(
            Wizard::new(schema.clone()).step("empty", Vec::<String>::new()),
            Err(SchemaConstructionError::EmptyStep(name)) if name == "empty"
        ));
        assert!(matches!(
            Wizard::new(schema).step("bad", ["b"]),
            Err(SchemaConstructionError::UnknownPath(field)) if field == "b"
        ));
    }

    #[test]
    fn test_validate_step_ignores_other_steps() {
        let wizard = device_wizard();
        let value = json!({"name": "Office", "phoneNumber": "+14155550123"});
        assert!(wizard.validate_step(0, &value).unwrap().is_success());

        let errors = wizard
            .validate_step(1, &value)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(errors.iter().all(|e| wizard.step_of(&e.path) == Some(1)));
    }

    #[test]
    fn test_refinement_runs_within_its_step() {
        let wizard = device_wizard();
        let value = json!({"password": "longenough", "confirmPassword": "different"});
        let errors = wizard
            .validate_step(1, &value)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(errors.messages_at(&"confirmPassword".into()), vec!["passwords do not match"]);
    }

    #[test]
    fn test_validate_through_accumulates_steps() {
        let wizard = device_wizard();
        let errors = wizard
            .validate_through(1, &json!({}))
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(errors.path_count(), 4);
        assert!(!errors.contains_path(&"dailyLimit".into()));
    }

    #[test]
    fn test_unknown_step() {
        let wizard = device_wizard();
        assert_eq!(
            wizard.validate_step(3, &json!({})).unwrap_err(),
            WizardError::UnknownStep { index: 3, steps: 3 }
        );
    }

    #[test]
    fn test_state_navigation() {
        let wizard = device_wizard();
        let mut state = wizard.start();
        assert!(state.is_first());
        assert!(!state.back());

        assert!(state.advance(&json!({"name": "x"})).is_failure());
        assert_eq!(state.current(), 0);

        let value = json!({
            "name": "Office",
            "phoneNumber": "+14155550123",
            "password": "longenough",
            "confirmPassword": "longenough",
            "dailyLimit": 100
        });
        assert!(state.advance(&value).is_success());
        assert!(state.advance(&value).is_success());
        assert!(state.is_last());
        assert!(state.advance(&value).is_success());
        assert_eq!(state.current(), 2);

        assert!(state.back());
        assert_eq!(state.current_step().map(WizardStep::name), Some("credentials"));
    }

    #[test]
    fn test_first_failing_step_and_go_to() {
        let wizard = device_wizard();
        let mut state = wizard.start();
        let value = json!({
            "name": "Office",
            "phoneNumber": "+14155550123",
            "password": "longenough",
            "confirmPassword": "longenough"
        });
        assert!(state.advance(&value).is_success());
        assert!(state.advance(&value).is_success());

        let errors = wizard
            .validate_all(&json!({"name": "Office", "phoneNumber": "bad"}))
            .into_result()
            .unwrap_err();
        let step = wizard.first_failing_step(&errors).unwrap();
        assert_eq!(step, 0);
        state.go_to(step).unwrap();
        assert_eq!(state.current(), 0);
        assert_eq!(
            state.go_to(2),
            Err(WizardError::StepNotReached { index: 2, current: 0 })
        );
    }
}
