//! Date schema validation.
//!
//! Date inputs arrive as strings: either a calendar date (`2024-03-01`, what
//! an HTML date input submits) or an RFC 3339 timestamp, whose date part is
//! used.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, SchemaConstructionError};
use crate::path::FieldPath;
use crate::ValidationResult;

use super::traits::SchemaLike;
use super::{fail, type_error};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
enum DateConstraint {
    Min {
        date: NaiveDate,
        message: Option<String>,
    },
    Max {
        date: NaiveDate,
        message: Option<String>,
    },
}

/// A schema for validating dates.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldPath, Schema};
/// use serde_json::json;
///
/// let starts = Schema::date().min_str("2024-01-01").unwrap();
///
/// let result = starts.validate(&json!("2024-06-30T12:00:00Z"), &FieldPath::root());
/// assert!(result.is_success());
///
/// let errors = starts.validate(&json!("2023-12-31"), &FieldPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().message, "must be on or after 2024-01-01");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    constraints: Vec<DateConstraint>,
    type_error_message: Option<String>,
}

impl DateSchema {
    /// Creates a new date schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a date on or after `date`.
    pub fn min(mut self, date: NaiveDate) -> Self {
        self.constraints.push(DateConstraint::Min {
            date,
            message: None,
        });
        self
    }

    /// Requires a date on or before `date`.
    pub fn max(mut self, date: NaiveDate) -> Self {
        self.constraints.push(DateConstraint::Max {
            date,
            message: None,
        });
        self
    }

    /// Like [`min`](Self::min), parsing a `YYYY-MM-DD` bound.
    pub fn min_str(self, date: &str) -> Result<Self, SchemaConstructionError> {
        Ok(self.min(parse_bound(date)?))
    }

    /// Like [`max`](Self::max), parsing a `YYYY-MM-DD` bound.
    pub fn max_str(self, date: &str) -> Result<Self, SchemaConstructionError> {
        Ok(self.max(parse_bound(date)?))
    }

    /// Sets a custom error message for the most recent constraint, or the
    /// type error message when there is none.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(DateConstraint::Min { message: m, .. })
            | Some(DateConstraint::Max { message: m, .. }) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<NaiveDate> {
        let Some(raw) = value.as_str() else {
            return type_error(path, &self.type_error_message, "date", value);
        };
        let Some(date) = parse_date(raw.trim()) else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "invalid date".to_string());
            return fail(FieldError::new(path.clone(), message).with_code("invalid_date"));
        };

        let violation = self.constraints.iter().find_map(|c| match c {
            DateConstraint::Min { date: min, message } if date < *min => Some(
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| format!("must be on or after {}", min.format(DATE_FORMAT))),
                )
                .with_code("min"),
            ),
            DateConstraint::Max { date: max, message } if date > *max => Some(
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| format!("must be on or before {}", max.format(DATE_FORMAT))),
                )
                .with_code("max"),
            ),
            _ => None,
        });

        match violation {
            Some(error) => fail(error),
            None => Validation::Success(date),
        }
    }
}

impl SchemaLike for DateSchema {
    type Output = NaiveDate;

    fn validate(&self, value: &Value, path: &FieldPath) -> ValidationResult<NaiveDate> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> ValidationResult {
        self.validate(value, path)
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub(crate) fn parse_bound(raw: &str) -> Result<NaiveDate, SchemaConstructionError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| SchemaConstructionError::InvalidDate(raw.to_string()))
}
