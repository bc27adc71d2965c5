//! Dynamic list fields with stable row identity.
//!
//! A [`FieldArray`] backs a repeatable group in a form (skills, phone numbers,
//! webhook headers). Every row gets a [`RowId`] when it is created. Ids come
//! from a counter that only moves forward, so an id is never handed out twice
//! even after the row holding it is removed. A renderer keys its row widgets
//! by id, so removing row 0 does not shift the identity (and the local state)
//! of the rows after it.
//!
//! # Example
//!
//! ```rust
//! use formcheck::FieldArray;
//! use serde_json::json;
//!
//! let mut phones = FieldArray::new();
//! let first = phones.append(json!("+14155550100"));
//! let second = phones.append(json!("+14155550101"));
//!
//! phones.remove_at(0).unwrap();
//! assert_eq!(phones.ids(), vec![second]);
//! assert_ne!(phones.append(json!("+14155550102")), first);
//! ```

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::error::{FieldError, FieldErrors};
use crate::path::{FieldPath, PathSegment};
use crate::schema::ArraySchema;
use crate::ValidationResult;

/// Errors from positional row operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldArrayError {
    /// The index does not address an existing row (or insertion point).
    #[error("row index {index} is out of bounds for {len} rows")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Opaque identity of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    /// Returns the raw id number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// One row: its identity and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub value: Value,
}

/// An ordered list of rows with stable identities.
#[derive(Debug, Clone, Default)]
pub struct FieldArray {
    rows: Vec<Row>,
    next_id: u64,
}

impl FieldArray {
    /// Creates an empty field array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field array holding `values`, each with a fresh id.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut array = Self::new();
        for value in values {
            array.append(value);
        }
        array
    }

    fn issue_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_index(&self, index: usize) -> Result<(), FieldArrayError> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(FieldArrayError::IndexOutOfBounds {
                index,
                len: self.rows.len(),
            })
        }
    }

    /// Adds a row at the end.
    pub fn append(&mut self, value: Value) -> RowId {
        let id = self.issue_id();
        self.rows.push(Row { id, value });
        id
    }

    /// Adds a row at the start.
    pub fn prepend(&mut self, value: Value) -> RowId {
        let id = self.issue_id();
        self.rows.insert(0, Row { id, value });
        id
    }

    /// Inserts a row before position `index`; `index == len()` appends.
    pub fn insert_at(&mut self, index: usize, value: Value) -> Result<RowId, FieldArrayError> {
        if index > self.rows.len() {
            return Err(FieldArrayError::IndexOutOfBounds {
                index,
                len: self.rows.len(),
            });
        }
        let id = self.issue_id();
        self.rows.insert(index, Row { id, value });
        Ok(id)
    }

    /// Removes the row at `index` and returns its value.
    ///
    /// Removing the last remaining row is allowed; a minimum row count is a
    /// schema constraint, reported by validation.
    pub fn remove_at(&mut self, index: usize) -> Result<Value, FieldArrayError> {
        self.check_index(index)?;
        let row = self.rows.remove(index);
        trace!(id = %row.id, index, remaining = self.rows.len(), "row removed");
        Ok(row.value)
    }

    /// Replaces the value at `index`, keeping the row's identity.
    pub fn update_at(&mut self, index: usize, value: Value) -> Result<(), FieldArrayError> {
        self.check_index(index)?;
        self.rows[index].value = value;
        Ok(())
    }

    /// Moves the row at `from` so that it ends up at position `to`.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<(), FieldArrayError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        Ok(())
    }

    /// Exchanges the rows at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), FieldArrayError> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.rows.swap(a, b);
        Ok(())
    }

    /// Replaces every row. The new rows get fresh ids.
    pub fn replace_all(&mut self, values: impl IntoIterator<Item = Value>) -> Vec<RowId> {
        self.rows.clear();
        let ids = values.into_iter().map(|value| self.append(value)).collect::<Vec<_>>();
        trace!(rows = ids.len(), "rows replaced");
        ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row ids in current order.
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    /// Row values in current order.
    pub fn values(&self) -> Vec<&Value> {
        self.rows.iter().map(|r| &r.value).collect()
    }

    /// Returns the value at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.rows.get(index).map(|r| &r.value)
    }

    /// Returns the value of the row with `id`.
    pub fn get_by_id(&self, id: RowId) -> Option<&Value> {
        self.rows.iter().find(|r| r.id == id).map(|r| &r.value)
    }

    /// Returns the current position of the row with `id`.
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// The plain array value submitted with the form. Ids are not part of it.
    pub fn to_value(&self) -> Value {
        Value::Array(self.rows.iter().map(|r| r.value.clone()).collect())
    }

    /// Validates the current values against `schema` at `path`.
    pub fn validate(&self, schema: &ArraySchema, path: &FieldPath) -> ValidationResult<Vec<Value>> {
        schema.validate(&self.to_value(), path)
    }

    /// Attributes element errors (`path.index...`) to the rows currently at
    /// those positions, in row order.
    pub fn row_errors<'e>(
        &self,
        errors: &'e FieldErrors,
        path: &FieldPath,
    ) -> IndexMap<RowId, Vec<&'e FieldError>> {
        let mut by_row: IndexMap<RowId, Vec<&'e FieldError>> = IndexMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            let row_path = path.push_index(index);
            let matched: Vec<&FieldError> = errors
                .iter()
                .filter(|e| e.path.starts_with(&row_path))
                .collect();
            if !matched.is_empty() {
                by_row.insert(row.id, matched);
            }
        }
        by_row
    }

    /// Errors reported at the array's own path (length constraints).
    pub fn array_errors<'e>(&self, errors: &'e FieldErrors, path: &FieldPath) -> Vec<&'e FieldError> {
        errors.iter().filter(|e| &e.path == path).collect()
    }

    /// Element errors whose index does not address a current row, e.g.
    /// errors computed before rows were removed.
    pub fn stale_errors<'e>(&self, errors: &'e FieldErrors, path: &FieldPath) -> Vec<&'e FieldError> {
        errors
            .iter()
            .filter(|e| match e.path.strip_prefix(path) {
                Some(rest) => matches!(rest.segments().next(), Some(PathSegment::Index(i)) if *i >= self.rows.len()),
                None => false,
            })
            .collect()
    }
}

impl From<Vec<Value>> for FieldArray {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}
