use serde::{Deserialize, Serialize};

use crate::errors::FieldAccessError;

// -2^63 is exact; 2^63 is the first real past i64::MAX
const I64_MIN_REAL: f64 = -9_223_372_036_854_775_808.0;
const I64_MAX_REAL: f64 = 9_223_372_036_854_775_808.0;

/// A single column or parameter value crossing the entity/store boundary
///
/// Mirrors the storage classes of the relational store plus an explicit
/// boolean, which the store persists as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl FieldValue {
    /// Short storage-class name used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real(_) => "real",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "bool",
            FieldValue::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Coerce to an integer; reals are accepted only when integral and
    /// inside the `i64` range
    pub fn as_i64(&self, field: &str) -> Result<i64, FieldAccessError> {
        match self {
            FieldValue::Integer(v) => Ok(*v),
            FieldValue::Bool(b) => Ok(i64::from(*b)),
            FieldValue::Real(r) if r.fract() == 0.0 && (I64_MIN_REAL..I64_MAX_REAL).contains(r) => {
                Ok(*r as i64)
            }
            FieldValue::Real(_) => Err(FieldAccessError::conversion(field, "integer", "real")),
            other => Err(FieldAccessError::conversion(
                field,
                "integer",
                other.type_name(),
            )),
        }
    }

    /// Like `as_i64` but maps `Null` to `None`, for nullable identity columns
    pub fn as_opt_i64(&self, field: &str) -> Result<Option<i64>, FieldAccessError> {
        match self {
            FieldValue::Null => Ok(None),
            other => other.as_i64(field).map(Some),
        }
    }

    pub fn as_f64(&self, field: &str) -> Result<f64, FieldAccessError> {
        match self {
            FieldValue::Real(v) => Ok(*v),
            FieldValue::Integer(v) => Ok(*v as f64),
            other => Err(FieldAccessError::conversion(field, "real", other.type_name())),
        }
    }

    pub fn as_text(&self, field: &str) -> Result<String, FieldAccessError> {
        match self {
            FieldValue::Text(s) => Ok(s.clone()),
            other => Err(FieldAccessError::conversion(field, "text", other.type_name())),
        }
    }

    pub fn as_opt_text(&self, field: &str) -> Result<Option<String>, FieldAccessError> {
        match self {
            FieldValue::Null => Ok(None),
            other => other.as_text(field).map(Some),
        }
    }

    /// Coerce to a boolean; integers 0 and 1 are accepted
    pub fn as_bool(&self, field: &str) -> Result<bool, FieldAccessError> {
        match self {
            FieldValue::Bool(b) => Ok(*b),
            FieldValue::Integer(0) => Ok(false),
            FieldValue::Integer(1) => Ok(true),
            other => Err(FieldAccessError::conversion(field, "bool", other.type_name())),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Blob(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One result row, keyed by column name
///
/// Column lookup ignores ASCII case, matching how the store resolves
/// identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValues {
    columns: Vec<(String, FieldValue)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: FieldValue) {
        self.columns.push((column.into(), value));
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// # Errors
    ///
    /// Returns `MissingField` when the row has no such column
    pub fn get(&self, column: &str) -> Result<&FieldValue, FieldAccessError> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
            .ok_or_else(|| FieldAccessError::missing("row", column))
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, FieldAccessError> {
        self.get(column)?.as_i64(column)
    }

    pub fn get_opt_i64(&self, column: &str) -> Result<Option<i64>, FieldAccessError> {
        self.get(column)?.as_opt_i64(column)
    }

    pub fn get_f64(&self, column: &str) -> Result<f64, FieldAccessError> {
        self.get(column)?.as_f64(column)
    }

    pub fn get_text(&self, column: &str) -> Result<String, FieldAccessError> {
        self.get(column)?.as_text(column)
    }

    pub fn get_opt_text(&self, column: &str) -> Result<Option<String>, FieldAccessError> {
        self.get(column)?.as_opt_text(column)
    }

    pub fn get_bool(&self, column: &str) -> Result<bool, FieldAccessError> {
        self.get(column)?.as_bool(column)
    }
}
