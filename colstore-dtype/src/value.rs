use std::borrow::Cow;

use crate::ColumnType;

/// A single typed value, borrowed from a record or owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A boolean value
    Boolean(bool),
    /// A double value
    Double(f64),
    /// An identifier
    Id(Cow<'a, [u8]>),
    /// A long value
    Long(i64),
    /// A string value
    String(Cow<'a, str>),
}

impl Value<'_> {
    /// The column type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Double(_) => ColumnType::Double,
            Value::Id(_) => ColumnType::Id,
            Value::Long(_) => ColumnType::Long,
            Value::String(_) => ColumnType::String,
        }
    }

    /// Detach the value from whatever it borrows.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Boolean(v) => Value::Boolean(v),
            Value::Double(v) => Value::Double(v),
            Value::Id(v) => Value::Id(Cow::Owned(v.into_owned())),
            Value::Long(v) => Value::Long(v),
            Value::String(v) => Value::String(Cow::Owned(v.into_owned())),
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(value: &'a [u8]) -> Self {
        Value::Id(Cow::Borrowed(value))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(value: Vec<u8>) -> Self {
        Value::Id(Cow::Owned(value))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}
