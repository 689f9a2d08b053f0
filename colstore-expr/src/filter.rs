use std::fmt::{Display, Formatter};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colstore_dtype::{
    BooleanColumn, Column, DoubleColumn, IdColumn, LongColumn, StringColumn, Value,
};
use itertools::Itertools;

use crate::{
    DoubleFilter, DoubleFilterBuilder, LongFilter, LongFilterBuilder, StringFilter,
    StringFilterBuilder,
};

/// A typed predicate bound to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality on a boolean column
    Boolean(BooleanFilter),
    /// Ordered bounds on a double column
    Double(DoubleFilter),
    /// Byte equality on an id column
    Id(IdFilter),
    /// Ordered bounds on a long column
    Long(LongFilter),
    /// Case-insensitive text match on a string column
    String(StringFilter),
}

impl Filter {
    /// Start a filter on a boolean column.
    pub fn where_boolean(column: &BooleanColumn) -> BooleanFilterBuilder {
        BooleanFilterBuilder {
            column: column.into(),
        }
    }

    /// Start a filter on a double column.
    pub fn where_double(column: &DoubleColumn) -> DoubleFilterBuilder {
        DoubleFilterBuilder::new(column)
    }

    /// Start a filter on an id column.
    pub fn where_id(column: &IdColumn) -> IdFilterBuilder {
        IdFilterBuilder {
            column: column.into(),
        }
    }

    /// Start a filter on a long column.
    pub fn where_long(column: &LongColumn) -> LongFilterBuilder {
        LongFilterBuilder::new(column)
    }

    /// Start a filter on a string column.
    pub fn where_string(column: &StringColumn) -> StringFilterBuilder {
        StringFilterBuilder::new(column)
    }

    /// The column the filter is bound to.
    pub fn column(&self) -> &Column {
        match self {
            Filter::Boolean(f) => f.column(),
            Filter::Double(f) => f.column(),
            Filter::Id(f) => f.column(),
            Filter::Long(f) => f.column(),
            Filter::String(f) => f.column(),
        }
    }

    /// Evaluate the filter against a typed value.
    ///
    /// Null never matches, and neither does a value of another type than the filter's column.
    pub fn matches_value(&self, value: Option<&Value<'_>>) -> bool {
        match (self, value) {
            (Filter::Boolean(f), Some(Value::Boolean(v))) => f.matches(*v),
            (Filter::Double(f), Some(Value::Double(v))) => f.matches(*v),
            (Filter::Id(f), Some(Value::Id(v))) => f.matches(v),
            (Filter::Long(f), Some(Value::Long(v))) => f.matches(*v),
            (Filter::String(f), Some(Value::String(v))) => f.matches(v),
            _ => false,
        }
    }

    /// Evaluate the filter against the textual form of a value.
    ///
    /// Text that does not parse as the column's type is a non-match. Long text must be bare
    /// digits; double text may carry surrounding whitespace. Ids are compared in their base64 form.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            Filter::Boolean(f) => {
                if text.eq_ignore_ascii_case("true") {
                    f.matches(true)
                } else if text.eq_ignore_ascii_case("false") {
                    f.matches(false)
                } else {
                    false
                }
            }
            Filter::Double(f) => text.trim().parse::<f64>().is_ok_and(|v| f.matches(v)),
            Filter::Id(f) => f.encoded() == text,
            Filter::Long(f) => text.parse::<i64>().is_ok_and(|v| f.matches(v)),
            Filter::String(f) => f.matches(text),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Boolean(filter) => Display::fmt(filter, f),
            Filter::Double(filter) => Display::fmt(filter, f),
            Filter::Id(filter) => Display::fmt(filter, f),
            Filter::Long(filter) => Display::fmt(filter, f),
            Filter::String(filter) => Display::fmt(filter, f),
        }
    }
}

macro_rules! into_filter {
    ($($variant:ident($filter:ident)),+ $(,)?) => {
        $(
            impl From<$filter> for Filter {
                fn from(filter: $filter) -> Self {
                    Filter::$variant(filter)
                }
            }
        )+
    };
}

into_filter!(
    Boolean(BooleanFilter),
    Double(DoubleFilter),
    Id(IdFilter),
    Long(LongFilter),
    String(StringFilter),
);

/// Matches records whose boolean value equals the filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BooleanFilter {
    column: Column,
    value: bool,
}

impl BooleanFilter {
    /// The column the filter is bound to.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// The expected value.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Whether `value` satisfies the filter.
    pub fn matches(&self, value: bool) -> bool {
        self.value == value
    }
}

impl Display for BooleanFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BooleanFilter[column={}, value={}]", self.column, self.value)
    }
}

/// Builds [`BooleanFilter`]s for one column.
#[derive(Debug, Clone)]
pub struct BooleanFilterBuilder {
    column: Column,
}

impl BooleanFilterBuilder {
    /// Match records whose value equals `value`.
    pub fn is(self, value: bool) -> BooleanFilter {
        BooleanFilter {
            column: self.column,
            value,
        }
    }
}

/// Matches records whose id is byte-for-byte equal to the filter id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdFilter {
    column: Column,
    id: Vec<u8>,
}

impl IdFilter {
    /// The column the filter is bound to.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// The expected id.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Whether `id` satisfies the filter.
    pub fn matches(&self, id: &[u8]) -> bool {
        self.id == id
    }

    /// The base64 text of the expected id.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.id)
    }
}

impl Display for IdFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IdFilter[column={}, id=[{}]]",
            self.column,
            self.id.iter().join(", ")
        )
    }
}

/// Builds [`IdFilter`]s for one column.
#[derive(Debug, Clone)]
pub struct IdFilterBuilder {
    column: Column,
}

impl IdFilterBuilder {
    /// Match records whose id equals `id`.
    pub fn is(self, id: impl Into<Vec<u8>>) -> IdFilter {
        IdFilter {
            column: self.column,
            id: id.into(),
        }
    }
}
