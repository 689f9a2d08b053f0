use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use colstore_error::{ColstoreError, ColstoreResult, colstore_bail};

use crate::{Column, ColumnType, Value};

mod sealed {
    pub trait Sealed {}
}

/// A column handle whose value type is known statically.
///
/// Implemented only by the five typed handles of this crate. `Native<'a>` is the Rust type a
/// typed reader returns and a typed writer accepts for the column.
pub trait TypedColumn: AsRef<Column> + Clone + Display + sealed::Sealed {
    /// The dynamic type tag matching this handle.
    const COLUMN_TYPE: ColumnType;

    /// The native value type of the column, possibly borrowing from a record.
    type Native<'a>;

    /// Wrap a dynamically-typed column, failing if its type does not match.
    fn try_from_column(column: Column) -> ColstoreResult<Self>;

    /// Extract the native value out of a [`Value`] of the matching variant.
    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<Self::Native<'a>>;

    /// Wrap a native value into a [`Value`].
    fn to_value<'a>(native: Self::Native<'a>) -> Value<'a>;
}

macro_rules! typed_column {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) Column);

        impl Deref for $name {
            type Target = Column;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<Column> for $name {
            fn as_ref(&self) -> &Column {
                &self.0
            }
        }

        impl From<$name> for Column {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<&$name> for Column {
            fn from(value: &$name) -> Self {
                value.0.clone()
            }
        }

        impl TryFrom<Column> for $name {
            type Error = ColstoreError;

            fn try_from(column: Column) -> ColstoreResult<Self> {
                if column.column_type() != ColumnType::$variant {
                    colstore_bail!(
                        "Column {} is not of type {}",
                        column.name(),
                        ColumnType::$variant
                    );
                }
                Ok(Self(column))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl sealed::Sealed for $name {}
    };
}

typed_column!(
    /// A column of booleans.
    BooleanColumn,
    Boolean
);
typed_column!(
    /// A column of 64-bit floats.
    DoubleColumn,
    Double
);
typed_column!(
    /// A column of opaque byte identifiers.
    IdColumn,
    Id
);
typed_column!(
    /// A column of 64-bit signed integers.
    LongColumn,
    Long
);
typed_column!(
    /// A column of UTF-8 text.
    StringColumn,
    String
);

fn mismatch(expected: ColumnType, value: &Value<'_>) -> ColstoreError {
    colstore_error::colstore_err!(
        InvalidState: "Expected a {} value, found a {} value",
        expected,
        value.column_type()
    )
}

impl TypedColumn for BooleanColumn {
    const COLUMN_TYPE: ColumnType = ColumnType::Boolean;
    type Native<'a> = bool;

    fn try_from_column(column: Column) -> ColstoreResult<Self> {
        Self::try_from(column)
    }

    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<bool> {
        match value {
            Value::Boolean(v) => Ok(v),
            other => Err(mismatch(Self::COLUMN_TYPE, &other)),
        }
    }

    fn to_value<'a>(native: bool) -> Value<'a> {
        Value::Boolean(native)
    }
}

impl TypedColumn for DoubleColumn {
    const COLUMN_TYPE: ColumnType = ColumnType::Double;
    type Native<'a> = f64;

    fn try_from_column(column: Column) -> ColstoreResult<Self> {
        Self::try_from(column)
    }

    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<f64> {
        match value {
            Value::Double(v) => Ok(v),
            other => Err(mismatch(Self::COLUMN_TYPE, &other)),
        }
    }

    fn to_value<'a>(native: f64) -> Value<'a> {
        Value::Double(native)
    }
}

impl TypedColumn for IdColumn {
    const COLUMN_TYPE: ColumnType = ColumnType::Id;
    type Native<'a> = Cow<'a, [u8]>;

    fn try_from_column(column: Column) -> ColstoreResult<Self> {
        Self::try_from(column)
    }

    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<Cow<'a, [u8]>> {
        match value {
            Value::Id(v) => Ok(v),
            other => Err(mismatch(Self::COLUMN_TYPE, &other)),
        }
    }

    fn to_value<'a>(native: Self::Native<'a>) -> Value<'a> {
        Value::Id(native)
    }
}

impl TypedColumn for LongColumn {
    const COLUMN_TYPE: ColumnType = ColumnType::Long;
    type Native<'a> = i64;

    fn try_from_column(column: Column) -> ColstoreResult<Self> {
        Self::try_from(column)
    }

    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<i64> {
        match value {
            Value::Long(v) => Ok(v),
            other => Err(mismatch(Self::COLUMN_TYPE, &other)),
        }
    }

    fn to_value<'a>(native: i64) -> Value<'a> {
        Value::Long(native)
    }
}

impl TypedColumn for StringColumn {
    const COLUMN_TYPE: ColumnType = ColumnType::String;
    type Native<'a> = Cow<'a, str>;

    fn try_from_column(column: Column) -> ColstoreResult<Self> {
        Self::try_from(column)
    }

    fn to_native<'a>(value: Value<'a>) -> ColstoreResult<Cow<'a, str>> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch(Self::COLUMN_TYPE, &other)),
        }
    }

    fn to_value<'a>(native: Self::Native<'a>) -> Value<'a> {
        Value::String(native)
    }
}
