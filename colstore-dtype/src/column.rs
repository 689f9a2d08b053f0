use std::fmt::{Display, Formatter};
use std::sync::Arc;

use colstore_error::{ColstoreError, ColstoreResult, colstore_bail, colstore_err};

use crate::{BooleanColumn, ColumnType, DoubleColumn, IdColumn, LongColumn, StringColumn};

/// A typed, name-normalized column descriptor.
///
/// Names are lower-cased on construction, so `Column::new("Fare", ..)` and
/// `Column::new("fare", ..)` describe the same column. Two columns are equal iff both their
/// names and their types are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    name: Arc<str>,
    column_type: ColumnType,
}

impl Column {
    /// Create a column, lower-casing its name.
    ///
    /// Fails with [`ColstoreError::InvalidArgument`] when the name is blank.
    pub fn new(name: &str, column_type: ColumnType) -> ColstoreResult<Self> {
        let name = name.to_lowercase();
        if name.trim().is_empty() {
            colstore_bail!("Name must not be blank");
        }
        Ok(Self {
            name: name.into(),
            column_type,
        })
    }

    /// Create a [`BooleanColumn`] handle.
    pub fn for_boolean(name: &str) -> ColstoreResult<BooleanColumn> {
        Self::new(name, ColumnType::Boolean).map(BooleanColumn)
    }

    /// Create a [`DoubleColumn`] handle.
    pub fn for_double(name: &str) -> ColstoreResult<DoubleColumn> {
        Self::new(name, ColumnType::Double).map(DoubleColumn)
    }

    /// Create an [`IdColumn`] handle.
    pub fn for_id(name: &str) -> ColstoreResult<IdColumn> {
        Self::new(name, ColumnType::Id).map(IdColumn)
    }

    /// Create a [`LongColumn`] handle.
    pub fn for_long(name: &str) -> ColstoreResult<LongColumn> {
        Self::new(name, ColumnType::Long).map(LongColumn)
    }

    /// Create a [`StringColumn`] handle.
    pub fn for_string(name: &str) -> ColstoreResult<StringColumn> {
        Self::new(name, ColumnType::String).map(StringColumn)
    }

    /// The lower-cased column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value type of the column.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// The error reported when this column is not part of a query or schema.
    pub fn not_found(&self) -> ColstoreError {
        colstore_err!(NoSuchColumn: self.name, self.column_type.name())
    }
}

impl From<&Column> for Column {
    fn from(value: &Column) -> Self {
        value.clone()
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.column_type)
    }
}
