use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use colstore_dtype::{
    BooleanColumn, Column, ColumnType, DoubleColumn, IdColumn, LongColumn, StringColumn,
    TypedColumn, Value,
};
use colstore_error::{ColstoreResult, colstore_bail};

use crate::RecordView;

/// Reads one column of the current record as its native type.
pub struct TypedColumnReader<'a, C> {
    column: Column,
    record: &'a dyn RecordView,
    _type: PhantomData<C>,
}

/// A reader over a [`BooleanColumn`].
pub type BooleanColumnReader<'a> = TypedColumnReader<'a, BooleanColumn>;
/// A reader over a [`DoubleColumn`].
pub type DoubleColumnReader<'a> = TypedColumnReader<'a, DoubleColumn>;
/// A reader over an [`IdColumn`].
pub type IdColumnReader<'a> = TypedColumnReader<'a, IdColumn>;
/// A reader over a [`LongColumn`].
pub type LongColumnReader<'a> = TypedColumnReader<'a, LongColumn>;
/// A reader over a [`StringColumn`].
pub type StringColumnReader<'a> = TypedColumnReader<'a, StringColumn>;

impl<'a, C: TypedColumn> TypedColumnReader<'a, C> {
    fn new(column: Column, record: &'a dyn RecordView) -> Self {
        Self {
            column,
            record,
            _type: PhantomData,
        }
    }

    /// The column being read.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Whether the current record stores a value for the column.
    pub fn is_present(&self) -> ColstoreResult<bool> {
        self.record.is_present(&self.column)
    }

    /// Whether the current record stores null for the column.
    pub fn is_null(&self) -> ColstoreResult<bool> {
        self.is_present().map(|present| !present)
    }

    /// The value of the current record. Fails with `NullValue` if it is null.
    pub fn get(&self) -> ColstoreResult<C::Native<'a>> {
        let record: &'a dyn RecordView = self.record;
        match record.value(&self.column)? {
            Some(value) => C::to_native(value),
            None => colstore_bail!(NullValue: "Current value is null"),
        }
    }
}

impl<C> Debug for TypedColumnReader<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedColumnReader")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

/// A column reader of any type.
#[derive(Debug)]
pub enum ColumnReader<'a> {
    /// A boolean reader
    Boolean(BooleanColumnReader<'a>),
    /// A double reader
    Double(DoubleColumnReader<'a>),
    /// An id reader
    Id(IdColumnReader<'a>),
    /// A long reader
    Long(LongColumnReader<'a>),
    /// A string reader
    String(StringColumnReader<'a>),
}

macro_rules! match_each_reader {
    ($self:expr, | $reader:ident | $body:expr) => {
        match $self {
            ColumnReader::Boolean($reader) => $body,
            ColumnReader::Double($reader) => $body,
            ColumnReader::Id($reader) => $body,
            ColumnReader::Long($reader) => $body,
            ColumnReader::String($reader) => $body,
        }
    };
}

impl<'a> ColumnReader<'a> {
    /// A reader for `column` over the current record of `record`.
    pub fn new(column: Column, record: &'a dyn RecordView) -> Self {
        match column.column_type() {
            ColumnType::Boolean => Self::Boolean(TypedColumnReader::new(column, record)),
            ColumnType::Double => Self::Double(TypedColumnReader::new(column, record)),
            ColumnType::Id => Self::Id(TypedColumnReader::new(column, record)),
            ColumnType::Long => Self::Long(TypedColumnReader::new(column, record)),
            ColumnType::String => Self::String(TypedColumnReader::new(column, record)),
        }
    }

    /// The column being read.
    pub fn column(&self) -> &Column {
        match_each_reader!(self, |r| r.column())
    }

    /// Whether the current record stores a value for the column.
    pub fn is_present(&self) -> ColstoreResult<bool> {
        match_each_reader!(self, |r| r.is_present())
    }

    /// Whether the current record stores null for the column.
    pub fn is_null(&self) -> ColstoreResult<bool> {
        match_each_reader!(self, |r| r.is_null())
    }

    /// The value of the current record, or `None` for null.
    pub fn value(&self) -> ColstoreResult<Option<Value<'a>>> {
        let (column, record) = match_each_reader!(self, |r| (&r.column, r.record));
        record.value(column)
    }

    /// Narrow to the typed reader of `C`, failing if the column has another type.
    pub fn into_typed<C: TypedColumn>(self) -> ColstoreResult<TypedColumnReader<'a, C>> {
        let (column, record) = match_each_reader!(self, |r| (r.column, r.record));
        if column.column_type() != C::COLUMN_TYPE {
            colstore_bail!(
                "Column {} is not of type {}",
                column.name(),
                C::COLUMN_TYPE
            );
        }
        Ok(TypedColumnReader::new(column, record))
    }
}
