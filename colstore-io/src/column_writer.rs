use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use colstore_dtype::{
    BooleanColumn, Column, ColumnType, DoubleColumn, IdColumn, LongColumn, StringColumn,
    TypedColumn, Value,
};
use colstore_error::{ColstoreResult, colstore_bail};

use crate::RecordSink;

/// Writes one column of the current record from its native type.
pub struct TypedColumnWriter<'a, C> {
    column: Column,
    sink: &'a mut dyn RecordSink,
    _type: PhantomData<C>,
}

/// A writer for a [`BooleanColumn`].
pub type BooleanColumnWriter<'a> = TypedColumnWriter<'a, BooleanColumn>;
/// A writer for a [`DoubleColumn`].
pub type DoubleColumnWriter<'a> = TypedColumnWriter<'a, DoubleColumn>;
/// A writer for an [`IdColumn`].
pub type IdColumnWriter<'a> = TypedColumnWriter<'a, IdColumn>;
/// A writer for a [`LongColumn`].
pub type LongColumnWriter<'a> = TypedColumnWriter<'a, LongColumn>;
/// A writer for a [`StringColumn`].
pub type StringColumnWriter<'a> = TypedColumnWriter<'a, StringColumn>;

impl<'a, C: TypedColumn> TypedColumnWriter<'a, C> {
    fn new(column: Column, sink: &'a mut dyn RecordSink) -> Self {
        Self {
            column,
            sink,
            _type: PhantomData,
        }
    }

    /// The column being written.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Store `value` in the current record.
    pub fn write<'v>(&mut self, value: impl Into<C::Native<'v>>) -> ColstoreResult<()> {
        self.sink
            .write_value(&self.column, C::to_value(value.into()))
    }

    /// Store null in the current record.
    pub fn write_null(&mut self) -> ColstoreResult<()> {
        self.sink.write_null(&self.column)
    }
}

impl<C> Debug for TypedColumnWriter<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedColumnWriter")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

/// A column writer of any type.
#[derive(Debug)]
pub enum ColumnWriter<'a> {
    /// A boolean writer
    Boolean(BooleanColumnWriter<'a>),
    /// A double writer
    Double(DoubleColumnWriter<'a>),
    /// An id writer
    Id(IdColumnWriter<'a>),
    /// A long writer
    Long(LongColumnWriter<'a>),
    /// A string writer
    String(StringColumnWriter<'a>),
}

macro_rules! match_each_writer {
    ($self:expr, | $writer:ident | $body:expr) => {
        match $self {
            ColumnWriter::Boolean($writer) => $body,
            ColumnWriter::Double($writer) => $body,
            ColumnWriter::Id($writer) => $body,
            ColumnWriter::Long($writer) => $body,
            ColumnWriter::String($writer) => $body,
        }
    };
}

impl<'a> ColumnWriter<'a> {
    /// A writer for `column` into the current record of `sink`.
    pub fn new(column: Column, sink: &'a mut dyn RecordSink) -> Self {
        match column.column_type() {
            ColumnType::Boolean => Self::Boolean(TypedColumnWriter::new(column, sink)),
            ColumnType::Double => Self::Double(TypedColumnWriter::new(column, sink)),
            ColumnType::Id => Self::Id(TypedColumnWriter::new(column, sink)),
            ColumnType::Long => Self::Long(TypedColumnWriter::new(column, sink)),
            ColumnType::String => Self::String(TypedColumnWriter::new(column, sink)),
        }
    }

    /// The column being written.
    pub fn column(&self) -> &Column {
        match_each_writer!(self, |w| w.column())
    }

    /// Store `value` in the current record, failing if its type does not match the column.
    pub fn write_value(&mut self, value: Value<'_>) -> ColstoreResult<()> {
        let column_type = self.column().column_type();
        if value.column_type() != column_type {
            colstore_bail!(
                "Cannot write a {} value to column {}",
                value.column_type(),
                self.column()
            );
        }
        match_each_writer!(self, |w| w.sink.write_value(&w.column, value))
    }

    /// Store null in the current record.
    pub fn write_null(&mut self) -> ColstoreResult<()> {
        match_each_writer!(self, |w| w.write_null())
    }

    /// Narrow to the typed writer of `C`, failing if the column has another type.
    pub fn into_typed<C: TypedColumn>(self) -> ColstoreResult<TypedColumnWriter<'a, C>> {
        let (column, sink) = match_each_writer!(self, |w| (w.column, w.sink));
        if column.column_type() != C::COLUMN_TYPE {
            colstore_bail!(
                "Column {} is not of type {}",
                column.name(),
                C::COLUMN_TYPE
            );
        }
        Ok(TypedColumnWriter::new(column, sink))
    }
}
