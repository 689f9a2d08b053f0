use colstore_dtype::{Column, TypedColumn, Value};
use colstore_error::ColstoreResult;

use crate::{ColumnWriter, TypedColumnWriter};

/// Accepts the values of a writer's current record.
pub trait RecordSink {
    /// Store `value` for `column` in the current record.
    fn write_value(&mut self, column: &Column, value: Value<'_>) -> ColstoreResult<()>;

    /// Store null for `column` in the current record.
    fn write_null(&mut self, column: &Column) -> ColstoreResult<()>;
}

/// A push-style record writer over one physical target.
pub trait Writer: RecordSink {
    /// A writer for `column` on the current record.
    ///
    /// Fails with `NoSuchColumn` if the target cannot store the column.
    fn column_writer(&mut self, column: &Column) -> ColstoreResult<ColumnWriter<'_>>;

    /// Finish the current record. Columns not written for it are stored as null.
    fn next(&mut self) -> ColstoreResult<()>;

    /// Persist every finished record without closing the session.
    fn flush(&mut self) -> ColstoreResult<()>;

    /// Flush and release every resource held by the session.
    fn close(&mut self) -> ColstoreResult<()>;

    /// A typed writer for `column` on the current record.
    fn of<C: TypedColumn>(&mut self, column: &C) -> ColstoreResult<TypedColumnWriter<'_, C>>
    where
        Self: Sized,
    {
        self.column_writer(column.as_ref())?.into_typed()
    }
}
