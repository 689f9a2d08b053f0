use colstore_dtype::{Column, TypedColumn, Value};
use colstore_error::ColstoreResult;
use colstore_expr::Query;

use crate::{ColumnReader, TypedColumnReader};

/// Access to the values of a reader's current record.
pub trait RecordView {
    /// Whether the current record stores a value for `column`.
    fn is_present(&self, column: &Column) -> ColstoreResult<bool>;

    /// The value the current record stores for `column`, or `None` for null.
    fn value(&self, column: &Column) -> ColstoreResult<Option<Value<'_>>>;
}

/// A pull-style record reader over one physical source.
pub trait Reader: RecordView {
    /// Configure the session for `query`, discarding and releasing any earlier configuration.
    fn query(&mut self, query: &Query) -> ColstoreResult<()>;

    /// A reader for `column` positioned on the current record.
    ///
    /// Fails with `NoSuchColumn` if the active query does not select the column.
    fn column_reader(&self, column: &Column) -> ColstoreResult<ColumnReader<'_>>;

    /// Whether another record is available. Repeated calls without [`Reader::next`] do not
    /// advance the session.
    fn has_next(&mut self) -> ColstoreResult<bool>;

    /// Move to the next record, failing with `NoMoreRecords` if there is none.
    fn next(&mut self) -> ColstoreResult<()>;

    /// Release every resource held by the session.
    fn close(&mut self) -> ColstoreResult<()>;

    /// A typed reader for `column` positioned on the current record.
    fn of<C: TypedColumn>(&self, column: &C) -> ColstoreResult<TypedColumnReader<'_, C>>
    where
        Self: Sized,
    {
        self.column_reader(column.as_ref())?.into_typed()
    }
}
