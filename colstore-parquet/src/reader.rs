use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;

use arrow_array::cast::AsArray;
use arrow_array::types::{Float64Type, Int64Type};
use arrow_array::{Array, RecordBatch};
use arrow_schema::Schema;
use colstore_dtype::{Column, ColumnType, Value};
use colstore_error::{ColstoreResult, colstore_bail, colstore_err};
use colstore_expr::Query;
use colstore_io::{ColumnReader, Reader, RecordView};
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::column_type_of;

/// Options for [`ParquetReader`].
#[derive(Debug, Clone)]
pub struct ParquetReadOptions {
    batch_size: usize,
}

impl Default for ParquetReadOptions {
    fn default() -> Self {
        Self { batch_size: 1024 }
    }
}

impl ParquetReadOptions {
    /// The number of rows decoded at a time.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// The configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// The value of row `row` in `array`, decoded as `column_type`.
fn value_at(
    array: &dyn Array,
    column_type: ColumnType,
    row: usize,
) -> ColstoreResult<Option<Value<'_>>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let value = match column_type {
        ColumnType::Boolean => array.as_boolean_opt().map(|a| Value::Boolean(a.value(row))),
        ColumnType::Double => array
            .as_primitive_opt::<Float64Type>()
            .map(|a| Value::Double(a.value(row))),
        ColumnType::Id => array
            .as_binary_opt::<i32>()
            .map(|a| Value::Id(Cow::Borrowed(a.value(row)))),
        ColumnType::Long => array
            .as_primitive_opt::<Int64Type>()
            .map(|a| Value::Long(a.value(row))),
        ColumnType::String => array
            .as_string_opt::<i32>()
            .map(|a| Value::String(Cow::Borrowed(a.value(row)))),
    };
    value.map(Some).ok_or_else(|| {
        colstore_err!(
            InvalidSerde: "Cannot read {} as a value of type {}",
            array.data_type(),
            column_type
        )
    })
}

/// The root field of `schema` storing `column`, matched case-insensitively by name and exactly by
/// type.
fn field_of(schema: &Schema, column: &Column) -> ColstoreResult<usize> {
    schema
        .fields()
        .iter()
        .position(|field| {
            field.name().to_lowercase() == column.name()
                && column_type_of(field.data_type()) == Some(column.column_type())
        })
        .ok_or_else(|| column.not_found())
}

/// The state of one configured query.
struct Scan {
    query: Query,
    /// Position of every selected column in the projected batches.
    positions: HashMap<Column, usize>,
    /// Position of every filter's column, in filter order.
    filter_fields: Vec<usize>,
    batches: ParquetRecordBatchReader,
    batch: Option<RecordBatch>,
    /// The next row of `batch` to inspect.
    row: usize,
    /// A matching row of `batch` found by `has_next` and not consumed yet.
    pending: Option<usize>,
    exhausted: bool,
    current: Option<(RecordBatch, usize)>,
}

impl Scan {
    fn matches(&self, batch: &RecordBatch, row: usize) -> ColstoreResult<bool> {
        let values = self
            .query
            .filters()
            .iter()
            .zip(&self.filter_fields)
            .map(|(filter, &field)| {
                value_at(batch.column(field).as_ref(), filter.column().column_type(), row)
            })
            .collect::<ColstoreResult<Vec<_>>>()?;
        Ok(self
            .query
            .combinator()
            .evaluate(self.query.filters().iter().zip(&values), |(filter, value)| {
                filter.matches_value(value.as_ref())
            }))
    }

    /// Find the next matching row, decoding further batches as needed.
    fn seek(&mut self) -> ColstoreResult<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        loop {
            if let Some(batch) = self.batch.clone() {
                while self.row < batch.num_rows() {
                    let row = self.row;
                    self.row += 1;
                    if self.matches(&batch, row)? {
                        self.pending = Some(row);
                        return Ok(true);
                    }
                }
            }
            if self.exhausted {
                return Ok(false);
            }
            match self.batches.next().transpose()? {
                Some(batch) => {
                    log::trace!("decoded {} parquet rows", batch.num_rows());
                    self.batch = Some(batch);
                    self.row = 0;
                }
                None => {
                    self.batch = None;
                    self.exhausted = true;
                }
            }
        }
    }
}

/// Reads records of a single Parquet file.
///
/// Only the selected columns are decoded. Filters are evaluated on every decoded row.
pub struct ParquetReader {
    options: ParquetReadOptions,
    scan: Option<Scan>,
}

impl Default for ParquetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ParquetReader {
    /// Create a reader with default options that still has to be configured with a query.
    pub fn new() -> Self {
        Self::with_options(ParquetReadOptions::default())
    }

    /// Create a reader that still has to be configured with a query.
    pub fn with_options(options: ParquetReadOptions) -> Self {
        Self {
            options,
            scan: None,
        }
    }

    fn scan(&self) -> ColstoreResult<&Scan> {
        self.scan
            .as_ref()
            .ok_or_else(|| colstore_err!(InvalidState: "Reader has not been configured with a query"))
    }

    fn array(&self, column: &Column) -> ColstoreResult<(&dyn Array, usize)> {
        let scan = self.scan()?;
        let position = *scan.positions.get(column).ok_or_else(|| column.not_found())?;
        let Some((batch, row)) = &scan.current else {
            colstore_bail!(InvalidState: "Reader is not positioned on a record");
        };
        Ok((batch.column(position).as_ref(), *row))
    }
}

impl RecordView for ParquetReader {
    fn is_present(&self, column: &Column) -> ColstoreResult<bool> {
        let (array, row) = self.array(column)?;
        Ok(array.is_valid(row))
    }

    fn value(&self, column: &Column) -> ColstoreResult<Option<Value<'_>>> {
        let (array, row) = self.array(column)?;
        value_at(array, column.column_type(), row)
    }
}

impl Reader for ParquetReader {
    fn query(&mut self, query: &Query) -> ColstoreResult<()> {
        self.close()?;

        let path = query.source();
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
        let schema = builder.schema().clone();

        let mut roots = query
            .columns()
            .map(|column| field_of(&schema, column))
            .collect::<ColstoreResult<Vec<_>>>()?;
        roots.sort_unstable();
        roots.dedup();
        // Projected batches keep the file's field order.
        let positions = query
            .columns()
            .map(|column| {
                let root = field_of(&schema, column)?;
                let position = roots.binary_search(&root).map_err(|_| column.not_found())?;
                Ok((column.clone(), position))
            })
            .collect::<ColstoreResult<HashMap<_, _>>>()?;
        let filter_fields = query
            .filters()
            .iter()
            .map(|filter| {
                positions
                    .get(filter.column())
                    .copied()
                    .ok_or_else(|| filter.column().not_found())
            })
            .collect::<ColstoreResult<Vec<_>>>()?;

        let mask = ProjectionMask::roots(builder.parquet_schema(), roots.iter().copied());
        let batches = builder
            .with_projection(mask)
            .with_batch_size(self.options.batch_size.max(1))
            .build()?;

        log::debug!(
            "configured parquet reader over {} with {} columns and {} filters",
            path.display(),
            positions.len(),
            filter_fields.len()
        );
        self.scan = Some(Scan {
            query: query.clone(),
            positions,
            filter_fields,
            batches,
            batch: None,
            row: 0,
            pending: None,
            exhausted: false,
            current: None,
        });
        Ok(())
    }

    fn column_reader(&self, column: &Column) -> ColstoreResult<ColumnReader<'_>> {
        if !self.scan()?.positions.contains_key(column) {
            return Err(column.not_found());
        }
        Ok(ColumnReader::new(column.clone(), self))
    }

    fn has_next(&mut self) -> ColstoreResult<bool> {
        match self.scan.as_mut() {
            Some(scan) => scan.seek(),
            None => Ok(false),
        }
    }

    fn next(&mut self) -> ColstoreResult<()> {
        let Some(scan) = self.scan.as_mut() else {
            colstore_bail!(NoMoreRecords);
        };
        if !scan.seek()? {
            colstore_bail!(NoMoreRecords);
        }
        if let (Some(row), Some(batch)) = (scan.pending.take(), &scan.batch) {
            scan.current = Some((batch.clone(), row));
        }
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        self.scan = None;
        Ok(())
    }
}
