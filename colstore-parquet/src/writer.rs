use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{
    ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use arrow_schema::SchemaRef;
use colstore_dtype::{Column, ColumnType, Value};
use colstore_error::{ColstoreResult, colstore_bail, colstore_err};
use colstore_io::{ColumnWriter, RecordSink, Writer};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{DEFAULT_MAX_ROW_GROUP_SIZE, WriterProperties};

use crate::schema_of;

/// Options for [`ParquetWriter`].
#[derive(Debug, Clone)]
pub struct ParquetWriteOptions {
    max_row_group_size: usize,
    record_batch_size: usize,
    compression: Compression,
}

impl Default for ParquetWriteOptions {
    fn default() -> Self {
        Self {
            max_row_group_size: DEFAULT_MAX_ROW_GROUP_SIZE,
            record_batch_size: 8192,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetWriteOptions {
    /// The maximum number of rows in a row group.
    pub fn with_max_row_group_size(mut self, max_row_group_size: usize) -> Self {
        self.max_row_group_size = max_row_group_size;
        self
    }

    /// The number of records buffered before they are encoded as one record batch.
    pub fn with_record_batch_size(mut self, record_batch_size: usize) -> Self {
        self.record_batch_size = record_batch_size;
        self
    }

    /// The codec column chunks are compressed with.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_max_row_group_size(self.max_row_group_size)
            .set_compression(self.compression)
            .build()
    }
}

type Record = Vec<Option<Value<'static>>>;

/// Writes records to a new Parquet file whose schema is fixed by the declared columns.
///
/// The file only becomes readable once [`Writer::close`] has written its footer.
pub struct ParquetWriter {
    path: PathBuf,
    columns: Vec<Column>,
    record_batch_size: usize,
    schema: SchemaRef,
    current: Record,
    buffered: Vec<Record>,
    writer: Option<ArrowWriter<File>>,
}

impl ParquetWriter {
    /// Create the file at `path`, which must not exist yet.
    pub fn try_new<C: Into<Column>>(
        path: impl Into<PathBuf>,
        columns: impl IntoIterator<Item = C>,
        options: ParquetWriteOptions,
    ) -> ColstoreResult<Self> {
        let path = path.into();
        let columns = columns.into_iter().map(Into::into).collect::<Vec<Column>>();
        if columns.is_empty() {
            colstore_bail!("At least one column has to be declared");
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name() == column.name()) {
                colstore_bail!("Column {} is declared more than once", column.name());
            }
        }

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                colstore_bail!(InvalidState: "{} already exists", path.display())
            }
            Err(e) => return Err(colstore_err!(IOError: e)),
        };
        let schema = schema_of(&columns);
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(options.properties()))?;
        log::debug!(
            "created parquet file {} with {} columns",
            path.display(),
            columns.len()
        );

        Ok(Self {
            current: vec![None; columns.len()],
            path,
            columns,
            record_batch_size: options.record_batch_size.max(1),
            schema,
            buffered: Vec::new(),
            writer: Some(writer),
        })
    }

    /// The file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared columns, in schema order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn position(&self, column: &Column) -> ColstoreResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| column.not_found())
    }

    fn writer(&mut self) -> ColstoreResult<&mut ArrowWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| colstore_err!(InvalidState: "Writer has been closed"))
    }

    /// Encode every buffered record as one record batch.
    fn write_buffered(&mut self) -> ColstoreResult<()> {
        if self.buffered.is_empty() {
            return Ok(());
        }
        let arrays = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| to_array(column.column_type(), &self.buffered, idx))
            .collect::<Vec<_>>();
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.writer()?.write(&batch)?;
        log::trace!("encoded {} records", batch.num_rows());
        self.buffered.clear();
        Ok(())
    }
}

fn to_array(column_type: ColumnType, records: &[Record], idx: usize) -> ArrayRef {
    let values = records.iter().map(|record| record.get(idx).and_then(Option::as_ref));
    match column_type {
        ColumnType::Boolean => Arc::new(
            values
                .map(|v| match v {
                    Some(Value::Boolean(v)) => Some(*v),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        ColumnType::Double => Arc::new(
            values
                .map(|v| match v {
                    Some(Value::Double(v)) => Some(*v),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        ColumnType::Id => Arc::new(
            values
                .map(|v| match v {
                    Some(Value::Id(v)) => Some(&**v),
                    _ => None,
                })
                .collect::<BinaryArray>(),
        ),
        ColumnType::Long => Arc::new(
            values
                .map(|v| match v {
                    Some(Value::Long(v)) => Some(*v),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        ColumnType::String => Arc::new(
            values
                .map(|v| match v {
                    Some(Value::String(v)) => Some(&**v),
                    _ => None,
                })
                .collect::<StringArray>(),
        ),
    }
}

impl RecordSink for ParquetWriter {
    fn write_value(&mut self, column: &Column, value: Value<'_>) -> ColstoreResult<()> {
        if value.column_type() != column.column_type() {
            colstore_bail!(
                "Cannot write a {} value to column {}",
                value.column_type(),
                column
            );
        }
        let position = self.position(column)?;
        self.current[position] = Some(value.into_owned());
        Ok(())
    }

    fn write_null(&mut self, column: &Column) -> ColstoreResult<()> {
        let position = self.position(column)?;
        self.current[position] = None;
        Ok(())
    }
}

impl Writer for ParquetWriter {
    fn column_writer(&mut self, column: &Column) -> ColstoreResult<ColumnWriter<'_>> {
        self.position(column)?;
        self.writer()?;
        Ok(ColumnWriter::new(column.clone(), self))
    }

    fn next(&mut self) -> ColstoreResult<()> {
        self.writer()?;
        let record = std::mem::replace(&mut self.current, vec![None; self.columns.len()]);
        self.buffered.push(record);
        if self.buffered.len() >= self.record_batch_size {
            self.write_buffered()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> ColstoreResult<()> {
        self.write_buffered()?;
        self.writer()?.flush()?;
        log::debug!("flushed row group to {}", self.path.display());
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        self.flush()?;
        if let Some(writer) = self.writer.take() {
            writer.close()?;
            log::debug!("closed parquet file {}", self.path.display());
        }
        Ok(())
    }
}
