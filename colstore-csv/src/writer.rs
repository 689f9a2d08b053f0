use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch, StringArray};
use arrow_csv::WriterBuilder;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colstore_dtype::{Column, Value};
use colstore_error::{ColstoreResult, colstore_bail};
use colstore_io::{ColumnWriter, RecordSink, Writer};

use crate::Header;
use crate::escape::escape;

/// Appends records to an existing delimited-text file.
///
/// The file's header line defines which columns can be written and in which order. Finished
/// records are staged in memory until [`Writer::flush`].
pub struct CsvWriter {
    path: PathBuf,
    header: Header,
    schema: SchemaRef,
    current: Vec<Option<String>>,
    staged: Vec<Vec<Option<String>>>,
}

impl CsvWriter {
    /// Open the file at `path`, which must already start with a header line.
    pub fn try_new(path: impl Into<PathBuf>) -> ColstoreResult<Self> {
        let path = path.into();
        let header = Header::read(&path)?;
        let schema = Arc::new(Schema::new(
            header
                .names()
                .iter()
                .map(|name| Field::new(name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        Ok(Self {
            current: vec![None; header.len()],
            path,
            header,
            schema,
            staged: Vec::new(),
        })
    }

    /// The file being appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of finished records not flushed yet.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }

    fn to_batch(&self) -> ColstoreResult<RecordBatch> {
        let columns = (0..self.header.len())
            .map(|field| {
                Arc::new(
                    self.staged
                        .iter()
                        .map(|record| record.get(field).cloned().flatten())
                        .collect::<StringArray>(),
                ) as ArrayRef
            })
            .collect::<Vec<_>>();
        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }
}

/// Whether a non-empty file lacks a trailing line break.
fn needs_line_break(file: &mut File) -> ColstoreResult<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn to_text(value: &Value<'_>) -> String {
    match value {
        Value::Boolean(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Id(v) => STANDARD.encode(v),
        Value::String(v) => escape(v).into_owned(),
    }
}

impl RecordSink for CsvWriter {
    fn write_value(&mut self, column: &Column, value: Value<'_>) -> ColstoreResult<()> {
        if value.column_type() != column.column_type() {
            colstore_bail!(
                "Cannot write a {} value to column {}",
                value.column_type(),
                column
            );
        }
        let position = self.header.position(column)?;
        self.current[position] = Some(to_text(&value));
        Ok(())
    }

    fn write_null(&mut self, column: &Column) -> ColstoreResult<()> {
        let position = self.header.position(column)?;
        self.current[position] = None;
        Ok(())
    }
}

impl Writer for CsvWriter {
    fn column_writer(&mut self, column: &Column) -> ColstoreResult<ColumnWriter<'_>> {
        self.header.position(column)?;
        Ok(ColumnWriter::new(column.clone(), self))
    }

    fn next(&mut self) -> ColstoreResult<()> {
        let record = std::mem::replace(&mut self.current, vec![None; self.header.len()]);
        self.staged.push(record);
        Ok(())
    }

    fn flush(&mut self) -> ColstoreResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let batch = self.to_batch()?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        if needs_line_break(&mut file)? {
            file.write_all(b"\n")?;
        }
        let mut writer = WriterBuilder::new().with_header(false).build(&mut file);
        writer.write(&batch)?;
        drop(writer);
        file.flush()?;

        log::debug!(
            "appended {} records to {}",
            self.staged.len(),
            self.path.display()
        );
        self.staged.clear();
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        self.flush()
    }
}
