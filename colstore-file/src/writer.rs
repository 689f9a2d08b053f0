use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use colstore_dtype::{Column, Value};
use colstore_error::{ColstoreExpect, ColstoreResult, colstore_bail, colstore_err};
use colstore_io::{ColumnWriter, RecordSink, Writer};

use crate::{ABSENT, column_path, entry};

/// Options for [`ColumnarWriter`].
#[derive(Debug, Clone)]
pub struct ColumnarWriteOptions {
    sync_on_flush: bool,
}

impl Default for ColumnarWriteOptions {
    fn default() -> Self {
        Self {
            sync_on_flush: true,
        }
    }
}

impl ColumnarWriteOptions {
    /// Whether [`Writer::flush`] forces written data to stable storage.
    pub fn with_sync_on_flush(mut self, sync_on_flush: bool) -> Self {
        self.sync_on_flush = sync_on_flush;
        self
    }

    /// Create a writer for a new dataset at `root`.
    pub fn open(self, root: impl Into<PathBuf>) -> ColumnarWriter {
        ColumnarWriter {
            root: root.into(),
            options: self,
            channels: HashMap::new(),
            records: 0,
        }
    }
}

/// The append channel of one column.
struct Channel {
    file: BufWriter<File>,
    written: bool,
    scratch: Vec<u8>,
}

impl Channel {
    fn open(path: &Path) -> ColstoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    colstore_err!(InvalidState: "Channel has already been opened")
                        .with_context(format!("Opening {}", path.display()))
                }
                _ => e.into(),
            })?;
        Ok(Self {
            file: BufWriter::new(file),
            written: false,
            scratch: Vec::new(),
        })
    }

    fn append(&mut self, value: Option<&Value<'_>>) -> ColstoreResult<()> {
        self.scratch.clear();
        entry::encode(value, &mut self.scratch)?;
        self.file.write_all(&self.scratch)?;
        Ok(())
    }
}

/// Writes a binary columnar dataset, one append-only file per column.
///
/// Every committed record adds exactly one entry to every open column: columns that were not
/// written for a record receive a null, and a column opened after `n` records were committed
/// starts with `n` nulls.
pub struct ColumnarWriter {
    root: PathBuf,
    options: ColumnarWriteOptions,
    channels: HashMap<Column, Channel>,
    records: u64,
}

impl ColumnarWriter {
    /// Create a writer for a new dataset at `root` with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ColumnarWriteOptions::default().open(root)
    }

    /// The number of committed records.
    pub fn record_count(&self) -> u64 {
        self.records
    }

    fn channel(&mut self, column: &Column) -> ColstoreResult<&mut Channel> {
        if !self.channels.contains_key(column) {
            let path = column_path(&self.root, column);
            let mut channel = Channel::open(&path)?;
            for _ in 0..self.records {
                channel.file.write_all(&[ABSENT])?;
            }
            log::debug!(
                "opened column {} at {} with {} back-filled nulls",
                column,
                path.display(),
                self.records
            );
            self.channels.insert(column.clone(), channel);
        }
        Ok(self
            .channels
            .get_mut(column)
            .colstore_expect("Channel is registered once opened"))
    }

    fn append(&mut self, column: &Column, value: Option<&Value<'_>>) -> ColstoreResult<()> {
        let channel = self.channel(column)?;
        if channel.written {
            colstore_bail!(
                InvalidState: "Column {} has already been written for the current record",
                column
            );
        }
        channel.append(value)?;
        channel.written = true;
        Ok(())
    }
}

impl RecordSink for ColumnarWriter {
    fn write_value(&mut self, column: &Column, value: Value<'_>) -> ColstoreResult<()> {
        if value.column_type() != column.column_type() {
            colstore_bail!(
                "Cannot write a {} value to column {}",
                value.column_type(),
                column
            );
        }
        self.append(column, Some(&value))
    }

    fn write_null(&mut self, column: &Column) -> ColstoreResult<()> {
        self.append(column, None)
    }
}

impl Writer for ColumnarWriter {
    fn column_writer(&mut self, column: &Column) -> ColstoreResult<ColumnWriter<'_>> {
        self.channel(column)?;
        Ok(ColumnWriter::new(column.clone(), self))
    }

    fn next(&mut self) -> ColstoreResult<()> {
        for channel in self.channels.values_mut() {
            if !channel.written {
                channel.append(None)?;
            }
            channel.written = false;
        }
        self.records += 1;
        Ok(())
    }

    fn flush(&mut self) -> ColstoreResult<()> {
        for channel in self.channels.values_mut() {
            channel.file.flush()?;
            if self.options.sync_on_flush {
                channel.file.get_ref().sync_all()?;
            }
        }
        log::debug!(
            "flushed {} columns after {} records",
            self.channels.len(),
            self.records
        );
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        // A partly written record is committed, so every column ends with the same entry count.
        if self.channels.values().any(|channel| channel.written) {
            self.next()?;
        }
        self.flush()?;
        self.channels.clear();
        Ok(())
    }
}
