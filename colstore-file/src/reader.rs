use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;
use colstore_dtype::{Column, Value};
use colstore_error::{ColstoreResult, colstore_bail, colstore_err};
use colstore_expr::Query;
use colstore_io::{ColumnReader, Reader, RecordView};

use crate::cursor::ColumnCursor;
use crate::{column_path, list_columns};

/// Reads a binary columnar dataset, loading every selected column into memory.
///
/// Columns are walked independently: each `has_next` check advances every column that still has
/// an entry, and the reader is exhausted once no column advances.
pub struct ColumnarReader {
    root: Option<PathBuf>,
    cursors: Vec<ColumnCursor>,
    positions: HashMap<Column, usize>,
    consumed: bool,
    has_next: bool,
}

impl Default for ColumnarReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnarReader {
    /// Create a reader that still has to be configured with a query.
    pub fn new() -> Self {
        Self {
            root: None,
            cursors: Vec::new(),
            positions: HashMap::new(),
            consumed: true,
            has_next: false,
        }
    }

    /// Rewind every column to before its first entry, keeping the loaded data.
    pub fn reset(&mut self) {
        self.cursors.iter_mut().for_each(ColumnCursor::reset);
        self.consumed = true;
        self.has_next = false;
    }

    /// Every column stored in the dataset the reader is configured for.
    pub fn columns(&self) -> ColstoreResult<Vec<Column>> {
        match &self.root {
            Some(root) => list_columns(root),
            None => colstore_bail!(InvalidState: "Reader has not been configured with a query"),
        }
    }

    fn cursor(&self, column: &Column) -> ColstoreResult<&ColumnCursor> {
        self.positions
            .get(column)
            .and_then(|&idx| self.cursors.get(idx))
            .ok_or_else(|| column.not_found())
    }

    fn load(root: &std::path::Path, column: &Column) -> ColstoreResult<Bytes> {
        let path = column_path(root, column);
        match fs::read(&path) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(column.not_found()),
            Err(e) => Err(colstore_err!(IOError: e)
                .with_context(format!("Reading column file {}", path.display()))),
        }
    }
}

impl RecordView for ColumnarReader {
    fn is_present(&self, column: &Column) -> ColstoreResult<bool> {
        self.cursor(column)?.is_present()
    }

    fn value(&self, column: &Column) -> ColstoreResult<Option<Value<'_>>> {
        self.cursor(column)?.value()
    }
}

impl Reader for ColumnarReader {
    fn query(&mut self, query: &Query) -> ColstoreResult<()> {
        if !query.filters().is_empty() {
            colstore_bail!(
                Unsupported: "For performance reasons, this reader does not support filters"
            );
        }
        self.close()?;

        let root = query.source().to_path_buf();
        for column in query.columns() {
            let bytes = Self::load(&root, column)?;
            log::debug!("loaded column {} ({} bytes)", column, bytes.len());
            self.positions.insert(column.clone(), self.cursors.len());
            self.cursors.push(ColumnCursor::new(column.clone(), bytes));
        }
        log::debug!(
            "configured columnar reader over {} with {} columns",
            root.display(),
            self.cursors.len()
        );
        self.root = Some(root);
        Ok(())
    }

    fn column_reader(&self, column: &Column) -> ColstoreResult<ColumnReader<'_>> {
        if !self.positions.contains_key(column) {
            return Err(column.not_found());
        }
        Ok(ColumnReader::new(column.clone(), self))
    }

    fn has_next(&mut self) -> ColstoreResult<bool> {
        if !self.consumed {
            return Ok(self.has_next);
        }
        self.consumed = false;
        self.has_next = false;
        for cursor in &mut self.cursors {
            if cursor.has_next()? {
                cursor.advance()?;
                self.has_next = true;
            } else {
                log::trace!("column {} has no further entries", cursor.column());
            }
        }
        Ok(self.has_next)
    }

    fn next(&mut self) -> ColstoreResult<()> {
        if !self.consumed && !self.has_next {
            colstore_bail!(NoMoreRecords);
        }
        if self.consumed && !self.has_next()? {
            colstore_bail!(NoMoreRecords);
        }
        self.consumed = true;
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        self.cursors.clear();
        self.positions.clear();
        self.root = None;
        self.consumed = true;
        self.has_next = false;
        Ok(())
    }
}
