use bytes::Bytes;
use colstore_dtype::{Column, Value};
use colstore_error::{ColstoreResult, colstore_err};

use crate::entry;

/// A record-synchronized position within one fully loaded column file.
///
/// The cursor starts before the first entry. [`ColumnCursor::advance`] moves it onto the first
/// entry and then from one entry header to the next.
pub(crate) struct ColumnCursor {
    column: Column,
    bytes: Bytes,
    index: Option<usize>,
}

impl ColumnCursor {
    pub fn new(column: Column, bytes: Bytes) -> Self {
        Self {
            column,
            bytes,
            index: None,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn reset(&mut self) {
        self.index = None;
    }

    fn position(&self) -> ColstoreResult<usize> {
        self.index.ok_or_else(|| {
            colstore_err!(InvalidState: "Column {} is not positioned on a record", self.column)
        })
    }

    /// Payload size of the current entry.
    pub fn current_size(&self) -> ColstoreResult<usize> {
        let index = self.position()?;
        entry::payload_size(self.column.column_type(), &self.bytes, index)
    }

    /// Offset just past the current entry.
    fn entry_end(&self) -> ColstoreResult<usize> {
        let mut end = self.position()? + 1;
        if self.is_present()? {
            end += self.current_size()?;
        }
        Ok(end)
    }

    pub fn has_next(&self) -> ColstoreResult<bool> {
        match self.index {
            None => Ok(!self.bytes.is_empty()),
            Some(_) => Ok(self.entry_end()? < self.bytes.len()),
        }
    }

    pub fn advance(&mut self) -> ColstoreResult<()> {
        let next = match self.index {
            None => 0,
            Some(_) => self
                .entry_end()
                .map_err(|e| e.with_context(format!("Reading column {}", self.column)))?,
        };
        log::trace!("column {} advanced to offset {}", self.column, next);
        self.index = Some(next);
        Ok(())
    }

    pub fn is_present(&self) -> ColstoreResult<bool> {
        entry::is_present(&self.bytes, self.position()?)
    }

    pub fn value(&self) -> ColstoreResult<Option<Value<'_>>> {
        entry::decode(self.column.column_type(), &self.bytes, self.position()?)
            .map_err(|e| e.with_context(format!("Reading column {}", self.column)))
    }
}
