use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colstore_dtype::{Column, ColumnType, Value};
use colstore_error::{ColstoreExpect, ColstoreResult, colstore_bail, colstore_err};
use colstore_expr::Query;
use colstore_io::{ColumnReader, Reader, RecordView};

use crate::{Header, RawRecord, RecordCursor, ScratchBuffer};

/// Default size of the scratch mapping, 256 MiB.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 268_435_456;

/// Options for [`CsvReader`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    scratch_capacity: usize,
    read_batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            read_batch_size: 1024,
        }
    }
}

impl ScanOptions {
    /// The size in bytes of the scratch buffer matching records are staged in.
    pub fn with_scratch_capacity(mut self, scratch_capacity: usize) -> Self {
        self.scratch_capacity = scratch_capacity;
        self
    }

    /// The number of rows decoded from the file at a time.
    pub fn with_read_batch_size(mut self, read_batch_size: usize) -> Self {
        self.read_batch_size = read_batch_size;
        self
    }

    /// The configured scratch capacity.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch_capacity
    }

    /// The configured read batch size.
    pub fn read_batch_size(&self) -> usize {
        self.read_batch_size
    }
}

/// The state of one configured query.
struct Scan {
    query: Query,
    header: Header,
    /// Field position of every filter's column, in filter order.
    filter_fields: Vec<usize>,
    records: RecordCursor,
    /// A matching record that did not fit into the previous batch.
    carried: Option<RawRecord>,
    stop_threshold: Option<usize>,
    current: Option<RawRecord>,
}

impl Scan {
    fn matches(&self, record: &RawRecord) -> bool {
        let filters = self.query.filters().iter().zip(&self.filter_fields);
        self.query.combinator().evaluate(filters, |(filter, &field)| {
            let text = record
                .get(field)
                .and_then(|field| field.as_deref())
                .unwrap_or("");
            filter.matches_text(text)
        })
    }

    fn is_exhausted(&mut self) -> ColstoreResult<bool> {
        Ok(self.carried.is_none() && self.records.is_exhausted()?)
    }
}

/// Scans a delimited-text file with bounded memory.
///
/// Matching records are serialized into a fixed-size memory-mapped scratch buffer one batch at a
/// time. Once the caller has read every record of a batch the scan resumes where it stopped, so
/// at no point does the reader hold more than one batch of matches.
pub struct CsvReader {
    options: ScanOptions,
    scratch: Option<ScratchBuffer>,
    scan: Option<Scan>,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}

impl CsvReader {
    /// Create a reader that still has to be configured with a query.
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            scratch: None,
            scan: None,
        }
    }

    /// The options the reader was created with.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Drop the configured scan, keeping the scratch mapping for the next query.
    fn release_scan(&mut self) {
        self.scan = None;
        if let Some(scratch) = self.scratch.as_mut() {
            scratch.clear();
        }
    }

    fn scan(&self) -> ColstoreResult<&Scan> {
        self.scan
            .as_ref()
            .ok_or_else(|| colstore_err!(InvalidState: "Reader has not been configured with a query"))
    }

    /// Fill the scratch buffer with the next batch of matching records.
    fn fetch_batch(&mut self) -> ColstoreResult<()> {
        let (Some(scratch), Some(scan)) = (self.scratch.as_mut(), self.scan.as_mut()) else {
            colstore_bail!(InvalidState: "Reader has not been configured with a query");
        };
        scratch.clear();
        let capacity = scratch.capacity();
        let mut remaining = capacity;

        loop {
            let record = match scan.carried.take() {
                Some(record) => record,
                None => match scan.records.next_record()? {
                    Some(record) if scan.matches(&record) => record,
                    Some(_) => continue,
                    None => break,
                },
            };

            let size = ScratchBuffer::entry_len(&record);
            if size > capacity {
                colstore_bail!(
                    InvalidState: "Record of {} bytes exceeds the scratch capacity of {} bytes",
                    size,
                    capacity
                );
            }
            if size > remaining {
                scan.carried = Some(record);
                break;
            }
            scratch.push(&record)?;
            remaining -= size;

            let threshold = *scan.stop_threshold.get_or_insert(2 * size);
            if remaining < threshold {
                break;
            }
        }

        log::debug!(
            "fetched {} records ({} of {} scratch bytes) from {}",
            scratch.stored(),
            scratch.used(),
            capacity,
            scan.query.source().display()
        );
        Ok(())
    }

    fn field<'a>(&'a self, column: &Column) -> ColstoreResult<Option<&'a str>> {
        let scan = self.scan()?;
        let position = scan.header.position(column)?;
        Ok(scan
            .current
            .as_ref()
            .and_then(|record| record.get(position))
            .and_then(|field| field.as_deref())
            .filter(|text| !text.is_empty()))
    }
}

impl RecordView for CsvReader {
    fn is_present(&self, column: &Column) -> ColstoreResult<bool> {
        Ok(self.field(column)?.is_some())
    }

    fn value(&self, column: &Column) -> ColstoreResult<Option<Value<'_>>> {
        let Some(text) = self.field(column)? else {
            return Ok(None);
        };
        parse(column, text).map(Some)
    }
}

/// Parse field text as a value of the column's type.
fn parse<'a>(column: &Column, text: &'a str) -> ColstoreResult<Value<'a>> {
    let invalid = || {
        colstore_err!(
            InvalidSerde: "Cannot read '{}' as a value of column {}",
            text,
            column
        )
    };
    Ok(match column.column_type() {
        ColumnType::Boolean => Value::Boolean(text.trim().eq_ignore_ascii_case("true")),
        ColumnType::Double => Value::Double(text.trim().parse().map_err(|_| invalid())?),
        ColumnType::Long => Value::Long(text.parse().map_err(|_| invalid())?),
        ColumnType::Id => Value::Id(Cow::Owned(
            STANDARD.decode(text.trim()).map_err(|_| invalid())?,
        )),
        ColumnType::String => Value::String(Cow::Borrowed(text)),
    })
}

impl Reader for CsvReader {
    fn query(&mut self, query: &Query) -> ColstoreResult<()> {
        self.release_scan();

        let path = query.source();
        let header = Header::read(path)?;
        let filter_fields = query
            .filters()
            .iter()
            .map(|filter| header.position(filter.column()))
            .collect::<ColstoreResult<Vec<_>>>()?;
        let records = RecordCursor::open(path, &header, self.options.read_batch_size)?;

        if self
            .scratch
            .as_ref()
            .is_none_or(|s| s.capacity() != self.options.scratch_capacity)
        {
            self.scratch = Some(ScratchBuffer::new(self.options.scratch_capacity)?);
        }

        log::debug!(
            "configured delimited-text reader over {} with {} fields and {} filters",
            path.display(),
            header.len(),
            filter_fields.len()
        );
        self.scan = Some(Scan {
            query: query.clone(),
            header,
            filter_fields,
            records,
            carried: None,
            stop_threshold: None,
            current: None,
        });
        self.fetch_batch()
    }

    fn column_reader(&self, column: &Column) -> ColstoreResult<ColumnReader<'_>> {
        if !self.scan()?.query.contains(column) {
            return Err(column.not_found());
        }
        Ok(ColumnReader::new(column.clone(), self))
    }

    fn has_next(&mut self) -> ColstoreResult<bool> {
        loop {
            let Some(scan) = self.scan.as_mut() else {
                return Ok(false);
            };
            if self.scratch.as_ref().is_some_and(ScratchBuffer::has_unread) {
                return Ok(true);
            }
            if scan.is_exhausted()? {
                return Ok(false);
            }
            self.fetch_batch()?;
        }
    }

    fn next(&mut self) -> ColstoreResult<()> {
        if !self.has_next()? {
            colstore_bail!(NoMoreRecords);
        }
        let record = self
            .scratch
            .as_mut()
            .colstore_expect("Scratch buffer is mapped while a scan is configured")
            .pop()?;
        if let Some(scan) = self.scan.as_mut() {
            scan.current = record;
        }
        Ok(())
    }

    fn close(&mut self) -> ColstoreResult<()> {
        self.scan = None;
        self.scratch = None;
        Ok(())
    }
}
