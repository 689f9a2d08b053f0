use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_array::Array;
use arrow_array::cast::AsArray;
use arrow_csv::ReaderBuilder;
use arrow_schema::{DataType, Field, Schema};
use colstore_error::ColstoreResult;

use crate::Header;
use crate::escape::unescape;

/// The fields of one delimited-text record, unescaped. `None` is an empty field.
pub type RawRecord = Vec<Option<String>>;

/// A forward-only cursor over the records of a delimited-text file.
///
/// The cursor is consumed incrementally and never restarts: records handed out once are gone,
/// and a scan that pauses resumes exactly where it stopped.
pub struct RecordCursor {
    batches: arrow_csv::Reader<File>,
    batch: Option<RecordBatch>,
    row: usize,
    exhausted: bool,
}

impl RecordCursor {
    /// Open the file at `path`, skipping its header line and decoding `batch_size` rows at a time.
    pub fn open(path: &Path, header: &Header, batch_size: usize) -> ColstoreResult<Self> {
        let schema = Schema::new(
            header
                .names()
                .iter()
                .map(|name| Field::new(name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let batches = ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .with_batch_size(batch_size.max(1))
            .build(File::open(path)?)?;
        Ok(Self {
            batches,
            batch: None,
            row: 0,
            exhausted: false,
        })
    }

    /// Make sure an unread row is buffered, returning false once the file is exhausted.
    fn fill(&mut self) -> ColstoreResult<bool> {
        loop {
            if let Some(batch) = &self.batch {
                if self.row < batch.num_rows() {
                    return Ok(true);
                }
            }
            if self.exhausted {
                return Ok(false);
            }
            match self.batches.next().transpose()? {
                Some(batch) => {
                    log::trace!("decoded {} delimited-text rows", batch.num_rows());
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

    /// Whether every record has been handed out.
    pub fn is_exhausted(&mut self) -> ColstoreResult<bool> {
        Ok(!self.fill()?)
    }

    /// The next record, or `None` once the file is exhausted.
    pub fn next_record(&mut self) -> ColstoreResult<Option<RawRecord>> {
        if !self.fill()? {
            return Ok(None);
        }
        let Some(batch) = &self.batch else {
            return Ok(None);
        };
        let row = self.row;
        let record = batch
            .columns()
            .iter()
            .map(|column| {
                let column = column.as_string::<i32>();
                (!column.is_null(row)).then(|| unescape(column.value(row)).into_owned())
            })
            .collect();
        self.row += 1;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn cursor(contents: &str, batch_size: usize) -> RecordCursor {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, contents).unwrap();
        let header = Header::read(&path).unwrap();
        // the open file handle keeps the data alive after the directory is removed
        RecordCursor::open(&path, &header, batch_size).unwrap()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(1024)]
    fn yields_every_record_once(#[case] batch_size: usize) {
        let mut cursor = cursor("a,b\n1,x\n2,\n3,z\n", batch_size);
        let mut records = Vec::new();
        while let Some(record) = cursor.next_record().unwrap() {
            records.push(record);
        }
        assert_eq!(
            records,
            vec![
                vec![Some("1".to_string()), Some("x".to_string())],
                vec![Some("2".to_string()), None],
                vec![Some("3".to_string()), Some("z".to_string())],
            ]
        );
        assert!(cursor.is_exhausted().unwrap());
        assert!(cursor.next_record().unwrap().is_none());
    }

    #[test]
    fn exhaustion_does_not_consume() {
        let mut cursor = cursor("a\n1\n", 8);
        assert!(!cursor.is_exhausted().unwrap());
        assert!(!cursor.is_exhausted().unwrap());
        assert_eq!(cursor.next_record().unwrap(), Some(vec![Some("1".to_string())]));
        assert!(cursor.is_exhausted().unwrap());
    }

    #[test]
    fn quoted_and_escaped_fields() {
        let mut cursor = cursor("s\n\"a,b\"\n\"say \"\"hi\"\"\"\nline\\nbreak\n", 8);
        let texts: Vec<_> = std::iter::from_fn(|| cursor.next_record().unwrap())
            .map(|mut record| record.remove(0))
            .collect();
        assert_eq!(
            texts,
            vec![
                Some("a,b".to_string()),
                Some("say \"hi\"".to_string()),
                Some("line\nbreak".to_string()),
            ]
        );
    }
}
