use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use colstore_dtype::Column;
use colstore_error::{ColstoreResult, colstore_bail};

/// The field names of a delimited-text file, lower-cased and trimmed, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Read the header line of the file at `path`.
    pub fn read(path: &Path) -> ColstoreResult<Self> {
        let mut line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut line)?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            colstore_bail!(InvalidState: "{} has no header line", path.display());
        }
        Ok(Self::parse(line))
    }

    /// Split a header line into normalized names.
    pub fn parse(line: &str) -> Self {
        Self {
            names: line
                .split(',')
                .map(|name| name.trim().to_lowercase())
                .collect(),
        }
    }

    /// The names, in field order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the header has no fields.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The field position of `column`, failing with `NoSuchColumn` if the header lacks it.
    pub fn position(&self, column: &Column) -> ColstoreResult<usize> {
        self.names
            .iter()
            .position(|name| name == column.name())
            .ok_or_else(|| column.not_found())
    }
}
