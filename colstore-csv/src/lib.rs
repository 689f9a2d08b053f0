//! A Colstore backend over comma-separated text files.
//!
//! The first line of a file names its fields. Names are matched against columns
//! case-insensitively, and a field's type comes from the column used to read it, not from the
//! file. An empty field is null. Identifiers are stored as standard base64 and string values
//! escape backslash, backspace, form feed, newline, carriage return and tab.
//!
//! [`CsvReader`] scans with bounded memory: matching records are staged in a memory-mapped
//! scratch buffer of fixed capacity, one batch at a time, and the scan over the file resumes
//! where it stopped once a batch has been consumed.
//!
//! ```text
//!   file ──► RecordCursor ──► filters ──► ScratchBuffer ──► next() / column readers
//!               (arrow-csv)                (mmap, batch)
//! ```
//!
//! [`CsvWriter`] appends records to a file that already carries a header line.

pub use cursor::{RawRecord, RecordCursor};
pub use header::Header;
pub use reader::*;
pub use scratch::ScratchBuffer;
pub use writer::*;

mod cursor;
pub mod escape;
mod header;
mod reader;
mod scratch;
#[cfg(test)]
mod tests;
mod writer;
