//! A Colstore backend over Apache Parquet files.
//!
//! A dataset is a single Parquet file with a flat schema of nullable columns, one per declared
//! [`Column`](colstore_dtype::Column):
//!
//! | Column type | Arrow type |
//! |-------------|------------|
//! | `BOOLEAN`   | `Boolean`  |
//! | `DOUBLE`    | `Float64`  |
//! | `ID`        | `Binary`   |
//! | `LONG`      | `Int64`    |
//! | `STRING`    | `Utf8`     |
//!
//! [`ParquetReader`] projects the selected columns and evaluates filters on decoded values, one
//! record at a time. [`ParquetWriter`] buffers records into Arrow record batches.

pub use reader::*;
pub use schema::*;
pub use writer::*;

mod reader;
mod schema;
#[cfg(test)]
mod tests;
mod writer;
