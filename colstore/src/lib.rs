//! Typed columnar data access over interchangeable storage formats.
//!
//! Every backend implements the same [`Reader`] and [`Writer`] contract, so code written against
//! a [`Query`](expr::Query) of typed [`Column`](dtype::Column)s works unchanged over the binary
//! columnar format ([`file`]), delimited text ([`csv`]) and Parquet ([`parquet`]).

pub use colstore_io::*;
pub use {
    colstore_csv as csv, colstore_dtype as dtype, colstore_error as error, colstore_expr as expr,
    colstore_file as file, colstore_parquet as parquet,
};
