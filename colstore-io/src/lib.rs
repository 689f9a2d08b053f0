//! The Reader/Writer contract every Colstore backend implements.
//!
//! A [`Reader`] is a stateful session: it is configured with a [`Query`](colstore_expr::Query),
//! driven through records with [`Reader::has_next`] and [`Reader::next`], and finally closed.
//! Values of the current record are read through typed column readers, which borrow the session
//! and are therefore obtained once per record. Obtaining one performs no I/O.
//!
//! A [`Writer`] mirrors this shape: values are written through typed column writers,
//! [`Writer::next`] finalizes the current record, [`Writer::flush`] persists what was written so
//! far and [`Writer::close`] flushes and releases the session.

pub use column_reader::*;
pub use column_writer::*;
pub use read::*;
pub use write::*;

mod column_reader;
mod column_writer;
mod read;
mod write;
