//! Read and write Colstore's append-only binary columnar format.
//!
//! A dataset is a directory holding one file per column. Each column file is addressed by the
//! column's type and its lower-cased name, `<root>/<TYPE>/<name>`, for example
//! `trips/DOUBLE/fare_amount`. Column files carry no header and no footer: they are a flat
//! sequence of entries, exactly one entry per record, in write order.
//!
//! # Entry Format
//!
//! Every entry starts with a presence byte. Present entries are followed by their payload, absent
//! (null) entries are not.
//!
//! | Type      | Payload                                                     |
//! |-----------|-------------------------------------------------------------|
//! | `BOOLEAN` | 1 byte, [`TRUE`] or [`FALSE`]                               |
//! | `DOUBLE`  | 8 bytes, big-endian IEEE-754                                |
//! | `LONG`    | 8 bytes, big-endian two's complement                        |
//! | `ID`      | 4-byte big-endian length, then that many raw bytes          |
//! | `STRING`  | 4-byte big-endian length, then that many bytes of UTF-8     |
//!
//! ## Illustrated Column File
//! ```text
//! ┌──────────┬───────────────┬──────────┬──────────┬───────────────┐
//! │ PRESENT  │    payload    │  ABSENT  │ PRESENT  │    payload    │  ...
//! │  (0x7F)  │  (record 0)   │  (0x80)  │  (0x7F)  │  (record 2)   │
//! └──────────┴───────────────┴──────────┴──────────┴───────────────┘
//! ```
//!
//! # Reading
//!
//! [`ColumnarReader`] loads every selected column file into memory and walks them with one
//! cursor per column, advancing all cursors in lockstep to present one record at a time. The
//! format has no random access and no statistics, so queries carrying filters are rejected.
//!
//! # Writing
//!
//! [`ColumnarWriter`] appends to one file per column. A column opened after records were
//! already committed is back-filled with nulls, and every committed record adds exactly one
//! entry to every open column.

pub use layout::*;
pub use reader::*;
pub use writer::*;

mod cursor;
mod entry;
mod layout;
mod reader;
mod writer;

/// The presence byte of a stored value.
pub const PRESENT: u8 = 0x7F;
/// The presence byte of a null.
pub const ABSENT: u8 = 0x80;
/// The payload byte of a `true` boolean.
pub const TRUE: u8 = PRESENT;
/// The payload byte of a `false` boolean.
pub const FALSE: u8 = ABSENT;
