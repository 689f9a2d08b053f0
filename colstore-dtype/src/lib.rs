#![deny(missing_docs)]

//! The column model for Colstore
//!
//! A [`Column`] names one typed attribute of a record. Columns are immutable value objects whose
//! identity is the pair of their lower-cased name and their [`ColumnType`]. The typed handles
//! ([`BooleanColumn`], [`DoubleColumn`], [`IdColumn`], [`LongColumn`], [`StringColumn`]) carry the
//! value type statically, so filters and typed readers/writers can only be built for the right
//! kind of column.

pub use column::*;
pub use column_type::*;
pub use typed::*;
pub use value::*;

mod column;
mod column_type;
mod typed;
mod value;
