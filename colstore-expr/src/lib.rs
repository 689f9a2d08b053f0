#![deny(missing_docs)]

//! Filters and queries over Colstore columns.
//!
//! A [`Filter`] is a typed predicate bound to exactly one column. A [`Query`] combines a
//! non-empty column selection with zero or more filters and a [`Combinator`], and names the
//! physical source it targets. Queries can only be built through [`QueryBuilder`], which adds
//! every filter's column to the selection.
//!
//! ```
//! use colstore_dtype::Column;
//! use colstore_expr::{Filter, Query};
//!
//! let fare = Column::for_double("fare_amount").unwrap();
//! let vendor = Column::for_string("vendor").unwrap();
//!
//! let query = Query::from_source("trips.csv")
//!     .select(&vendor)
//!     .filter(Filter::where_double(&fare).is_between(10.0, 20.0).unwrap())
//!     .all_of()
//!     .unwrap();
//!
//! assert!(query.contains(&fare));
//! ```

pub use bound::*;
pub use filter::*;
pub use query::*;
pub use string::*;

mod bound;
mod filter;
mod query;
mod string;
