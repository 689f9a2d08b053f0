use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use colstore_dtype::{Column, DoubleColumn, LongColumn};
use colstore_error::{ColstoreResult, colstore_bail};

/// How an ordered filter compares a value against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundMatch {
    /// `value < upper_bound`
    LessThan,
    /// `value > lower_bound`
    GreaterThan,
    /// `lower_bound <= value < upper_bound`
    Between,
}

impl Display for BoundMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BoundMatch::LessThan => "LESS_THAN",
            BoundMatch::GreaterThan => "GREATER_THAN",
            BoundMatch::Between => "BETWEEN",
        })
    }
}

macro_rules! bound_filter {
    (
        $(#[$meta:meta])*
        $filter:ident, $builder:ident, $column:ident, $native:ty, $name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $filter {
            column: Column,
            match_type: BoundMatch,
            lower: $native,
            upper: $native,
        }

        impl $filter {
            /// The column the filter is bound to.
            pub fn column(&self) -> &Column {
                &self.column
            }

            /// How the value is compared against the bounds.
            pub fn match_type(&self) -> BoundMatch {
                self.match_type
            }

            /// The exclusive (greater-than) or inclusive (between) lower bound.
            ///
            /// Fails with `Unsupported` for less-than filters.
            pub fn lower_bound(&self) -> ColstoreResult<$native> {
                if self.match_type == BoundMatch::LessThan {
                    colstore_bail!(Unsupported: "lessThan does not support lowerBound");
                }
                Ok(self.lower)
            }

            /// The exclusive upper bound.
            ///
            /// Fails with `Unsupported` for greater-than filters.
            pub fn upper_bound(&self) -> ColstoreResult<$native> {
                if self.match_type == BoundMatch::GreaterThan {
                    colstore_bail!(Unsupported: "greaterThan does not support upperBound");
                }
                Ok(self.upper)
            }

            /// Whether `value` satisfies the filter.
            pub fn matches(&self, value: $native) -> bool {
                match self.match_type {
                    BoundMatch::LessThan => value < self.upper,
                    BoundMatch::GreaterThan => value > self.lower,
                    BoundMatch::Between => value >= self.lower && value < self.upper,
                }
            }
        }

        impl Display for $filter {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!($name, "[column={}, matchType={}"),
                    self.column, self.match_type
                )?;
                if self.match_type != BoundMatch::LessThan {
                    write!(f, ", lowerBound={}", self.lower)?;
                }
                if self.match_type != BoundMatch::GreaterThan {
                    write!(f, ", upperBound={}", self.upper)?;
                }
                f.write_str("]")
            }
        }

        #[doc = concat!("Builds [`", stringify!($filter), "`]s for one column.")]
        #[derive(Debug, Clone)]
        pub struct $builder {
            column: Column,
        }

        impl $builder {
            pub(crate) fn new(column: &$column) -> Self {
                Self {
                    column: column.into(),
                }
            }

            /// Match values strictly below `max_exclusive`.
            pub fn is_less_than(self, max_exclusive: $native) -> $filter {
                $filter {
                    column: self.column,
                    match_type: BoundMatch::LessThan,
                    lower: <$native>::MIN,
                    upper: max_exclusive,
                }
            }

            /// Match values strictly above `min_exclusive`.
            pub fn is_greater_than(self, min_exclusive: $native) -> $filter {
                $filter {
                    column: self.column,
                    match_type: BoundMatch::GreaterThan,
                    lower: min_exclusive,
                    upper: <$native>::MAX,
                }
            }

            /// Match values in the half-open range `[min_inclusive, max_exclusive)`.
            ///
            /// Fails with `InvalidArgument` unless `min_inclusive < max_exclusive`.
            pub fn is_between(
                self,
                min_inclusive: $native,
                max_exclusive: $native,
            ) -> ColstoreResult<$filter> {
                if min_inclusive.partial_cmp(&max_exclusive) != Some(Ordering::Less) {
                    colstore_bail!("minInclusive has to be less than maxExclusive");
                }
                Ok($filter {
                    column: self.column,
                    match_type: BoundMatch::Between,
                    lower: min_inclusive,
                    upper: max_exclusive,
                })
            }
        }
    };
}

bound_filter!(
    /// An ordered predicate over a [`DoubleColumn`].
    DoubleFilter,
    DoubleFilterBuilder,
    DoubleColumn,
    f64,
    "DoubleFilter"
);

bound_filter!(
    /// An ordered predicate over a [`LongColumn`].
    LongFilter,
    LongFilterBuilder,
    LongColumn,
    i64,
    "LongFilter"
);
