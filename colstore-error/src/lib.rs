#![feature(error_generic_member_access)]
#![deny(missing_docs)]
//! This crate defines error & result types for Colstore.
//!
//! Every failure a reader, writer or model constructor can report maps onto exactly one variant
//! of [`ColstoreError`]. The variants mirror the categories callers need to tell apart: bad
//! construction arguments, lookups of columns that are not part of a query or schema, reads of
//! null values, iteration past the last record, capability mismatches, violated resource
//! invariants, corrupted physical data and the underlying I/O failures.
//!
//! It also contains a variety of useful macros for error handling.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Colstore.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum ColstoreError {
    /// A model value could not be constructed from the given arguments.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// A column was requested that is not part of the active query or schema.
    #[error("Column {name} of type {column_type} not found")]
    NoSuchColumn {
        /// The normalized name of the requested column.
        name: String,
        /// The display name of the requested column's type.
        column_type: &'static str,
    },
    /// A value was read although the current record stores null for it.
    #[error("{0}\nBacktrace:\n{1}")]
    NullValue(ErrString, Backtrace),
    /// A record was requested although no further record exists.
    #[error("No next value")]
    NoMoreRecords,
    /// The operation is not supported by the receiver.
    #[error("{0}\nBacktrace:\n{1}")]
    Unsupported(ErrString, Backtrace),
    /// A resource invariant was violated.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidState(ErrString, Backtrace),
    /// Physical data could not be decoded.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidSerde(ErrString, Backtrace),
    /// An assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<ColstoreError>),
    /// A wrapper for IO errors.
    #[error(transparent)]
    IOError(#[from] io::Error),
    /// A wrapper for errors from the Arrow library.
    #[cfg(feature = "arrow")]
    #[error(transparent)]
    ArrowError(#[from] arrow_schema::ArrowError),
    /// A wrapper for errors from the Parquet library.
    #[cfg(feature = "parquet")]
    #[error(transparent)]
    ParquetError(#[from] parquet::errors::ParquetError),
}

impl ColstoreError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        ColstoreError::Context(msg.into(), Box::new(self))
    }

    /// The error with all [`ColstoreError::Context`] layers removed.
    pub fn root(&self) -> &ColstoreError {
        match self {
            ColstoreError::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// The bare message of the root error, without context or backtrace.
    pub fn message(&self) -> Cow<'_, str> {
        match self.root() {
            ColstoreError::InvalidArgument(msg, _)
            | ColstoreError::NullValue(msg, _)
            | ColstoreError::Unsupported(msg, _)
            | ColstoreError::InvalidState(msg, _)
            | ColstoreError::InvalidSerde(msg, _)
            | ColstoreError::AssertionFailed(msg, _) => Cow::Borrowed(msg.as_ref()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl Debug for ColstoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A convenient macro for creating a ColstoreError.
#[macro_export]
macro_rules! colstore_err {
    (NoSuchColumn: $name:expr, $column_type:expr) => {{
        $crate::__private::must_use($crate::ColstoreError::NoSuchColumn {
            name: $name.to_string(),
            column_type: $column_type,
        })
    }};
    (NoMoreRecords) => {{
        $crate::__private::must_use($crate::ColstoreError::NoMoreRecords)
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::ColstoreError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::__private::must_use(
            $crate::ColstoreError::$variant($err)
        )
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::colstore_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenience macro for creating a ColstoreError and returning it from the current function.
#[macro_export]
macro_rules! colstore_bail {
    ($($tt:tt)+) => {
        return Err($crate::colstore_err!($($tt)+))
    };
}

/// A convenience macro for panicking with a ColstoreError.
#[macro_export]
macro_rules! colstore_panic {
    ($err:expr) => {{
        let err: $crate::ColstoreError = $err;
        panic!("{}", err)
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::ColstoreError) -> crate::ColstoreError {
        error
    }
}

/// A type alias for Results that return ColstoreErrors as their error type.
pub type ColstoreResult<T> = Result<T, ColstoreError>;

/// A trait for expect-ing a value whose absence is a bug.
pub trait ColstoreExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value if it is present, otherwise panics with an `AssertionFailed` error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn colstore_expect(self, msg: &str) -> Self::Output;
}

impl<T> ColstoreExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    #[allow(clippy::panic)]
    fn colstore_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = ColstoreError::AssertionFailed(msg.to_string().into(), Backtrace::capture());
            colstore_panic!(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> ColstoreResult<()> {
        colstore_bail!(Unsupported: "lessThan does not support {}", "lowerBound")
    }

    #[test]
    fn bail_formats_message() {
        let err = fails().unwrap_err();
        assert!(matches!(err, ColstoreError::Unsupported(..)));
        assert_eq!(err.message(), "lessThan does not support lowerBound");
    }

    #[test]
    fn context_is_transparent_to_root() {
        let err = colstore_err!(InvalidState: "Channel has already been opened")
            .with_context("opening column x");
        assert!(matches!(err.root(), ColstoreError::InvalidState(..)));
        assert_eq!(err.message(), "Channel has already been opened");
        assert!(err.to_string().starts_with("opening column x: "));
    }

    #[test]
    fn no_such_column_names_column_and_type() {
        let err = colstore_err!(NoSuchColumn: "taxi_driver_id", "ID");
        assert_eq!(err.to_string(), "Column taxi_driver_id of type ID not found");
    }

    #[test]
    fn io_errors_convert() {
        let err: ColstoreError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ColstoreError::IOError(_)));
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    #[should_panic(expected = "value must be set")]
    fn expect_on_none_panics() {
        let value: Option<u8> = None;
        value.colstore_expect("value must be set");
    }
}
