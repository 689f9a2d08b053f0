use std::fmt::{Display, Formatter};

use colstore_dtype::{Column, StringColumn};

/// How a [`StringFilter`] compares text against its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMatch {
    /// Whole-text equality
    Is,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
    /// Substring match
    Contains,
}

impl Display for StringMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StringMatch::Is => "IS",
            StringMatch::StartsWith => "STARTS_WITH",
            StringMatch::EndsWith => "ENDS_WITH",
            StringMatch::Contains => "CONTAINS",
        })
    }
}

/// A case-insensitive predicate over a [`StringColumn`].
///
/// The filter value is lower-cased on construction and the tested text is lower-cased on
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringFilter {
    column: Column,
    match_type: StringMatch,
    value: String,
}

impl StringFilter {
    /// The column the filter is bound to.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// How the text is compared against the value.
    pub fn match_type(&self) -> StringMatch {
        self.match_type
    }

    /// The lower-cased filter value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether `text` satisfies the filter, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        match self.match_type {
            StringMatch::Is => text == self.value,
            StringMatch::StartsWith => text.starts_with(&self.value),
            StringMatch::EndsWith => text.ends_with(&self.value),
            StringMatch::Contains => text.contains(&self.value),
        }
    }
}

impl Display for StringFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StringFilter[column={}, matchType={}, value={}]",
            self.column, self.match_type, self.value
        )
    }
}

/// Builds [`StringFilter`]s for one column.
#[derive(Debug, Clone)]
pub struct StringFilterBuilder {
    column: Column,
}

impl StringFilterBuilder {
    pub(crate) fn new(column: &StringColumn) -> Self {
        Self {
            column: column.into(),
        }
    }

    fn build(self, match_type: StringMatch, value: &str) -> StringFilter {
        StringFilter {
            column: self.column,
            match_type,
            value: value.to_lowercase(),
        }
    }

    /// Match text equal to `value`.
    pub fn is(self, value: &str) -> StringFilter {
        self.build(StringMatch::Is, value)
    }

    /// Match text starting with `value`.
    pub fn starts_with(self, value: &str) -> StringFilter {
        self.build(StringMatch::StartsWith, value)
    }

    /// Match text ending with `value`.
    pub fn ends_with(self, value: &str) -> StringFilter {
        self.build(StringMatch::EndsWith, value)
    }

    /// Match text containing `value`.
    pub fn contains(self, value: &str) -> StringFilter {
        self.build(StringMatch::Contains, value)
    }
}
