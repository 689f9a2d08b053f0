use std::fmt::{Display, Formatter};

/// The value type of a [`crate::Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnType {
    /// A true/false flag
    Boolean,
    /// A 64-bit IEEE-754 float
    Double,
    /// An opaque identifier stored as raw bytes
    Id,
    /// A 64-bit signed integer
    Long,
    /// UTF-8 text
    String,
}

impl ColumnType {
    /// Every column type, in declaration order.
    pub const ALL: [ColumnType; 5] = [
        ColumnType::Boolean,
        ColumnType::Double,
        ColumnType::Id,
        ColumnType::Long,
        ColumnType::String,
    ];

    /// The upper-case name of the type, as used in error messages and on-disk layouts.
    pub const fn name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Double => "DOUBLE",
            ColumnType::Id => "ID",
            ColumnType::Long => "LONG",
            ColumnType::String => "STRING",
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ColumnType::Boolean, "BOOLEAN")]
    #[case(ColumnType::Double, "DOUBLE")]
    #[case(ColumnType::Id, "ID")]
    #[case(ColumnType::Long, "LONG")]
    #[case(ColumnType::String, "STRING")]
    fn displays_upper_case(#[case] column_type: ColumnType, #[case] expected: &str) {
        assert_eq!(column_type.to_string(), expected);
    }
}
