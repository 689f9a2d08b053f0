use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use colstore_dtype::Column;
use colstore_error::{ColstoreResult, colstore_bail};
use linked_hash_set::LinkedHashSet;

use crate::Filter;

/// How the results of a query's filters are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Combinator {
    /// Every filter must match.
    #[default]
    AllOf,
    /// At least one filter must match.
    AtLeastOne,
}

impl Combinator {
    /// Combine `predicate` over `filters`. An empty filter set matches under either combinator.
    pub fn evaluate<T, I, F>(&self, filters: I, mut predicate: F) -> bool
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> bool,
    {
        let mut filters = filters.into_iter().peekable();
        if filters.peek().is_none() {
            return true;
        }
        match self {
            Combinator::AllOf => filters.all(predicate),
            Combinator::AtLeastOne => filters.any(&mut predicate),
        }
    }
}

impl Display for Combinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Combinator::AllOf => "ALL_OF",
            Combinator::AtLeastOne => "AT_LEAST_ONE",
        })
    }
}

/// A column selection, a set of filters and a combinator, targeting one physical source.
#[derive(Debug, Clone)]
pub struct Query {
    source: PathBuf,
    columns: LinkedHashSet<Column>,
    filters: Vec<Filter>,
    combinator: Combinator,
}

impl Query {
    /// Start building a query over `source`.
    pub fn from_source(source: impl Into<PathBuf>) -> QueryBuilder {
        QueryBuilder {
            source: source.into(),
            columns: LinkedHashSet::new(),
            filters: Vec::new(),
        }
    }

    /// The location of the data the query reads.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The selected columns, in selection order. Never empty.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// The number of selected columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The filters, in the order they were added.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// How filter results are combined.
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Whether `column` is part of the selection.
    pub fn contains(&self, column: &Column) -> bool {
        self.columns.contains(column)
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query[source={}, columns=[", self.source.display())?;
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(column, f)?;
        }
        f.write_str("], filters=[")?;
        for (idx, filter) in self.filters.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(filter, f)?;
        }
        write!(f, "], combinator={}]", self.combinator)
    }
}

/// Accumulates the selection and filters of a [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    source: PathBuf,
    columns: LinkedHashSet<Column>,
    filters: Vec<Filter>,
}

impl QueryBuilder {
    /// Add a column to the selection.
    pub fn select(mut self, column: impl Into<Column>) -> Self {
        self.add_column(column.into());
        self
    }

    /// Add several columns to the selection.
    pub fn select_all<C: Into<Column>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        for column in columns {
            self.add_column(column.into());
        }
        self
    }

    /// Add a filter, selecting its column as well.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        let filter = filter.into();
        self.add_column(filter.column().clone());
        self.filters.push(filter);
        self
    }

    /// Finish the query, requiring every filter to match.
    pub fn all_of(self) -> ColstoreResult<Query> {
        self.build(Combinator::AllOf)
    }

    /// Finish the query, requiring at least one filter to match.
    pub fn at_least_one(self) -> ColstoreResult<Query> {
        self.build(Combinator::AtLeastOne)
    }

    /// Finish the query with the given combinator.
    ///
    /// Fails with `InvalidArgument` when no column is selected.
    pub fn build(self, combinator: Combinator) -> ColstoreResult<Query> {
        if self.columns.is_empty() {
            colstore_bail!("At least one column has to be selected");
        }
        Ok(Query {
            source: self.source,
            columns: self.columns,
            filters: self.filters,
            combinator,
        })
    }

    fn add_column(&mut self, column: Column) {
        if !self.columns.contains(&column) {
            self.columns.insert(column);
        }
    }
}

#[cfg(test)]
mod tests {
    use colstore_dtype::ColumnType;
    use colstore_error::ColstoreError;
    use itertools::Itertools;

    use super::*;

    #[test]
    fn empty_selection_fails() {
        for result in [
            Query::from_source("trips").all_of(),
            Query::from_source("trips").at_least_one(),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, ColstoreError::InvalidArgument(..)));
            assert_eq!(err.message(), "At least one column has to be selected");
        }
    }

    #[test]
    fn filters_select_their_columns() {
        let fare = Column::for_double("fare").unwrap();
        let vendor = Column::for_string("vendor").unwrap();
        let query = Query::from_source("trips")
            .select(&vendor)
            .filter(Filter::where_double(&fare).is_greater_than(1.0))
            .filter(Filter::where_double(&fare).is_less_than(9.0))
            .at_least_one()
            .unwrap();

        assert_eq!(query.column_count(), 2);
        assert!(query.contains(&fare));
        assert_eq!(
            query.columns().map(Column::name).collect_vec(),
            vec!["vendor", "fare"]
        );
        assert_eq!(query.filters().len(), 2);
        assert_eq!(query.combinator(), Combinator::AtLeastOne);
        assert_eq!(query.source(), Path::new("trips"));
    }

    #[test]
    fn selection_is_a_set() {
        let query = Query::from_source("trips")
            .select(Column::new("Fare", ColumnType::Double).unwrap())
            .select(Column::new("fare", ColumnType::Double).unwrap())
            .select(Column::new("fare", ColumnType::Long).unwrap())
            .all_of()
            .unwrap();
        assert_eq!(query.column_count(), 2);
    }

    #[test]
    fn empty_filters_match_everything() {
        let none: Vec<Filter> = Vec::new();
        assert!(Combinator::AllOf.evaluate(&none, |_| false));
        assert!(Combinator::AtLeastOne.evaluate(&none, |_| false));
    }

    #[test]
    fn combinators() {
        let trip_time = Column::for_long("trip_time").unwrap();
        let filters = vec![
            Filter::from(Filter::where_long(&trip_time).is_greater_than(5)),
            Filter::from(Filter::where_long(&trip_time).is_less_than(10)),
        ];
        let eval = |value: i64| {
            move |filter: &Filter| filter.matches_text(&value.to_string())
        };
        assert!(Combinator::AllOf.evaluate(&filters, eval(7)));
        assert!(!Combinator::AllOf.evaluate(&filters, eval(12)));
        assert!(Combinator::AtLeastOne.evaluate(&filters, eval(12)));
    }
}
