use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};
use colstore_dtype::{Column, ColumnType};

/// The Arrow type values of `column_type` are stored as.
pub fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Double => DataType::Float64,
        ColumnType::Id => DataType::Binary,
        ColumnType::Long => DataType::Int64,
        ColumnType::String => DataType::Utf8,
    }
}

/// The column type stored as `data_type`, if any.
pub fn column_type_of(data_type: &DataType) -> Option<ColumnType> {
    match data_type {
        DataType::Boolean => Some(ColumnType::Boolean),
        DataType::Float64 => Some(ColumnType::Double),
        DataType::Binary => Some(ColumnType::Id),
        DataType::Int64 => Some(ColumnType::Long),
        DataType::Utf8 => Some(ColumnType::String),
        _ => None,
    }
}

/// A schema with one nullable field per column, in the given order.
pub fn schema_of<'a>(columns: impl IntoIterator<Item = &'a Column>) -> SchemaRef {
    Arc::new(Schema::new(
        columns
            .into_iter()
            .map(|column| Field::new(column.name(), arrow_type(column.column_type()), true))
            .collect::<Vec<_>>(),
    ))
}
