use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use colstore_dtype::{Column, ColumnType};
use colstore_error::{ColstoreResult, colstore_err};
use itertools::Itertools;

/// The file holding `column` within the dataset at `root`.
pub fn column_path(root: &Path, column: &Column) -> PathBuf {
    root.join(column.column_type().name()).join(column.name())
}

/// Every column stored in the dataset at `root`, grouped by type and sorted by name.
///
/// A missing type directory means the dataset has no column of that type.
pub fn list_columns(root: &Path) -> ColstoreResult<Vec<Column>> {
    let mut columns = Vec::new();
    for column_type in ColumnType::ALL {
        let entries = match fs::read_dir(root.join(column_type.name())) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        let names: Vec<String> = entries
            .map(|entry| {
                let entry = entry?;
                entry.file_name().into_string().map_err(|name| {
                    colstore_err!(
                        InvalidSerde: "Column file name {} is not valid UTF-8",
                        name.to_string_lossy()
                    )
                })
            })
            .try_collect()?;
        for name in names.into_iter().sorted() {
            columns.push(Column::new(&name, column_type)?);
        }
    }
    Ok(columns)
}
