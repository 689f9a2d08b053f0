use std::path::{Path, PathBuf};

use colstore_dtype::{BooleanColumn, Column, DoubleColumn, IdColumn, LongColumn, StringColumn};
use colstore_error::{ColstoreError, ColstoreResult};
use colstore_expr::{Filter, Query};
use colstore_io::{Reader, Writer};
use parquet::basic::Compression;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{ParquetReadOptions, ParquetReader, ParquetWriteOptions, ParquetWriter};

#[fixture]
fn dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn driver() -> IdColumn {
    Column::for_id("driver_id").unwrap()
}

fn fare() -> DoubleColumn {
    Column::for_double("fare").unwrap()
}

fn passengers() -> LongColumn {
    Column::for_long("passengers").unwrap()
}

fn shared() -> BooleanColumn {
    Column::for_boolean("shared").unwrap()
}

fn pickup() -> StringColumn {
    Column::for_string("pickup").unwrap()
}

fn all_columns() -> Vec<Column> {
    vec![
        driver().into(),
        fare().into(),
        passengers().into(),
        shared().into(),
        pickup().into(),
    ]
}

/// Writes `count` records; every third record has no pickup.
fn write_trips(path: &Path, count: i64, options: ParquetWriteOptions) {
    let mut writer = ParquetWriter::try_new(path, all_columns(), options).unwrap();
    for i in 0..count {
        writer.of(&driver()).unwrap().write(i.to_be_bytes().to_vec()).unwrap();
        writer.of(&fare()).unwrap().write(i as f64 * 1.5).unwrap();
        writer.of(&passengers()).unwrap().write(i).unwrap();
        writer.of(&shared()).unwrap().write(i % 2 == 0).unwrap();
        if i % 3 != 0 {
            writer
                .of(&pickup())
                .unwrap()
                .write(format!("Zone {}", i % 4))
                .unwrap();
        }
        writer.next().unwrap();
    }
    writer.close().unwrap();
}

fn trips(dir: &TempDir, count: i64) -> PathBuf {
    let path = dir.path().join("trips.parquet");
    write_trips(&path, count, ParquetWriteOptions::default());
    path
}

fn read_passengers(reader: &mut ParquetReader) -> ColstoreResult<Vec<i64>> {
    let mut out = Vec::new();
    while reader.has_next()? {
        reader.next()?;
        out.push(reader.of(&passengers())?.get()?);
    }
    Ok(out)
}

fn open(query: &Query) -> ParquetReader {
    let mut reader = ParquetReader::new();
    reader.query(query).unwrap();
    reader
}

#[rstest]
fn round_trip_every_type(dir: TempDir) {
    let path = trips(&dir, 4);
    let query = Query::from_source(&path)
        .select_all(all_columns())
        .all_of()
        .unwrap();
    let mut reader = open(&query);

    reader.next().unwrap();
    assert_eq!(
        reader.of(&driver()).unwrap().get().unwrap().as_ref(),
        0i64.to_be_bytes()
    );
    assert!(reader.of(&shared()).unwrap().get().unwrap());
    assert!(reader.of(&pickup()).unwrap().is_null().unwrap());
    assert!(matches!(
        reader.of(&pickup()).unwrap().get().unwrap_err(),
        ColstoreError::NullValue(..)
    ));

    reader.next().unwrap();
    assert_eq!(reader.of(&fare()).unwrap().get().unwrap(), 1.5);
    assert_eq!(reader.of(&pickup()).unwrap().get().unwrap(), "Zone 1");
    assert!(!reader.of(&shared()).unwrap().get().unwrap());

    assert_eq!(read_passengers(&mut reader).unwrap(), vec![2, 3]);
    assert!(matches!(
        reader.next().unwrap_err(),
        ColstoreError::NoMoreRecords
    ));
}

#[rstest]
fn filters_span_batches_and_row_groups(dir: TempDir) {
    let path = dir.path().join("trips.parquet");
    write_trips(
        &path,
        1000,
        ParquetWriteOptions::default()
            .with_max_row_group_size(128)
            .with_record_batch_size(100)
            .with_compression(Compression::UNCOMPRESSED),
    );
    let query = Query::from_source(&path)
        .filter(Filter::where_long(&passengers()).is_between(250, 260).unwrap())
        .filter(Filter::where_string(&pickup()).is("ZONE 2"))
        .all_of()
        .unwrap();
    let mut reader = ParquetReader::with_options(ParquetReadOptions::default().with_batch_size(7));
    reader.query(&query).unwrap();
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![250, 254]);
}

#[rstest]
fn nulls_never_match(dir: TempDir) {
    let path = trips(&dir, 7);
    let query = Query::from_source(&path)
        .select(passengers())
        .filter(Filter::where_string(&pickup()).contains("zone"))
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![1, 2, 4, 5]);
}

#[rstest]
fn at_least_one_filter(dir: TempDir) {
    let path = trips(&dir, 10);
    let query = Query::from_source(&path)
        .filter(Filter::where_id(&driver()).is(3i64.to_be_bytes().to_vec()))
        .filter(Filter::where_double(&fare()).is_greater_than(12.0))
        .filter(Filter::where_boolean(&shared()).is(false))
        .at_least_one()
        .unwrap();
    let mut reader = open(&query);
    let mut seen = Vec::new();
    while reader.has_next().unwrap() {
        reader.next().unwrap();
        seen.push(reader.of(&fare()).unwrap().get().unwrap());
    }
    assert_eq!(seen, vec![1.5, 4.5, 7.5, 10.5, 13.5]);
}

#[rstest]
fn has_next_is_idempotent(dir: TempDir) {
    let path = trips(&dir, 2);
    let query = Query::from_source(&path)
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert!(reader.has_next().unwrap());
    assert!(reader.has_next().unwrap());
    reader.next().unwrap();
    reader.next().unwrap();
    assert!(!reader.has_next().unwrap());
    assert!(!reader.has_next().unwrap());
}

#[rstest]
fn unselected_column_is_not_found(dir: TempDir) {
    let path = trips(&dir, 2);
    let query = Query::from_source(&path)
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    reader.next().unwrap();
    assert_eq!(
        reader.of(&fare()).unwrap_err().to_string(),
        "Column fare of type DOUBLE not found"
    );
}

#[rstest]
fn missing_or_mistyped_column_fails_the_query(dir: TempDir) {
    let path = trips(&dir, 2);
    for column in [
        Column::for_long("tolls").unwrap(),
        Column::for_long("pickup").unwrap(),
    ] {
        let query = Query::from_source(&path).select(column).all_of().unwrap();
        assert!(matches!(
            ParquetReader::new().query(&query).unwrap_err(),
            ColstoreError::NoSuchColumn { .. }
        ));
    }
}

#[rstest]
fn reading_before_next_is_invalid_state(dir: TempDir) {
    let path = trips(&dir, 2);
    let query = Query::from_source(&path)
        .select(passengers())
        .all_of()
        .unwrap();
    let reader = open(&query);
    assert!(matches!(
        reader.of(&passengers()).unwrap().get().unwrap_err(),
        ColstoreError::InvalidState(..)
    ));
}

#[rstest]
fn writer_rejects_undeclared_columns(dir: TempDir) {
    let path = dir.path().join("trips.parquet");
    let mut writer =
        ParquetWriter::try_new(&path, [passengers()], ParquetWriteOptions::default()).unwrap();
    assert!(matches!(
        writer.of(&fare()).unwrap_err(),
        ColstoreError::NoSuchColumn { .. }
    ));
    writer.close().unwrap();
    writer.close().unwrap();
    assert!(matches!(
        writer.next().unwrap_err(),
        ColstoreError::InvalidState(..)
    ));
}

#[rstest]
fn writer_rejects_bad_declarations(dir: TempDir) {
    let path = dir.path().join("trips.parquet");
    let none: [Column; 0] = [];
    assert!(matches!(
        ParquetWriter::try_new(&path, none, ParquetWriteOptions::default()),
        Err(ColstoreError::InvalidArgument(..))
    ));
    let twice = [
        Column::for_long("x").unwrap().into(),
        Column::from(Column::for_string("X").unwrap()),
    ];
    assert!(matches!(
        ParquetWriter::try_new(&path, twice, ParquetWriteOptions::default()),
        Err(ColstoreError::InvalidArgument(..))
    ));
}

#[rstest]
fn writer_refuses_existing_file(dir: TempDir) {
    let path = trips(&dir, 1);
    assert!(matches!(
        ParquetWriter::try_new(&path, [passengers()], ParquetWriteOptions::default()),
        Err(ColstoreError::InvalidState(..))
    ));
}
