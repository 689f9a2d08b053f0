use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colstore_dtype::{BooleanColumn, Column, DoubleColumn, IdColumn, LongColumn, StringColumn};
use colstore_error::{ColstoreError, ColstoreResult};
use colstore_expr::{Filter, Query};
use colstore_io::{Reader, Writer};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{CsvReader, CsvWriter, ScanOptions};

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

fn write_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("trips.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn trips(dir: &TempDir) -> PathBuf {
    let one = STANDARD.encode([1u8, 2]);
    let two = STANDARD.encode([3u8]);
    write_file(
        dir,
        &format!(
            "Driver_Id,Fare,Passengers,Shared,Pickup\n\
             {one},12.5,1,true,Midtown\n\
             {two},7.25,15,FALSE,Harlem\n\
             ,30,,,midtown east\n"
        ),
    )
}

fn read_passengers(reader: &mut CsvReader) -> ColstoreResult<Vec<Option<i64>>> {
    let mut out = Vec::new();
    while reader.has_next()? {
        reader.next()?;
        let column = reader.of(&passengers())?;
        out.push(if column.is_present()? {
            Some(column.get()?)
        } else {
            None
        });
    }
    Ok(out)
}

fn open(query: &Query) -> CsvReader {
    let mut reader = CsvReader::default();
    reader.query(query).unwrap();
    reader
}

#[rstest]
fn no_filters_return_every_record(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert_eq!(
        read_passengers(&mut reader).unwrap(),
        vec![Some(1), Some(15), None]
    );
    assert!(!reader.has_next().unwrap());
}

#[rstest]
fn typed_values_of_current_record(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select_all([
            Column::from(driver()),
            fare().into(),
            shared().into(),
            pickup().into(),
        ])
        .all_of()
        .unwrap();
    let mut reader = open(&query);

    reader.next().unwrap();
    assert_eq!(reader.of(&driver()).unwrap().get().unwrap().as_ref(), [1, 2]);
    assert_eq!(reader.of(&fare()).unwrap().get().unwrap(), 12.5);
    assert!(reader.of(&shared()).unwrap().get().unwrap());
    assert_eq!(reader.of(&pickup()).unwrap().get().unwrap(), "Midtown");

    reader.next().unwrap();
    assert!(!reader.of(&shared()).unwrap().get().unwrap());

    reader.next().unwrap();
    let id = reader.of(&driver()).unwrap();
    assert!(id.is_null().unwrap());
    assert!(matches!(id.get().unwrap_err(), ColstoreError::NullValue(..)));
    assert_eq!(reader.of(&fare()).unwrap().get().unwrap(), 30.0);
}

#[rstest]
fn between_filter_is_half_open(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .filter(Filter::where_long(&passengers()).is_between(1, 15).unwrap())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![Some(1)]);
}

#[rstest]
fn string_filters_ignore_case(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .filter(Filter::where_string(&pickup()).starts_with("MIDTOWN"))
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![Some(1), None]);
}

#[rstest]
fn id_filter_compares_encoded_text(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .filter(Filter::where_id(&driver()).is(vec![3u8]))
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![Some(15)]);
}

#[rstest]
fn combinators(dir: TempDir) {
    let source = trips(&dir);
    let builder = || {
        Query::from_source(&source)
            .select(passengers())
            .filter(Filter::where_boolean(&shared()).is(true))
            .filter(Filter::where_double(&fare()).is_greater_than(20.0))
    };

    let mut all = open(&builder().all_of().unwrap());
    assert!(read_passengers(&mut all).unwrap().is_empty());

    let mut any = open(&builder().at_least_one().unwrap());
    assert_eq!(read_passengers(&mut any).unwrap(), vec![Some(1), None]);
}

#[rstest]
fn small_scratch_spreads_matches_over_batches(dir: TempDir) {
    let mut contents = String::from("passengers,pickup\n");
    for i in 0..100 {
        contents.push_str(&format!("{i},zone {}\n", i % 7));
    }
    let path = write_file(&dir, &contents);
    let query = Query::from_source(&path)
        .select(passengers())
        .filter(Filter::where_string(&pickup()).is("zone 3"))
        .all_of()
        .unwrap();

    let mut reader = CsvReader::new(
        ScanOptions::default()
            .with_scratch_capacity(96)
            .with_read_batch_size(8),
    );
    reader.query(&query).unwrap();
    let expected = (0..100)
        .filter(|i| i % 7 == 3)
        .map(Some)
        .collect::<Vec<Option<i64>>>();
    assert_eq!(read_passengers(&mut reader).unwrap(), expected);
}

#[rstest]
fn has_next_is_idempotent_and_next_fails_at_end(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    for _ in 0..3 {
        assert!(reader.has_next().unwrap());
        assert!(reader.has_next().unwrap());
        reader.next().unwrap();
    }
    assert!(!reader.has_next().unwrap());
    assert!(matches!(
        reader.next().unwrap_err(),
        ColstoreError::NoMoreRecords
    ));
}

#[rstest]
fn unselected_column_is_not_found(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    reader.next().unwrap();
    let err = reader.of(&fare()).unwrap_err();
    assert_eq!(err.to_string(), "Column fare of type DOUBLE not found");
}

#[rstest]
fn filter_on_missing_field_is_not_found(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .filter(Filter::where_long(&Column::for_long("tolls").unwrap()).is_less_than(3))
        .all_of()
        .unwrap();
    let err = CsvReader::default().query(&query).unwrap_err();
    assert!(matches!(err, ColstoreError::NoSuchColumn { .. }));
}

#[rstest]
#[case("many")]
#[case(" 4")]
fn unparsable_text_is_invalid_serde(dir: TempDir, #[case] text: &str) {
    let path = write_file(&dir, &format!("passengers\n{text}\n"));
    let query = Query::from_source(&path)
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    reader.next().unwrap();
    let err = reader.of(&passengers()).unwrap().get().unwrap_err();
    assert!(matches!(err, ColstoreError::InvalidSerde(..)));
}

#[rstest]
fn oversize_record_is_invalid_state(dir: TempDir) {
    let path = write_file(&dir, &format!("pickup\n{}\n", "x".repeat(64)));
    let query = Query::from_source(&path).select(pickup()).all_of().unwrap();
    let err = CsvReader::new(ScanOptions::default().with_scratch_capacity(32))
        .query(&query)
        .unwrap_err();
    assert!(matches!(err, ColstoreError::InvalidState(..)));
}

#[rstest]
fn requery_restarts_from_the_top(dir: TempDir) {
    let query = Query::from_source(trips(&dir))
        .select(passengers())
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    reader.next().unwrap();
    reader.query(&query).unwrap();
    assert_eq!(read_passengers(&mut reader).unwrap().len(), 3);
    reader.close().unwrap();
    assert!(!reader.has_next().unwrap());
}

fn header_only(dir: &TempDir) -> PathBuf {
    // No trailing newline: the writer has to add one before appending.
    write_file(dir, "pickup,passengers,fare,shared,driver_id")
}

fn read_pickups(path: &Path) -> Vec<Option<String>> {
    let query = Query::from_source(path).select(pickup()).all_of().unwrap();
    let mut reader = open(&query);
    let mut out = Vec::new();
    while reader.has_next().unwrap() {
        reader.next().unwrap();
        let column = reader.of(&pickup()).unwrap();
        out.push(if column.is_present().unwrap() {
            Some(column.get().unwrap().into_owned())
        } else {
            None
        });
    }
    out
}

#[rstest]
fn writer_round_trip_with_escapes(dir: TempDir) {
    let path = header_only(&dir);
    let mut writer = CsvWriter::try_new(&path).unwrap();

    writer.of(&pickup()).unwrap().write("Penn Station, gate\t4\nnorth").unwrap();
    writer.of(&passengers()).unwrap().write(2i64).unwrap();
    writer.of(&fare()).unwrap().write(9.5).unwrap();
    writer.of(&shared()).unwrap().write(true).unwrap();
    writer.of(&driver()).unwrap().write(vec![7u8, 8, 9]).unwrap();
    writer.next().unwrap();

    writer.of(&passengers()).unwrap().write(4i64).unwrap();
    writer.next().unwrap();
    assert_eq!(writer.staged(), 2);
    writer.close().unwrap();
    assert_eq!(writer.staged(), 0);

    assert_eq!(
        read_pickups(&path),
        vec![Some("Penn Station, gate\t4\nnorth".to_string()), None]
    );

    let query = Query::from_source(&path)
        .select_all([Column::from(driver()), shared().into(), passengers().into()])
        .all_of()
        .unwrap();
    let mut reader = open(&query);
    reader.next().unwrap();
    assert_eq!(reader.of(&driver()).unwrap().get().unwrap().as_ref(), [7, 8, 9]);
    assert!(reader.of(&shared()).unwrap().get().unwrap());
    assert_eq!(read_passengers(&mut reader).unwrap(), vec![Some(4)]);
}

#[rstest]
fn writer_appends_across_flushes(dir: TempDir) {
    let path = header_only(&dir);
    let mut writer = CsvWriter::try_new(&path).unwrap();
    writer.of(&pickup()).unwrap().write("a").unwrap();
    writer.next().unwrap();
    writer.flush().unwrap();
    writer.of(&pickup()).unwrap().write("b").unwrap();
    writer.next().unwrap();
    writer.close().unwrap();

    assert_eq!(
        read_pickups(&path),
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[rstest]
fn writer_rejects_unknown_columns(dir: TempDir) {
    let path = header_only(&dir);
    let mut writer = CsvWriter::try_new(&path).unwrap();
    let tolls = Column::for_long("tolls").unwrap();
    assert!(matches!(
        writer.of(&tolls).unwrap_err(),
        ColstoreError::NoSuchColumn { .. }
    ));
}
