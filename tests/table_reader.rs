mod common;

use std::fs;

use common::{index_bytes, varuint, Cell, TableBuilder};
use fgdb_tools_rs::io::gdb::table_readers::TableReader;
use fgdb_tools_rs::{CatalogError, FieldType, GdbReaderConfiguration, GeometryType, Value};

fn fields() -> Vec<(&'static str, FieldType)> {
    vec![
        ("OBJECTID", FieldType::ObjectId),
        ("Code", FieldType::ShortInt),
        ("Name", FieldType::Text),
        ("Comment", FieldType::Text),
        ("Area", FieldType::Float64),
    ]
}

fn row(i: i16) -> Vec<Cell> {
    vec![
        Cell::Null,
        Cell::Int16(i),
        Cell::Text(format!("row {}", i)),
        Cell::Null,
        Cell::Float64(f64::from(i) * 1.5),
    ]
}

fn open(dir: &tempfile::TempDir, number: u32) -> TableReader {
    let path = dir.path().join(format!("a{:08x}.gdbtable", number));
    TableReader::open(path, &GdbReaderConfiguration::default()).unwrap()
}

fn object_ids(table: &TableReader) -> Vec<i64> {
    table
        .records()
        .unwrap()
        .map(|r| r.unwrap().object_id)
        .collect()
}

#[test]
fn reads_header_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .geometry_code(1)
        .row(row(1))
        .write(dir.path(), 9, true);

    let table = open(&dir, 9);
    assert_eq!(table.header().record_count, 1);
    assert_eq!(table.header().geometry_type, GeometryType::Point);
    assert_eq!(table.fields().len(), 5);
    assert_eq!(table.fields()[2].name, "Name");
    assert_eq!(table.fields()[2].max_width, Some(255));
    assert_eq!(table.field_index("area"), Some(4));
    assert_eq!(table.name(), "a00000009.gdbtable");
    assert!(table.uses_index());
}

#[test]
fn absent_field_decodes_as_null() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(4))
        .write(dir.path(), 9, true);

    let record = open(&dir, 9).records().unwrap().next().unwrap().unwrap();
    assert_eq!(record.object_id, 1);
    assert_eq!(record.values[0], Value::ObjectId(1));
    assert_eq!(record.values[1], Value::Int16(4));
    assert_eq!(record.values[2], Value::Text("row 4".into()));
    assert_eq!(record.values[3], Value::Null(FieldType::Text));
    assert_eq!(record.values[4], Value::Float64(6.0));
}

#[test]
fn deleted_rows_keep_numbering() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(1))
        .deleted(12)
        .row(row(3))
        .write(dir.path(), 9, true);

    let indexed = open(&dir, 9);
    assert!(indexed.uses_index());
    assert_eq!(object_ids(&indexed), vec![1, 3]);

    let configuration = GdbReaderConfiguration {
        use_index: false,
        ..GdbReaderConfiguration::default()
    };
    let path = dir.path().join("a00000009.gdbtable");
    let linear = TableReader::open(path, &configuration).unwrap();
    assert!(!linear.uses_index());
    assert_eq!(object_ids(&linear), vec![1, 3]);
}

#[test]
fn index_disagreeing_with_header_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = TableBuilder::new(&fields());
    for i in 1..=12 {
        builder = builder.row(row(i));
    }
    builder.write(dir.path(), 9, false);
    let (_, offsets) = builder.build();
    fs::write(dir.path().join("a00000009.gdbtablx"), index_bytes(&offsets[..10])).unwrap();

    let table = open(&dir, 9);
    assert!(!table.uses_index());
    let records: Vec<_> = table.records().unwrap().map(Result::unwrap).collect();
    assert_eq!(records.len(), 12);
    assert_eq!(records[11].values[1], Value::Int16(12));
}

#[test]
fn corrupt_index_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(1))
        .row(row(2))
        .write(dir.path(), 9, false);
    fs::write(dir.path().join("a00000009.gdbtablx"), [3u8, 0, 0]).unwrap();

    let table = open(&dir, 9);
    assert!(!table.uses_index());
    assert_eq!(object_ids(&table), vec![1, 2]);
}

#[test]
fn unknown_magic_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .magic(0x1234)
        .row(row(1))
        .write(dir.path(), 9, false);

    let path = dir.path().join("a00000009.gdbtable");
    let err = TableReader::open(path, &GdbReaderConfiguration::default()).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("unknown table magic"));
}

#[test]
fn bad_record_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let short = vec![0b0000_0010, 0];
    let mut truncated_text = vec![0b0000_0100];
    varuint(50, &mut truncated_text);
    truncated_text.push(b'a');

    TableBuilder::new(&fields())
        .row(row(1))
        .raw(short)
        .raw(truncated_text)
        .row(row(4))
        .write(dir.path(), 9, true);

    let results: Vec<_> = open(&dir, 9).records().unwrap().collect();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().object_id, 1);
    assert_eq!(results[3].as_ref().unwrap().object_id, 4);

    let err = results[2].as_ref().unwrap_err();
    assert!(err.is_format());
    let message = err.to_string();
    assert!(message.contains("a00000009.gdbtable"));
    assert!(message.contains("record 3"));
    assert!(message.contains("'Name'"));
    assert!(results[1].is_err());
}

#[test]
fn bogus_length_ends_linear_scan() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(1))
        .bogus(1_000_000)
        .row(row(3))
        .record_count(2)
        .write(dir.path(), 9, false);

    let results: Vec<_> = open(&dir, 9).records().unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(CatalogError::Format(_))));
}

#[test]
fn scans_are_restartable() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = TableBuilder::new(&fields());
    for i in 1..=5 {
        builder = builder.row(row(i));
    }
    builder.write(dir.path(), 9, false);

    let table = open(&dir, 9);
    let mut scan = table.records().unwrap();
    assert_eq!(scan.next().unwrap().unwrap().object_id, 1);
    drop(scan);

    let first_two: Vec<_> = table.records().unwrap().take(2).map(|r| r.unwrap().object_id).collect();
    assert_eq!(first_two, vec![1, 2]);
    assert_eq!(object_ids(&table), vec![1, 2, 3, 4, 5]);
}

#[test]
fn utf16_text_tables() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .version(3)
        .row(vec![
            Cell::Null,
            Cell::Int16(1),
            Cell::text("Straße"),
            Cell::text("日本"),
            Cell::Null,
        ])
        .write(dir.path(), 9, true);

    let record = open(&dir, 9).records().unwrap().next().unwrap().unwrap();
    assert_eq!(record.values[2].as_str(), Some("Straße"));
    assert_eq!(record.values[3].as_str(), Some("日本"));
    assert!(record.values[4].is_null());
}

#[test]
fn oversized_record_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(1))
        .write(dir.path(), 9, false);

    let configuration = GdbReaderConfiguration {
        max_record_size: 4,
        ..GdbReaderConfiguration::default()
    };
    let table = TableReader::open(dir.path().join("a00000009.gdbtable"), &configuration).unwrap();
    let err = table.records().unwrap().next().unwrap().unwrap_err();
    assert!(err.to_string().contains("limit is 4"));
}

#[test]
fn missing_records_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .row(row(1))
        .row(row(2))
        .record_count(3)
        .write(dir.path(), 9, false);

    let table = open(&dir, 9);
    assert!(!table.uses_index());
    let results: Vec<_> = table.records().unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok() && results[1].is_ok());

    let err = results[2].as_ref().unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("header declares 3 records, file holds 2"));
}

#[test]
fn utf8_text_is_still_readable() {
    let dir = tempfile::tempdir().unwrap();
    TableBuilder::new(&fields())
        .utf8_text()
        // odd byte lengths, so neither value can be UTF-16
        .row(vec![
            Cell::Null,
            Cell::Int16(1),
            Cell::text("Straße"),
            Cell::text("abc"),
            Cell::Null,
        ])
        .write(dir.path(), 9, true);

    let record = open(&dir, 9).records().unwrap().next().unwrap().unwrap();
    assert_eq!(record.values[2].as_str(), Some("Straße"));
    assert_eq!(record.values[3].as_str(), Some("abc"));
}
