mod common;

use common::{TestWorkspace, fixture_path};
use csv_mapper::{
    MapperError,
    inference::TypeTag,
    parse_csv_file,
    sampler::{SampleOptions, parse_csv_file_with},
};

#[test]
fn samples_fixture_and_infers_types() {
    let columns = parse_csv_file(&fixture_path("patients.csv")).expect("parse fixture");
    let names = columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Patient_ID", "First Name", "Last-Name", "Birth_Date", "Sex", "Weight"]
    );
    let types = columns.iter().map(|c| c.inferred_type).collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            TypeTag::Int,
            TypeTag::String,
            TypeTag::String,
            TypeTag::DateTime,
            TypeTag::String,
            TypeTag::Decimal,
        ]
    );
    assert!(columns.iter().all(|c| c.sample_values.len() == 5));
    assert_eq!(columns[1].sample_values[2], "Diaz, Jr");
    assert_eq!(columns[0].sample_values.last().map(String::as_str), Some("1005"));
    assert!(columns.iter().enumerate().all(|(idx, c)| c.index == idx));
}

#[test]
fn short_rows_leave_trailing_columns_with_fewer_samples() {
    let ws = TestWorkspace::new();
    let path = ws.write("short.csv", "A, B ,C\n1,2\n3,4,5,6\n");
    let columns = parse_csv_file(&path).unwrap();
    assert_eq!(columns[1].name, "B");
    assert_eq!(columns[0].sample_values, vec!["1", "3"]);
    assert_eq!(columns[2].sample_values, vec!["5"]);
}

#[test]
fn header_only_file_yields_string_columns() {
    let ws = TestWorkspace::new();
    let path = ws.write("header.csv", "Id,Name");
    let columns = parse_csv_file(&path).unwrap();
    assert_eq!(columns.len(), 2);
    assert!(columns.iter().all(|c| c.sample_values.is_empty()));
    assert!(columns.iter().all(|c| c.inferred_type == TypeTag::String));
}

#[test]
fn empty_file_is_rejected() {
    let ws = TestWorkspace::new();
    let path = ws.write("empty.csv", "");
    assert!(matches!(
        parse_csv_file(&path),
        Err(MapperError::EmptyFile { .. })
    ));
    let blank = ws.write("blank.csv", "   \r\n1,2\n");
    assert!(matches!(
        parse_csv_file(&blank),
        Err(MapperError::EmptyFile { .. })
    ));
}

#[test]
fn missing_file_is_reported() {
    let ws = TestWorkspace::new();
    let err = parse_csv_file(&ws.file("absent.csv")).unwrap_err();
    assert!(matches!(err, MapperError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn sample_limit_and_encoding_are_configurable() {
    let ws = TestWorkspace::new();
    let path = ws.file("latin1.csv");
    // "Name\nJosé\nZoë\n" in windows-1252
    std::fs::write(&path, b"Name\nJos\xe9\nZo\xeb\n").unwrap();
    let options = SampleOptions {
        max_rows: 1,
        encoding: encoding_rs::WINDOWS_1252,
    };
    let columns = parse_csv_file_with(&path, &options).unwrap();
    assert_eq!(columns[0].sample_values, vec!["José"]);
}

#[test]
fn utf8_bom_is_not_part_of_first_header() {
    let ws = TestWorkspace::new();
    let path = ws.file("bom.csv");
    std::fs::write(&path, "\u{feff}Id,Name\n1,Ann\n").unwrap();
    let columns = parse_csv_file(&path).unwrap();
    assert_eq!(columns[0].name, "Id");
}
