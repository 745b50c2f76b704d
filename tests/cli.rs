mod common;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use csv_mapper::persistence::load_mappings;
use predicates::prelude::*;
use predicates::str::contains;

fn cli() -> Command {
    Command::cargo_bin("csv-mapper").expect("binary exists")
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn inspect_lists_columns_with_types() {
    let input = fixture_path("patients.csv");
    cli()
        .args(["inspect", "-i", path_arg(&input)])
        .assert()
        .success()
        .stdout(contains("Patient_ID").and(contains("datetime")).and(contains("Diaz, Jr")));
}

#[test]
fn tables_shows_csv_types_and_flags() {
    let schema = fixture_path("clinic_schema.json");
    cli()
        .args(["tables", "-s", path_arg(&schema)])
        .assert()
        .success()
        .stdout(
            contains("Patients (csvType: PatientStudy)")
                .and(contains("Physicians (csvType: Physician)"))
                .and(contains("SplitFirstToken, SplitLastToken")),
        );
}

#[test]
fn match_writes_mapping_file_and_validate_accepts_it() {
    let ws = TestWorkspace::new();
    let input = fixture_path("patients.csv");
    let schema = fixture_path("clinic_schema.json");
    let output = ws.file("mappings.json");

    cli()
        .args([
            "match",
            "-i",
            path_arg(&input),
            "-s",
            path_arg(&schema),
            "--csv-type",
            "PatientStudy",
            "-o",
            path_arg(&output),
        ])
        .assert()
        .success()
        .stdout(contains("Birth_Date").and(contains("unmapped")));

    let saved = load_mappings(&output);
    let patients = saved.get("PatientStudy").expect("saved csvType");
    assert_eq!(patients.table_name, "Patients");
    assert_eq!(patients.column_mappings.len(), 5);

    cli()
        .args([
            "validate",
            "-i",
            path_arg(&input),
            "-s",
            path_arg(&schema),
            "-m",
            path_arg(&output),
            "--csv-type",
            "PatientStudy",
        ])
        .assert()
        .success();
}

#[test]
fn match_upserts_into_existing_file() {
    let ws = TestWorkspace::new();
    let schema = fixture_path("clinic_schema.json");
    let output = ws.file("mappings.json");
    for (input, csv_type) in [
        ("patients.csv", "PatientStudy"),
        ("physicians.csv", "Physician"),
        ("patients.csv", "PatientStudy"),
    ] {
        cli()
            .args([
                "match",
                "-i",
                path_arg(&fixture_path(input)),
                "-s",
                path_arg(&schema),
                "--csv-type",
                csv_type,
                "-o",
                path_arg(&output),
            ])
            .assert()
            .success();
    }
    let saved = load_mappings(&output);
    assert_eq!(saved.len(), 2);
    assert!(saved.get("Physician").is_some());
}

#[test]
fn validate_fails_when_required_columns_are_missing() {
    let ws = TestWorkspace::new();
    let schema = fixture_path("clinic_schema.json");
    let mappings = ws.write(
        "mappings.json",
        r#"{"mappings":[{"tableName":"Patients","csvType":"PatientStudy","columnMappings":[
            {"csvColumn":"Patient_ID","dbColumn":"PatientId","isDerivedColumn":false}
        ]}]}"#,
    );
    cli()
        .args([
            "validate",
            "-i",
            path_arg(&fixture_path("patients.csv")),
            "-s",
            path_arg(&schema),
            "-m",
            path_arg(&mappings),
            "--csv-type",
            "PatientStudy",
        ])
        .assert()
        .failure()
        .stdout(contains("error   FirstName: This database column must be mapped"))
        .stderr(contains("error(s)"));
}

#[test]
fn preview_splits_physician_names() {
    cli()
        .args([
            "preview",
            "-i",
            path_arg(&fixture_path("physicians.csv")),
            "--column",
            "physicianname",
            "--transform",
            "SplitFirstToken",
            "--param",
            "Delimiter=, ",
        ])
        .assert()
        .success()
        .stdout(
            contains("original,transformed")
                .and(contains("\"Smith, John A\",Smith"))
                .and(contains("\"Jones, Mary\",Jones")),
        );
}

#[test]
fn preview_maps_categories() {
    cli()
        .args([
            "preview",
            "-i",
            path_arg(&fixture_path("patients.csv")),
            "--column",
            "Sex",
            "--transform",
            "CategoryMapping",
            "--map",
            "Female=F",
            "--map",
            "Male=M",
            "--default",
            "U",
        ])
        .assert()
        .success()
        .stdout(
            contains("Female,F")
                .and(contains("male,M"))
                .and(contains("F,F"))
                .and(contains("Other").not()),
        );
}

#[test]
fn preview_rejects_unknown_column_and_bad_parameters() {
    let input = fixture_path("patients.csv");
    cli()
        .args(["preview", "-i", path_arg(&input), "--column", "Nope", "--transform", "DateFormat"])
        .assert()
        .failure()
        .stderr(contains("Column 'Nope' not found"));
    cli()
        .args([
            "preview",
            "-i",
            path_arg(&input),
            "--column",
            "Birth_Date",
            "--transform",
            "DateFormat",
            "--param",
            "TargetFormat=yyyy 'open",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid date format string"));
}

#[test]
fn missing_input_reports_file_not_found() {
    cli()
        .args(["inspect", "-i", "definitely-missing.csv"])
        .assert()
        .failure()
        .stderr(contains("file not found"));
}
