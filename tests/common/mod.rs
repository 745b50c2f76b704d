#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_mapper::{DatabaseColumn, DatabaseSchema, load_schema, sampler::CsvColumn};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn clinic_schema() -> DatabaseSchema {
    load_schema(&fixture_path("clinic_schema.json")).expect("load clinic schema")
}

/// Columns of the table bound to `csv_type` in the clinic schema.
pub fn clinic_columns(csv_type: &str) -> Vec<DatabaseColumn> {
    clinic_schema()
        .table_for_csv_type(csv_type)
        .expect("csvType present in fixture")
        .columns
        .clone()
}

pub fn column(name: &str, samples: &[&str]) -> CsvColumn {
    CsvColumn::new(name, 0, samples.iter().map(|s| s.to_string()).collect())
}

/// Scratch directory that is removed when dropped.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }
}
