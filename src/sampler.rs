//! CSV sampling: header discovery, a handful of sample rows per column and a
//! type inferred from those samples.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, Result},
    inference::{TypeTag, infer_type},
    io_utils,
};

pub const MAX_SAMPLE_ROWS: usize = 5;

/// A column discovered in a CSV header together with its sampled values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvColumn {
    pub name: String,
    pub index: usize,
    pub sample_values: Vec<String>,
    pub inferred_type: TypeTag,
}

impl CsvColumn {
    pub fn new(name: impl Into<String>, index: usize, sample_values: Vec<String>) -> Self {
        let inferred_type = infer_type(&sample_values);
        Self {
            name: name.into(),
            index,
            sample_values,
            inferred_type,
        }
    }

    /// Always `false` for columns read from a file; see [`DerivedColumn`](crate::transform::DerivedColumn).
    pub fn is_virtual(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SampleOptions {
    pub max_rows: usize,
    pub encoding: &'static Encoding,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            max_rows: MAX_SAMPLE_ROWS,
            encoding: UTF_8,
        }
    }
}

pub fn parse_csv_file(path: &Path) -> Result<Vec<CsvColumn>> {
    parse_csv_file_with(path, &SampleOptions::default())
}

pub fn parse_csv_file_with(path: &Path, options: &SampleOptions) -> Result<Vec<CsvColumn>> {
    let mut reader = io_utils::open_text_reader(path, options.encoding)?;
    let mut line = String::new();

    let header = match io_utils::read_line(&mut reader, &mut line)
        .map_err(|err| MapperError::io(path, err))?
    {
        Some(()) if !line.trim().is_empty() => line.clone(),
        _ => {
            return Err(MapperError::EmptyFile {
                path: path.to_path_buf(),
            });
        }
    };
    let names = header
        .split(',')
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();
    let mut samples = vec![Vec::new(); names.len()];

    let mut rows = 0usize;
    while rows < options.max_rows {
        let read = io_utils::read_line(&mut reader, &mut line)
            .map_err(|err| MapperError::io(path, err))?;
        match read {
            None => break,
            Some(()) if line.trim().is_empty() => continue,
            Some(()) => {}
        }
        for (column, value) in samples.iter_mut().zip(split_csv_line(&line)) {
            column.push(value.trim().to_string());
        }
        rows += 1;
    }

    debug!(
        "Sampled {} row(s) across {} column(s) from {:?}",
        rows,
        names.len(),
        path
    );
    Ok(names
        .into_iter()
        .zip(samples)
        .enumerate()
        .map(|(index, (name, values))| CsvColumn::new(name, index, values))
        .collect())
}

/// Splits one CSV line on commas outside double quotes. Quote characters
/// toggle the quoted state and are not copied into the field.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_quoted_commas() {
        assert_eq!(
            split_csv_line(r#"1,"Smith, John A",2024-01-01"#),
            vec!["1", "Smith, John A", "2024-01-01"]
        );
    }

    #[test]
    fn split_strips_quotes_anywhere_in_field() {
        assert_eq!(split_csv_line(r#"a"b"c,"","#), vec!["abc", "", ""]);
    }

    #[test]
    fn split_keeps_unterminated_quote_as_single_field() {
        assert_eq!(
            split_csv_line(r#"x,"open, still open"#),
            vec!["x", "open, still open"]
        );
    }

    #[test]
    fn new_column_infers_type_from_samples() {
        let column = CsvColumn::new("Age", 2, vec!["31".into(), "".into(), "47".into()]);
        assert_eq!(column.inferred_type, TypeTag::Int);
        assert!(!column.is_virtual());
    }
}
