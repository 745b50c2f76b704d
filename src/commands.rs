//! Command handlers behind the `csv-mapper` binary.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

use crate::{
    cli::{self, InspectArgs, MatchArgs, PreviewArgs, SampleArgs, TablesArgs, ValidateArgs},
    engine::{MappingEngine, ValidationReport},
    inference::{TypeTag, is_blank},
    io_utils,
    mapping::{MappingResult, ProposedMapping},
    persistence,
    sampler::{self, CsvColumn, SampleOptions},
    schema::{self, DatabaseSchema, SchemaTable},
    table,
    transform::{
        TransformParameters, TransformationKind,
        params::{CASE_SENSITIVE, DEFAULT_VALUE, MAPPINGS},
    },
};

pub fn inspect(args: &InspectArgs) -> Result<()> {
    let columns = sample(&args.sample)?;
    let rows = columns
        .iter()
        .map(|column| {
            vec![
                column.index.to_string(),
                column.name.clone(),
                describe_source(column),
                column.sample_values.join(" | "),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&["#", "Column", "Type", "Samples"], &rows);
    info!(
        "Inspected {} column(s) in {:?}",
        columns.len(),
        args.sample.input
    );
    Ok(())
}

pub fn tables(args: &TablesArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let engine = MappingEngine::default();
    println!("Database: {}", schema.database_name);
    for table_def in &schema.tables {
        println!();
        println!("{} (csvType: {})", table_def.table_name, table_def.csv_type);
        let rows = table_def
            .columns
            .iter()
            .map(|column| {
                let transforms = engine.available_transformations(column);
                vec![
                    column.name.clone(),
                    column.data_type.clone(),
                    yes_no(column.is_required).to_string(),
                    column
                        .max_length
                        .map_or_else(|| "-".to_string(), |len| len.to_string()),
                    yes_no(engine.can_transform(column)).to_string(),
                    if transforms.is_empty() {
                        "-".to_string()
                    } else {
                        transforms.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(", ")
                    },
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(
            &["Column", "Type", "Required", "Max length", "Transformable", "Offered"],
            &rows,
        );
    }
    Ok(())
}

pub fn match_columns(args: &MatchArgs) -> Result<()> {
    let columns = sample(&args.sample)?;
    let schema = load_schema(&args.schema)?;
    let target = select_table(&schema, args.table.as_deref(), args.csv_type.as_deref())?;
    let engine = MappingEngine::default();

    let selections = engine.propose(&columns, &target.columns);
    let report = engine.validate_mappings(&selections, &columns, &target.columns);
    print_report(target, &selections, &report);
    info!(
        "Matched {} of {} column(s) for table '{}'",
        selections.iter().filter(|s| s.is_mapped()).count(),
        target.columns.len(),
        target.table_name
    );

    if let Some(output) = &args.output {
        let result =
            MappingResult::from_selections(&target.table_name, &target.csv_type, &selections);
        let mut saved = persistence::load_mappings(output);
        saved.upsert(result);
        if !persistence::save_mappings(&saved, output) {
            bail!("Failed to write mappings to {output:?}");
        }
        info!("Mapping for csvType '{}' saved to {:?}", target.csv_type, output);
    }
    Ok(())
}

pub fn validate(args: &ValidateArgs) -> Result<()> {
    let columns = sample(&args.sample)?;
    let schema = load_schema(&args.schema)?;
    let saved = persistence::load_mappings(&args.mappings);
    let mapping = saved.get(&args.csv_type).ok_or_else(|| {
        anyhow!(
            "No saved mapping for csvType '{}' in {:?}",
            args.csv_type,
            args.mappings
        )
    })?;
    let target = schema
        .table(&mapping.table_name)
        .or_else(|| schema.table_for_csv_type(&args.csv_type))
        .ok_or_else(|| {
            anyhow!(
                "Table '{}' is not declared in {:?}",
                mapping.table_name,
                args.schema
            )
        })?;

    let engine = MappingEngine::default();
    let selections = engine.restore_selections(mapping, &columns, &target.columns);
    let report = engine.validate_mappings(&selections, &columns, &target.columns);
    print_report(target, &selections, &report);
    if !report.is_valid() {
        bail!(
            "Mapping for csvType '{}' has {} error(s)",
            args.csv_type,
            report.errors.len()
        );
    }
    info!("Mapping for csvType '{}' is valid", args.csv_type);
    Ok(())
}

pub fn preview(args: &PreviewArgs) -> Result<()> {
    let columns = sample(&args.sample)?;
    let source = columns
        .iter()
        .find(|column| column.name.eq_ignore_ascii_case(args.column.trim()))
        .ok_or_else(|| {
            anyhow!(
                "Column '{}' not found. Available columns: {}",
                args.column,
                columns
                    .iter()
                    .map(|column| column.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;
    let kind = args
        .transform
        .parse::<TransformationKind>()
        .map_err(|err| anyhow!(err))?;
    let params = preview_parameters(args)?;

    let engine = MappingEngine::default();
    engine
        .library()
        .validate_parameters(kind, &params)
        .with_context(|| format!("Preparing {kind} for column '{}'", source.name))?;
    info!(
        "{}: {}",
        source.name,
        engine.library().describe(kind, &params)?
    );

    let mut writer = io_utils::open_csv_writer(args.output.as_deref())?;
    writer.write_record(["original", "transformed"])?;
    for (original, transformed) in engine.preview_transformation(source, kind, &params) {
        writer.write_record([original, transformed])?;
    }
    writer.flush().context("Flushing preview output")?;
    Ok(())
}

fn preview_parameters(args: &PreviewArgs) -> Result<TransformParameters> {
    let mut params = TransformParameters::new();
    for raw in &args.params {
        let (key, value) = cli::parse_key_value(raw).map_err(|err| anyhow!(err))?;
        params.insert(key, value);
    }
    if !args.mappings.is_empty() {
        let mut mappings = BTreeMap::new();
        for raw in &args.mappings {
            let (from, to) = cli::parse_key_value(raw).map_err(|err| anyhow!(err))?;
            if mappings.insert(from.clone(), to.trim().to_string()).is_some() {
                warn!("Category '{from}' mapped more than once; keeping the last value");
            }
        }
        params.insert(MAPPINGS, mappings);
    }
    if args.case_sensitive {
        params.insert(CASE_SENSITIVE, true);
    }
    if let Some(default) = &args.default_value {
        params.insert(DEFAULT_VALUE, default.as_str());
    }
    Ok(params)
}

fn sample(args: &SampleArgs) -> Result<Vec<CsvColumn>> {
    let options = SampleOptions {
        max_rows: args.sample_rows,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    sampler::parse_csv_file_with(&args.input, &options)
        .with_context(|| format!("Sampling CSV file {:?}", args.input))
}

fn load_schema(path: &std::path::Path) -> Result<DatabaseSchema> {
    schema::load_schema(path).with_context(|| format!("Loading schema from {path:?}"))
}

fn select_table<'a>(
    schema: &'a DatabaseSchema,
    table_name: Option<&str>,
    csv_type: Option<&str>,
) -> Result<&'a SchemaTable> {
    match (table_name, csv_type) {
        (Some(name), _) => schema
            .table(name)
            .ok_or_else(|| anyhow!("Table '{name}' is not declared in the schema")),
        (None, Some(csv_type)) => schema.table_for_csv_type(csv_type).ok_or_else(|| {
            anyhow!(
                "No table with csvType '{csv_type}'. Known csvTypes: {}",
                schema.csv_types().join(", ")
            )
        }),
        (None, None) => bail!("Either --table or --csv-type is required"),
    }
}

fn print_report(target: &SchemaTable, selections: &[ProposedMapping], report: &ValidationReport) {
    let rows = target
        .columns
        .iter()
        .map(|column| {
            let selection = selections
                .iter()
                .find(|selection| selection.db_column == column.name);
            let mapped = selection
                .and_then(ProposedMapping::selected)
                .unwrap_or("-")
                .to_string();
            let transform = selection
                .and_then(|selection| selection.transformation.as_ref())
                .map_or_else(|| "-".to_string(), |applied| applied.kind.to_string());
            let status = if report.error_for(&column.name).is_some() {
                "error"
            } else if report.warning_for(&column.name).is_some() {
                "warning"
            } else if mapped == "-" {
                "unmapped"
            } else {
                "ok"
            };
            vec![
                column.name.clone(),
                column.data_type.clone(),
                yes_no(column.is_required).to_string(),
                mapped,
                transform,
                status.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(
        &["Database column", "Type", "Required", "CSV column", "Transform", "Status"],
        &rows,
    );
    for (db_column, message) in &report.errors {
        println!("error   {db_column}: {message}");
    }
    for (db_column, message) in &report.warnings {
        println!("warning {db_column}: {message}");
    }
}

/// Display label for a source type in reports.
fn describe_source(column: &CsvColumn) -> String {
    match column.inferred_type {
        TypeTag::String if column.sample_values.iter().all(|value| is_blank(value)) => {
            "string (no samples)".to_string()
        }
        other => other.to_string(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_source_flags_empty_columns() {
        let empty = CsvColumn::new("A", 0, Vec::new());
        assert_eq!(describe_source(&empty), "string (no samples)");
        let numeric = CsvColumn::new("A", 0, vec!["1".to_string()]);
        assert_eq!(describe_source(&numeric), "int");
    }
}
