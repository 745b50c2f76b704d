use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Map CSV columns onto database schema columns",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the columns, inferred types and sample values of a CSV file
    Inspect(InspectArgs),
    /// List the tables and columns declared in a schema file
    Tables(TablesArgs),
    /// Auto-match CSV columns to a schema table and validate the result
    Match(MatchArgs),
    /// Validate a saved mapping against a CSV file and schema
    Validate(ValidateArgs),
    /// Preview a transformation over a CSV column's sample values
    Preview(PreviewArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Input CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of data rows to sample per column
    #[arg(long = "sample-rows", default_value_t = crate::sampler::MAX_SAMPLE_ROWS)]
    pub sample_rows: usize,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub sample: SampleArgs,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Schema JSON file
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["table", "csv_type"])))]
pub struct MatchArgs {
    #[command(flatten)]
    pub sample: SampleArgs,
    /// Schema JSON file
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Target table name
    #[arg(long)]
    pub table: Option<String>,
    /// Target csvType discriminator
    #[arg(long = "csv-type")]
    pub csv_type: Option<String>,
    /// Mapping file to create or update with the matched columns
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub sample: SampleArgs,
    /// Schema JSON file
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Saved mapping file
    #[arg(short = 'm', long = "mappings")]
    pub mappings: PathBuf,
    /// csvType whose saved mapping should be checked
    #[arg(long = "csv-type")]
    pub csv_type: String,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub sample: SampleArgs,
    /// CSV column to transform
    #[arg(short = 'c', long = "column")]
    pub column: String,
    /// Transformation kind (SplitFirstToken, SplitLastToken, DateFormat, CategoryMapping)
    #[arg(short = 't', long = "transform")]
    pub transform: String,
    /// Transformation parameter as `Name=value` (e.g. `Delimiter=,` or `TargetFormat=yyyy`)
    #[arg(long = "param", action = clap::ArgAction::Append)]
    pub params: Vec<String>,
    /// Category mapping entry as `from=to`
    #[arg(long = "map", action = clap::ArgAction::Append)]
    pub mappings: Vec<String>,
    /// Match category keys case-sensitively
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Category value used when no mapping matches
    #[arg(long = "default")]
    pub default_value: Option<String>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Splits `key=value`, trimming the key. The value is kept verbatim so
/// delimiters such as `", "` survive.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE but found '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
