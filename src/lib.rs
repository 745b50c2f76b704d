//! Core of a CSV-to-database column mapper.
//!
//! Samples a CSV file ([`sampler`]), infers column types ([`inference`]),
//! loads a target schema ([`schema`]), proposes and validates column
//! pairings ([`engine`]), derives virtual columns through parameterized
//! transforms ([`transform`]) and persists the result ([`persistence`]).
//! The `csv-mapper` binary exposes the same operations on the command line.

pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod inference;
pub mod io_utils;
pub mod mapping;
pub mod persistence;
pub mod sampler;
pub mod schema;
pub mod table;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    engine::{MappingEngine, ValidationReport},
    error::MapperError,
    mapping::{ColumnMapping, MappingResult, MultiMappingResult, ProposedMapping},
    sampler::{CsvColumn, parse_csv_file},
    schema::{DatabaseColumn, DatabaseSchema, SchemaTable, load_schema},
    transform::{DerivedColumn, TransformParameters, TransformationKind, TransformationLibrary},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_mapper", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Inspect(args) => commands::inspect(&args),
        Commands::Tables(args) => commands::tables(&args),
        Commands::Match(args) => commands::match_columns(&args),
        Commands::Validate(args) => commands::validate(&args),
        Commands::Preview(args) => commands::preview(&args),
    }
}
