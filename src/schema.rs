//! Database schema model and JSON loading.
//!
//! A schema file lists the tables an operator can map into. Each table
//! carries a `csvType` discriminator binding it to one category of input
//! file, and an ordered list of columns with their declared type,
//! requiredness, length limit and an optional transformability override.

use std::{fmt, fs::File, io::BufReader, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, Result},
    inference::TypeTag,
};

/// Applied to string targets that do not declare `maxLength`.
pub const DEFAULT_MAX_LENGTH: usize = 4000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSchema {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub tables: Vec<SchemaTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTable {
    pub table_name: String,
    #[serde(default)]
    pub csv_type: String,
    #[serde(default)]
    pub columns: Vec<DatabaseColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseColumn {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// `None` leaves the decision to the engine's name/type heuristics.
    #[serde(default)]
    pub can_transform: Option<bool>,
}

impl DatabaseColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_required: false,
            max_length: None,
            can_transform: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_can_transform(mut self, allowed: bool) -> Self {
        self.can_transform = Some(allowed);
        self
    }

    pub fn target_type(&self) -> TargetType {
        TargetType::parse(&self.data_type)
    }

    pub fn effective_max_length(&self) -> usize {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }
}

impl SchemaTable {
    pub fn column(&self, name: &str) -> Option<&DatabaseColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl DatabaseSchema {
    pub fn table(&self, table_name: &str) -> Option<&SchemaTable> {
        self.tables
            .iter()
            .find(|table| table.table_name.eq_ignore_ascii_case(table_name))
    }

    pub fn table_for_csv_type(&self, csv_type: &str) -> Option<&SchemaTable> {
        self.tables
            .iter()
            .find(|table| table.csv_type.eq_ignore_ascii_case(csv_type))
    }

    /// Distinct csvTypes in declaration order.
    pub fn csv_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for table in &self.tables {
            let csv_type = table.csv_type.as_str();
            if !csv_type.is_empty() && !seen.contains(&csv_type) {
                seen.push(csv_type);
            }
        }
        seen
    }
}

pub fn load_schema(path: &Path) -> Result<DatabaseSchema> {
    let file = File::open(path).map_err(|err| MapperError::io(path, err))?;
    let schema: DatabaseSchema =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_eof() {
                MapperError::Malformed {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                }
            } else {
                MapperError::Json {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
    debug!(
        "Loaded schema '{}' with {} table(s) from {:?}",
        schema.database_name,
        schema.tables.len(),
        path
    );
    Ok(schema)
}

/// Declared database type folded onto the families validation reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    String,
    Int,
    Decimal,
    DateTime,
    Bool,
    /// Any other declared type; only an identically named source type is compatible.
    Other(String),
}

impl TargetType {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "varchar" | "nvarchar" | "text" | "char" | "nchar" => TargetType::String,
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "long" => TargetType::Int,
            "decimal" | "float" | "double" | "numeric" | "real" | "money" => TargetType::Decimal,
            "datetime" | "date" | "timestamp" | "datetime2" | "date-time" => TargetType::DateTime,
            "bool" | "boolean" | "bit" => TargetType::Bool,
            _ => TargetType::Other(normalized),
        }
    }

    /// Whether a source column of type `source` can populate this target.
    pub fn accepts(&self, source: TypeTag) -> bool {
        match self {
            TargetType::String => true,
            TargetType::Int => source == TypeTag::Int,
            TargetType::Decimal => matches!(source, TypeTag::Int | TypeTag::Decimal),
            TargetType::DateTime => matches!(source, TypeTag::DateTime | TypeTag::String),
            TargetType::Bool => source == TypeTag::Int,
            TargetType::Other(name) => source.as_str() == name,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::String => f.write_str("string"),
            TargetType::Int => f.write_str("int"),
            TargetType::Decimal => f.write_str("decimal"),
            TargetType::DateTime => f.write_str("datetime"),
            TargetType::Bool => f.write_str("bool"),
            TargetType::Other(name) => f.write_str(name),
        }
    }
}
