//! Mapping model: the operator's per-column selections and the persisted
//! result shapes built from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, Result},
    transform::{TransformParameters, TransformationKind},
};

/// Selection value meaning "leave this database column unmapped".
pub const NO_MAPPING: &str = "-- No Mapping (Optional) --";

/// A transformation attached to a selected CSV column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransformation {
    pub kind: TransformationKind,
    pub parameters: TransformParameters,
}

impl AppliedTransformation {
    pub fn new(kind: TransformationKind, parameters: TransformParameters) -> Self {
        Self { kind, parameters }
    }
}

impl From<(TransformationKind, TransformParameters)> for AppliedTransformation {
    fn from((kind, parameters): (TransformationKind, TransformParameters)) -> Self {
        Self::new(kind, parameters)
    }
}

/// The working state for one database column while a mapping is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedMapping {
    pub db_column: String,
    pub csv_column: Option<String>,
    pub transformation: Option<AppliedTransformation>,
}

impl ProposedMapping {
    pub fn unmapped(db_column: impl Into<String>) -> Self {
        Self {
            db_column: db_column.into(),
            csv_column: None,
            transformation: None,
        }
    }

    pub fn new(db_column: impl Into<String>, csv_column: impl Into<String>) -> Self {
        Self {
            db_column: db_column.into(),
            csv_column: Some(csv_column.into()),
            transformation: None,
        }
    }

    pub fn with_transformation(mut self, transformation: impl Into<AppliedTransformation>) -> Self {
        self.transformation = Some(transformation.into());
        self
    }

    /// The selected CSV column, ignoring blanks and the [`NO_MAPPING`] sentinel.
    pub fn selected(&self) -> Option<&str> {
        self.csv_column
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != NO_MAPPING)
    }

    pub fn is_mapped(&self) -> bool {
        self.selected().is_some()
    }
}

/// One persisted CSV→database column pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub csv_column: String,
    pub db_column: String,
    #[serde(default)]
    pub is_derived_column: bool,
    #[serde(default)]
    pub source_column_name: Option<String>,
    #[serde(default, rename = "transformationType")]
    pub transformation_kind: Option<TransformationKind>,
    #[serde(default)]
    pub transformation_parameters: Option<TransformParameters>,
}

impl ColumnMapping {
    pub fn direct(csv_column: impl Into<String>, db_column: impl Into<String>) -> Self {
        Self {
            csv_column: csv_column.into(),
            db_column: db_column.into(),
            is_derived_column: false,
            source_column_name: None,
            transformation_kind: None,
            transformation_parameters: None,
        }
    }

    pub fn derived(
        source_column: impl Into<String>,
        db_column: impl Into<String>,
        kind: TransformationKind,
        parameters: TransformParameters,
    ) -> Self {
        let source_column = source_column.into();
        Self {
            csv_column: source_column.clone(),
            db_column: db_column.into(),
            is_derived_column: true,
            source_column_name: Some(source_column),
            transformation_kind: Some(kind),
            transformation_parameters: Some(parameters),
        }
    }

    /// A derived entry must name its source, kind and parameters.
    pub fn is_complete(&self) -> bool {
        !self.is_derived_column
            || (self.source_column_name.is_some()
                && self.transformation_kind.is_some()
                && self.transformation_parameters.is_some())
    }

    /// The CSV column the values are read from.
    pub fn source_column(&self) -> &str {
        self.source_column_name
            .as_deref()
            .filter(|_| self.is_derived_column)
            .unwrap_or(&self.csv_column)
    }

    pub fn transformation(&self) -> Option<AppliedTransformation> {
        if !self.is_derived_column {
            return None;
        }
        match (&self.transformation_kind, &self.transformation_parameters) {
            (Some(kind), Some(parameters)) => {
                Some(AppliedTransformation::new(*kind, parameters.clone()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResult {
    pub table_name: String,
    #[serde(default)]
    pub csv_type: String,
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,
}

impl MappingResult {
    pub fn new(table_name: impl Into<String>, csv_type: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            csv_type: csv_type.into(),
            column_mappings: Vec::new(),
        }
    }

    /// Builds the persisted form of the current selections. Unmapped rows are
    /// skipped; rows carrying a transformation become derived entries.
    pub fn from_selections(
        table_name: impl Into<String>,
        csv_type: impl Into<String>,
        selections: &[ProposedMapping],
    ) -> Self {
        let mut result = Self::new(table_name, csv_type);
        result.column_mappings = selections
            .iter()
            .filter_map(|selection| {
                let csv_column = selection.selected()?;
                Some(match &selection.transformation {
                    Some(applied) => ColumnMapping::derived(
                        csv_column,
                        &selection.db_column,
                        applied.kind,
                        applied.parameters.clone(),
                    ),
                    None => ColumnMapping::direct(csv_column, &selection.db_column),
                })
            })
            .collect();
        result
    }

    pub fn mapping_for(&self, db_column: &str) -> Option<&ColumnMapping> {
        self.column_mappings
            .iter()
            .find(|mapping| mapping.db_column.eq_ignore_ascii_case(db_column))
    }
}

/// Mappings for several csvTypes, at most one entry per csvType.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiMappingResult {
    pub mappings: Vec<MappingResult>,
}

impl MultiMappingResult {
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn get(&self, csv_type: &str) -> Option<&MappingResult> {
        self.mappings
            .iter()
            .find(|mapping| mapping.csv_type.eq_ignore_ascii_case(csv_type))
    }

    /// Replaces the entry with the same csvType or appends a new one.
    pub fn upsert(&mut self, result: MappingResult) {
        match self
            .mappings
            .iter_mut()
            .find(|existing| existing.csv_type.eq_ignore_ascii_case(&result.csv_type))
        {
            Some(existing) => *existing = result,
            None => self.mappings.push(result),
        }
    }

    pub fn ensure_unique_csv_types(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for mapping in &self.mappings {
            if !seen.insert(mapping.csv_type.to_ascii_lowercase()) {
                return Err(MapperError::DuplicateCsvType(mapping.csv_type.clone()));
            }
        }
        Ok(())
    }
}

impl From<MappingResult> for MultiMappingResult {
    fn from(result: MappingResult) -> Self {
        Self {
            mappings: vec![result],
        }
    }
}
