//! Mapping engine: proposes CSV→database pairings, validates the operator's
//! selections and builds derived columns through an injected
//! [`TransformationLibrary`].

use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    error::Result,
    inference::is_blank,
    mapping::{AppliedTransformation, MappingResult, ProposedMapping},
    sampler::CsvColumn,
    schema::{DatabaseColumn, TargetType},
    transform::{DerivedColumn, TransformParameters, TransformationKind, TransformationLibrary},
};

/// Rows returned by [`MappingEngine::preview_transformation`].
pub const PREVIEW_LIMIT: usize = 3;

const DUPLICATE_TOLERANT_HINTS: &[&str] = &["name", "date", "dob", "birth"];

/// Per-column problems found by [`MappingEngine::validate_mappings`], keyed by
/// database column name. Only `errors` block a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
    pub warnings: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, db_column: &str) -> Option<&str> {
        self.errors.get(db_column).map(String::as_str)
    }

    pub fn warning_for(&self, db_column: &str) -> Option<&str> {
        self.warnings.get(db_column).map(String::as_str)
    }

    fn error(&mut self, db_column: &str, message: String) {
        self.errors.entry(db_column.to_string()).or_insert(message);
    }
}

#[derive(Debug, Default)]
pub struct MappingEngine {
    library: TransformationLibrary,
}

impl MappingEngine {
    pub fn new(library: TransformationLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &TransformationLibrary {
        &self.library
    }

    /// Proposes a CSV column for each database column by name similarity.
    ///
    /// Each database column tries three rules in order against every CSV
    /// column: exact case-insensitive equality, equality ignoring spaces,
    /// underscores and hyphens, then case-insensitive containment either way.
    /// The first CSV column satisfying the earliest rule wins. Several
    /// database columns may share one CSV column; validation reports that.
    /// Unmatched database columns are absent.
    pub fn auto_match(
        &self,
        csv_columns: &[CsvColumn],
        db_columns: &[DatabaseColumn],
    ) -> BTreeMap<String, String> {
        let csv_keys = csv_columns
            .iter()
            .map(|column| NameKey::new(&column.name))
            .collect::<Vec<_>>();
        let mut matches: BTreeMap<String, String> = BTreeMap::new();

        for db_column in db_columns {
            let db_key = NameKey::new(&db_column.name);
            let found = [MatchPass::Exact, MatchPass::Normalized, MatchPass::Contains]
                .into_iter()
                .find_map(|pass| {
                    csv_keys
                        .iter()
                        .position(|csv_key| pass.matches(&db_key, csv_key))
                        .map(|idx| (pass, idx))
                });
            if let Some((pass, idx)) = found {
                debug!(
                    "Auto-matched '{}' to CSV column '{}' ({:?})",
                    db_column.name, csv_columns[idx].name, pass
                );
                matches.insert(db_column.name.clone(), csv_columns[idx].name.clone());
            }
        }
        matches
    }

    /// One [`ProposedMapping`] per database column, pre-filled from [`auto_match`](Self::auto_match).
    pub fn propose(
        &self,
        csv_columns: &[CsvColumn],
        db_columns: &[DatabaseColumn],
    ) -> Vec<ProposedMapping> {
        let mut matches = self.auto_match(csv_columns, db_columns);
        db_columns
            .iter()
            .map(|db_column| match matches.remove(&db_column.name) {
                Some(csv_column) => ProposedMapping::new(&db_column.name, csv_column),
                None => ProposedMapping::unmapped(&db_column.name),
            })
            .collect()
    }

    /// Checks the proposed mappings against the CSV columns and the target
    /// schema. Every problem is reported; at most one error per column.
    pub fn validate_mappings(
        &self,
        proposed: &[ProposedMapping],
        csv_columns: &[CsvColumn],
        db_columns: &[DatabaseColumn],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        let usage = proposed
            .iter()
            .filter_map(ProposedMapping::selected)
            .counts();
        for mapping in proposed {
            let Some(selected) = mapping.selected() else {
                continue;
            };
            if usage.get(selected).copied().unwrap_or(0) < 2 {
                continue;
            }
            let message = format!("CSV column '{selected}' is mapped to multiple database columns.");
            if tolerates_duplicates(selected) {
                report.warnings.insert(mapping.db_column.clone(), message);
            } else {
                report.error(&mapping.db_column, message);
            }
        }

        for db_column in db_columns {
            if report.errors.contains_key(&db_column.name) {
                continue;
            }
            let mapping = proposed
                .iter()
                .find(|mapping| mapping.db_column == db_column.name);
            if let Some(message) = self.check_column(db_column, mapping, csv_columns) {
                report.error(&db_column.name, message);
            }
        }

        debug!(
            "Validation found {} error(s) and {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    fn check_column(
        &self,
        db_column: &DatabaseColumn,
        mapping: Option<&ProposedMapping>,
        csv_columns: &[CsvColumn],
    ) -> Option<String> {
        let Some(selected) = mapping.and_then(ProposedMapping::selected) else {
            return db_column
                .is_required
                .then(|| "This database column must be mapped to a CSV column.".to_string());
        };
        let Some(csv_column) = csv_columns.iter().find(|column| column.name == selected) else {
            return Some(format!("CSV column '{selected}' does not exist."));
        };

        let transformation = mapping.and_then(|mapping| mapping.transformation.as_ref());
        let samples = match transformation {
            Some(applied) => match self.apply_transformation(csv_column, applied) {
                Ok(samples) => samples,
                Err(err) => return Some(err.to_string()),
            },
            None => csv_column.sample_values.clone(),
        };

        let target = db_column.target_type();
        if transformation.is_none() && !target.accepts(csv_column.inferred_type) {
            return Some(format!(
                "Type mismatch: CSV column '{}' is {} but database column expects {}.",
                csv_column.name, csv_column.inferred_type, db_column.data_type
            ));
        }

        if target == TargetType::String {
            let max_length = db_column.effective_max_length();
            if let Some(longest) = samples
                .iter()
                .map(|value| value.chars().count())
                .filter(|len| *len > max_length)
                .max()
            {
                return Some(format!(
                    "Value length {longest} exceeds maximum length {max_length}."
                ));
            }
        }

        if db_column.is_required
            && transformation.is_some()
            && samples.iter().all(|value| is_blank(value))
        {
            return Some("No valid values after transformation.".to_string());
        }
        None
    }

    pub fn create_derived_column(
        &self,
        source: &CsvColumn,
        new_name: &str,
        kind: TransformationKind,
        params: TransformParameters,
    ) -> Result<DerivedColumn> {
        self.library
            .create_derived_column(source, new_name, kind, params)
    }

    /// Transformed samples of `source`, after validating the parameters.
    pub fn apply_transformation(
        &self,
        source: &CsvColumn,
        applied: &AppliedTransformation,
    ) -> Result<Vec<String>> {
        self.library
            .validate_parameters(applied.kind, &applied.parameters)?;
        self.library
            .transform_samples(applied.kind, &source.sample_values, &applied.parameters)
    }

    /// Whether operators may attach a transformation to `db_column`. An
    /// explicit `canTransform` in the schema always wins.
    pub fn can_transform(&self, db_column: &DatabaseColumn) -> bool {
        if let Some(allowed) = db_column.can_transform {
            return allowed;
        }
        let name = db_column.name.as_str();
        let data_type = db_column.data_type.trim().to_ascii_lowercase();
        let target = db_column.target_type();
        let is_string = target == TargetType::String;
        let name_has = |hints: &[&str]| hints.iter().any(|hint| name.contains(hint));

        if is_string && name_has(&["Name", "Identifier"]) {
            return true;
        }
        if target == TargetType::DateTime || data_type.contains("time") {
            return true;
        }
        if is_string && name_has(&["Gender", "Status", "Type", "Category"]) {
            return true;
        }
        if name_has(&["Year", "Age"]) || (target == TargetType::Int && name.contains("Birth")) {
            return true;
        }
        is_string
            && name_has(&["Address", "Street", "City", "State", "Zip", "PostalCode"])
    }

    /// Transformation kinds worth offering for `db_column`, limited to the
    /// kinds the library implements.
    pub fn available_transformations(&self, db_column: &DatabaseColumn) -> Vec<TransformationKind> {
        if !self.can_transform(db_column) {
            return Vec::new();
        }
        let name = db_column.name.as_str();
        let target = db_column.target_type();
        let mut kinds = Vec::new();
        if name.contains("FirstName") || name.contains("LastName") {
            kinds.push(TransformationKind::SplitFirstToken);
            kinds.push(TransformationKind::SplitLastToken);
        }
        if target == TargetType::DateTime || (target == TargetType::Int && name.contains("Year")) {
            kinds.push(TransformationKind::DateFormat);
        }
        if name.contains("Gender") || name.contains("Code") {
            kinds.push(TransformationKind::CategoryMapping);
        }
        kinds.retain(|kind| self.library.is_supported(*kind));
        kinds
    }

    /// Up to [`PREVIEW_LIMIT`] `(original, transformed)` pairs. A transform
    /// that cannot run yields one row carrying the error.
    pub fn preview_transformation(
        &self,
        source: &CsvColumn,
        kind: TransformationKind,
        params: &TransformParameters,
    ) -> Vec<(String, String)> {
        let samples = source
            .sample_values
            .iter()
            .take(PREVIEW_LIMIT)
            .cloned()
            .collect::<Vec<_>>();
        let outcome = self
            .library
            .validate_parameters(kind, params)
            .and_then(|()| self.library.transform_samples(kind, &samples, params));
        match outcome {
            Ok(transformed) => samples.into_iter().zip(transformed).collect(),
            Err(err) => vec![(
                samples.into_iter().next().unwrap_or_default(),
                format!("Preview error: {err}"),
            )],
        }
    }

    /// Rebuilds the selection state for `db_columns` from a saved mapping,
    /// matching saved CSV column names against the freshly sampled columns.
    /// Saved entries whose CSV column is gone are left unselected.
    pub fn restore_selections(
        &self,
        saved: &MappingResult,
        csv_columns: &[CsvColumn],
        db_columns: &[DatabaseColumn],
    ) -> Vec<ProposedMapping> {
        db_columns
            .iter()
            .map(|db_column| {
                let Some(entry) = saved.mapping_for(&db_column.name) else {
                    return ProposedMapping::unmapped(&db_column.name);
                };
                let source = entry.source_column();
                let Some(csv_column) = csv_columns
                    .iter()
                    .find(|column| column.name.eq_ignore_ascii_case(source))
                else {
                    warn!(
                        "Saved mapping for '{}' refers to missing CSV column '{}'",
                        db_column.name, source
                    );
                    return ProposedMapping::unmapped(&db_column.name);
                };
                let mut restored = ProposedMapping::new(&db_column.name, &csv_column.name);
                restored.transformation = entry.transformation();
                restored
            })
            .collect()
    }
}

fn tolerates_duplicates(csv_column: &str) -> bool {
    let lowered = csv_column.to_lowercase();
    DUPLICATE_TOLERANT_HINTS
        .iter()
        .any(|hint| lowered.contains(hint))
}

#[derive(Debug, Clone, Copy)]
enum MatchPass {
    Exact,
    Normalized,
    Contains,
}

impl MatchPass {
    fn matches(self, db: &NameKey, csv: &NameKey) -> bool {
        match self {
            MatchPass::Exact => db.lowered == csv.lowered,
            MatchPass::Normalized => !db.normalized.is_empty() && db.normalized == csv.normalized,
            MatchPass::Contains => {
                !db.lowered.is_empty()
                    && !csv.lowered.is_empty()
                    && (db.lowered.contains(&csv.lowered) || csv.lowered.contains(&db.lowered))
            }
        }
    }
}

struct NameKey {
    lowered: String,
    normalized: String,
}

impl NameKey {
    fn new(name: &str) -> Self {
        let lowered = name.trim().to_lowercase();
        let normalized = lowered
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect();
        Self {
            lowered,
            normalized,
        }
    }
}
