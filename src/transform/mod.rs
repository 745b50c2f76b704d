//! Named, parameterized string transforms used to build derived columns.
//!
//! Every transform implements [`Transformation`]; a [`TransformationLibrary`]
//! maps each [`TransformationKind`] to its implementation. Kinds that are
//! part of the vocabulary but have no implementation (regex extraction,
//! number formatting, ...) fail with
//! [`MapperError::UnsupportedTransformation`] when requested.
//!
//! Transforms never fail on an individual value: unparsable input falls back
//! to the variant's "unchanged" or "default" policy.

pub mod category;
pub mod date_format;
pub mod derived;
pub mod params;
pub mod presets;
pub mod split;

use std::{collections::BTreeMap, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

pub use category::CategoryMapping;
pub use date_format::DateFormat;
pub use derived::DerivedColumn;
pub use params::{ParamValue, TransformParameters};
pub use split::SplitToken;

use crate::{
    error::{MapperError, Result},
    sampler::CsvColumn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransformationKind {
    SplitFirstToken,
    SplitLastToken,
    RegexExtract,
    DateFormat,
    DateExtractComponent,
    CategoryMapping,
    NumberFormat,
    UnitConversion,
}

impl TransformationKind {
    pub const ALL: [TransformationKind; 8] = [
        TransformationKind::SplitFirstToken,
        TransformationKind::SplitLastToken,
        TransformationKind::RegexExtract,
        TransformationKind::DateFormat,
        TransformationKind::DateExtractComponent,
        TransformationKind::CategoryMapping,
        TransformationKind::NumberFormat,
        TransformationKind::UnitConversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::SplitFirstToken => "SplitFirstToken",
            TransformationKind::SplitLastToken => "SplitLastToken",
            TransformationKind::RegexExtract => "RegexExtract",
            TransformationKind::DateFormat => "DateFormat",
            TransformationKind::DateExtractComponent => "DateExtractComponent",
            TransformationKind::CategoryMapping => "CategoryMapping",
            TransformationKind::NumberFormat => "NumberFormat",
            TransformationKind::UnitConversion => "UnitConversion",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        TransformationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!(
                    "Unknown transformation '{value}'. Known transformations: {}",
                    TransformationKind::ALL.map(|kind| kind.as_str()).join(", ")
                )
            })
    }
}

/// Capability set shared by every transform.
pub trait Transformation: Send + Sync {
    fn kind(&self) -> TransformationKind;

    /// Transforms one value. Never fails; see the variant for its fallback.
    fn transform(&self, input: &str, params: &TransformParameters) -> String;

    /// Applies [`transform`](Self::transform) to each sample, preserving
    /// order and length.
    fn transform_samples(&self, inputs: &[String], params: &TransformParameters) -> Vec<String> {
        inputs
            .iter()
            .map(|input| self.transform(input, params))
            .collect()
    }

    fn describe(&self, params: &TransformParameters) -> String;

    /// Returns a human-readable message when `params` cannot be used.
    fn validate_parameters(&self, params: &TransformParameters) -> Result<(), String>;
}

/// Registry of transform implementations, handed to the mapping engine at
/// construction.
pub struct TransformationLibrary {
    registry: BTreeMap<TransformationKind, Box<dyn Transformation>>,
}

impl fmt::Debug for TransformationLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationLibrary")
            .field("kinds", &self.registry.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TransformationLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransformationLibrary {
    pub fn empty() -> Self {
        Self {
            registry: BTreeMap::new(),
        }
    }

    /// Library with the token split, date format and category mapping transforms.
    pub fn standard() -> Self {
        let mut library = Self::empty();
        library.register(Box::new(SplitToken::first()));
        library.register(Box::new(SplitToken::last()));
        library.register(Box::new(DateFormat));
        library.register(Box::new(CategoryMapping));
        library
    }

    /// Registers `transformation`, replacing any implementation of the same kind.
    pub fn register(&mut self, transformation: Box<dyn Transformation>) {
        self.registry.insert(transformation.kind(), transformation);
    }

    pub fn is_supported(&self, kind: TransformationKind) -> bool {
        self.registry.contains_key(&kind)
    }

    pub fn supported_kinds(&self) -> Vec<TransformationKind> {
        self.registry.keys().copied().collect()
    }

    pub fn get(&self, kind: TransformationKind) -> Result<&dyn Transformation> {
        self.registry
            .get(&kind)
            .map(|transformation| transformation.as_ref())
            .ok_or(MapperError::UnsupportedTransformation(kind))
    }

    pub fn validate_parameters(
        &self,
        kind: TransformationKind,
        params: &TransformParameters,
    ) -> Result<()> {
        self.get(kind)?
            .validate_parameters(params)
            .map_err(|message| MapperError::InvalidParameters { kind, message })
    }

    pub fn transform_samples(
        &self,
        kind: TransformationKind,
        samples: &[String],
        params: &TransformParameters,
    ) -> Result<Vec<String>> {
        Ok(self.get(kind)?.transform_samples(samples, params))
    }

    pub fn describe(&self, kind: TransformationKind, params: &TransformParameters) -> Result<String> {
        Ok(self.get(kind)?.describe(params))
    }

    /// Validates `params`, then builds a derived column whose samples and
    /// inferred type come from the transformed source samples.
    pub fn create_derived_column(
        &self,
        source: &CsvColumn,
        new_name: &str,
        kind: TransformationKind,
        params: TransformParameters,
    ) -> Result<DerivedColumn> {
        self.validate_parameters(kind, &params)?;
        let samples = self.transform_samples(kind, &source.sample_values, &params)?;
        debug!(
            "Derived column '{}' from '{}' using {}",
            new_name, source.name, kind
        );
        Ok(DerivedColumn::from_parts(source, new_name, kind, params, samples))
    }
}
