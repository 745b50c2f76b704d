use serde::Serialize;

use super::{TransformParameters, TransformationKind, TransformationLibrary};
use crate::{error::Result, inference::infer_type, sampler::CsvColumn};

/// A virtual column produced by applying a transformation to a real CSV
/// column. Its samples and inferred type describe the transformed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedColumn {
    #[serde(flatten)]
    column: CsvColumn,
    pub source_column_name: String,
    pub transformation_kind: TransformationKind,
    pub transformation_parameters: TransformParameters,
    #[serde(skip)]
    source_samples: Vec<String>,
}

impl DerivedColumn {
    pub(crate) fn from_parts(
        source: &CsvColumn,
        name: &str,
        kind: TransformationKind,
        params: TransformParameters,
        samples: Vec<String>,
    ) -> Self {
        Self {
            column: CsvColumn {
                name: name.to_string(),
                index: source.index,
                inferred_type: infer_type(&samples),
                sample_values: samples,
            },
            source_column_name: source.name.clone(),
            transformation_kind: kind,
            transformation_parameters: params,
            source_samples: source.sample_values.clone(),
        }
    }

    pub fn column(&self) -> &CsvColumn {
        &self.column
    }

    pub fn into_column(self) -> CsvColumn {
        self.column
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn sample_values(&self) -> &[String] {
        &self.column.sample_values
    }

    pub fn inferred_type(&self) -> crate::inference::TypeTag {
        self.column.inferred_type
    }

    pub fn is_virtual(&self) -> bool {
        true
    }

    /// Swaps in new parameters and recomputes samples and type from the
    /// source samples. On failure the column is left unchanged.
    pub fn update_parameters(
        &mut self,
        library: &TransformationLibrary,
        params: TransformParameters,
    ) -> Result<()> {
        library.validate_parameters(self.transformation_kind, &params)?;
        let samples =
            library.transform_samples(self.transformation_kind, &self.source_samples, &params)?;
        self.column.inferred_type = infer_type(&samples);
        self.column.sample_values = samples;
        self.transformation_parameters = params;
        Ok(())
    }
}
