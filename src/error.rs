//! Error taxonomy for the mapping core.
//!
//! Loading failures on the CSV and schema paths surface as [`MapperError`]
//! with the original cause attached. Validation problems are never errors;
//! they are returned as data in a [`ValidationReport`](crate::engine::ValidationReport).

use std::path::PathBuf;

use thiserror::Error;

use crate::transform::TransformationKind;

pub type Result<T, E = MapperError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MapperError {
    /// Input file (CSV, schema or mapping) does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// CSV file has no header line.
    #[error("CSV file is empty or has no headers: {path}")]
    EmptyFile { path: PathBuf },

    /// Input was readable but its content is not usable.
    #[error("malformed input in {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("transformation {0} is not supported")]
    UnsupportedTransformation(TransformationKind),

    #[error("invalid parameters for {kind}: {message}")]
    InvalidParameters {
        kind: TransformationKind,
        message: String,
    },

    /// More than one mapping targets the same csvType.
    #[error("more than one mapping uses csvType '{0}'")]
    DuplicateCsvType(String),

    #[error("failed to write mappings to {path}: {message}")]
    Serialization { path: PathBuf, message: String },
}

impl MapperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return MapperError::FileNotFound { path };
        }
        MapperError::Io { path, source }
    }
}
