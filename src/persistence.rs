//! Reading and writing mapping files.
//!
//! Files hold either the multi-mapping shape (`{"mappings": [...]}`) or a
//! single mapping object; both load as a [`MultiMappingResult`].
//! The `save_*`/`load_mappings` entry points never fail outward: a missing or
//! unreadable file loads as an empty result and a failed write returns
//! `false`. The `try_*` variants expose the underlying [`MapperError`].

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    error::{MapperError, Result},
    mapping::{MappingResult, MultiMappingResult},
};

pub fn save_mapping(result: &MappingResult, path: &Path) -> bool {
    report_save(try_save_mapping(result, path), path)
}

pub fn save_mappings(result: &MultiMappingResult, path: &Path) -> bool {
    report_save(try_save_mappings(result, path), path)
}

pub fn load_mappings(path: &Path) -> MultiMappingResult {
    match try_load_mappings(path) {
        Ok(result) => result,
        Err(MapperError::FileNotFound { .. }) => {
            debug!("No mapping file at {path:?}; starting empty");
            MultiMappingResult::default()
        }
        Err(err) => {
            warn!("Ignoring unreadable mapping file {path:?}: {err}");
            MultiMappingResult::default()
        }
    }
}

/// Writes one mapping as a bare object rather than the multi-mapping shape.
pub fn try_save_mapping(result: &MappingResult, path: &Path) -> Result<()> {
    write_json_atomic(result, path)
}

pub fn try_save_mappings(result: &MultiMappingResult, path: &Path) -> Result<()> {
    result.ensure_unique_csv_types()?;
    write_json_atomic(result, path)
}

pub fn try_load_mappings(path: &Path) -> Result<MultiMappingResult> {
    let bytes = fs::read(path).map_err(|err| MapperError::io(path, err))?;
    let mut result = match serde_json::from_slice::<MultiMappingResult>(&bytes) {
        Ok(result) => result,
        Err(multi_err) => match serde_json::from_slice::<MappingResult>(&bytes) {
            Ok(legacy) => {
                info!(
                    "Loaded single mapping for table '{}' from {path:?}",
                    legacy.table_name
                );
                MultiMappingResult::from(legacy)
            }
            Err(_) => {
                return Err(MapperError::Json {
                    path: path.to_path_buf(),
                    source: multi_err,
                });
            }
        },
    };
    drop_incomplete_entries(&mut result, path);
    Ok(result)
}

fn drop_incomplete_entries(result: &mut MultiMappingResult, path: &Path) {
    for mapping in &mut result.mappings {
        mapping.column_mappings.retain(|entry| {
            let complete = entry.is_complete();
            if !complete {
                warn!(
                    "Dropping derived mapping for '{}' in {path:?}: missing source or transformation",
                    entry.db_column
                );
            }
            complete
        });
    }
}

fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let temp = temp_path(path);
    let written = File::create(&temp)
        .map_err(|err| MapperError::io(&temp, err))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).map_err(|err| {
                MapperError::Serialization {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }
            })?;
            writer
                .flush()
                .and_then(|()| writer.get_ref().sync_all())
                .map_err(|err| MapperError::io(&temp, err))
        })
        .and_then(|()| fs::rename(&temp, path).map_err(|err| MapperError::io(path, err)));
    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "mappings.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn report_save(outcome: Result<()>, path: &Path) -> bool {
    match outcome {
        Ok(()) => {
            info!("Mappings written to {path:?}");
            true
        }
        Err(err) => {
            warn!("Failed to save mappings to {path:?}: {err}");
            false
        }
    }
}
