use crate::error::OutputError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Ensures `directory` exists and returns a fresh, time-stamped output file
/// path inside it, e.g. `Output_yaml/19_10_2026_08:15:02_output.yaml`.
pub fn prepare_output_path(directory: &Path, now: DateTime<Utc>) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(directory).map_err(|source| OutputError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(directory.join(output_file_name(now)))
}

pub fn output_file_name(now: DateTime<Utc>) -> String {
    format!("{}_output.yaml", now.format("%d_%m_%Y_%H:%M:%S"))
}
