// SPDX-License-Identifier: GPL-3.0-only
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Logical package name -> upstream repository in "owner/repo" form.
pub type RepoMapping = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in mapping file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load the repository mapping from `<path>` (a JSON object of
/// name -> "owner/repo" strings).
pub fn load_repo_mappings(path: &Path) -> Result<RepoMapping, MappingError> {
    let contents = std::fs::read_to_string(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| MappingError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
