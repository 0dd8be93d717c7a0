//! File-backed JSON persistence for the registries.
//!
//! Each registry is one named document under the data directory
//! (`tracked_cities.json`, `users.json`), human-readable and rewritten
//! wholesale on every mutation. A missing document loads as an empty
//! collection; a malformed one is a hard error so startup fails loudly
//! instead of silently discarding data.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Stores one collection per JSON document under a data directory.
/// Clone is cheap; clones share the same directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::Io {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Load a named collection. A document that does not exist yet yields
    /// an empty collection; malformed content is a hard error.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StorageError> {
        let path = self.document_path(name);
        if !path.exists() {
            debug!(document = name, "No persisted document, starting empty");
            return Ok(Vec::new());
        }

        let contents = read_file(&path)?;
        serde_json::from_str(&contents).map_err(|source| StorageError::Malformed { path, source })
    }

    /// Overwrite a named collection in full. The document is written to a
    /// sibling temp path and renamed into place, so a crash mid-write leaves
    /// the previous document intact rather than a half-written file.
    pub fn save<T: Serialize>(&self, name: &str, items: &[T]) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string_pretty(items).map_err(|source| StorageError::Encode {
                name: name.to_string(),
                source,
            })?;

        let path = self.document_path(name);
        let tmp = self.data_dir.join(format!("{}.json.tmp", name));
        fs::write(&tmp, contents).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })?;

        debug!(document = name, count = items.len(), "Document saved");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
