use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed collection document {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Collection document {path} has schema version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    #[error("Malformed record {key} in {path}: {source}")]
    Record {
        path: PathBuf,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// True for failures caused by the stored content rather than the filesystem.
    pub fn is_format_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Format { .. } | StoreError::UnsupportedVersion { .. } | StoreError::Record { .. }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
