use std::{io, path::PathBuf};
use thiserror::Error;
use super::store::StoreError;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("User {0} already exists")]
    AlreadyExists(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Project {0} already exists")]
    AlreadyExists(String),

    #[error("Project {0} not found")]
    NotFound(String),

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    // The record is already persisted when this is raised.
    #[error("Project {name} was saved but its directory {path} could not be created: {source}")]
    Storage {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
