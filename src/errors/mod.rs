use thiserror::Error;

pub mod registry;
pub mod response;
pub mod store;

pub use registry::{DirectoryError, RegistryError, ReportError};
pub use store::{StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("User directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Project error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
