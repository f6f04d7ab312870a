use axum::{
    response::{IntoResponse, Response, Redirect},
    http::StatusCode,
};
use crate::errors::{AppError, DirectoryError, RegistryError};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Authentication errors redirect to login
            AppError::Auth(msg) => redirect_with("/", "error", &msg),

            AppError::Directory(err) => convert_directory_error(err),

            AppError::Registry(err) => convert_registry_error(err),

            AppError::Store(e) => {
                if e.is_format_failure() {
                    tracing::error!("Collection document is corrupt: {}", e);
                } else {
                    tracing::error!("Storage failure: {}", e);
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error: the data files could not be read or written."
                ).into_response()
            }

            AppError::Report(e) => {
                tracing::error!("Report failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Report error: the report could not be generated."
                ).into_response()
            }

            AppError::File(e) => {
                tracing::error!("File failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File error: the requested file could not be read."
                ).into_response()
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error."
                ).into_response()
            }
        }
    }
}

/// Redirects to `path` carrying an inline message in the query string.
pub fn redirect_with(path: &str, key: &str, msg: &str) -> Response {
    Redirect::to(&format!("{}?{}={}", path, key, urlencoding::encode(msg))).into_response()
}

fn convert_directory_error(err: DirectoryError) -> Response {
    match err {
        DirectoryError::AlreadyExists(_) => {
            redirect_with("/", "error", "Username already exists")
        }
        DirectoryError::InvalidUsername(msg) => redirect_with("/", "error", &msg),
        DirectoryError::Store(e) => AppError::Store(e).into_response(),
        DirectoryError::Hash(e) => {
            tracing::error!("Password hashing failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password hashing error."
            ).into_response()
        }
    }
}

fn convert_registry_error(err: RegistryError) -> Response {
    match err {
        RegistryError::AlreadyExists(_) => {
            redirect_with("/new-project", "error", "Project already exists.")
        }
        RegistryError::InvalidProject(msg) => redirect_with("/new-project", "error", &msg),
        RegistryError::NotFound(name) => (
            StatusCode::NOT_FOUND,
            format!("Project not found: {}", name)
        ).into_response(),
        RegistryError::Store(e) => AppError::Store(e).into_response(),
        RegistryError::Storage { name, .. } => {
            let path = format!("/projects/{}", urlencoding::encode(&name));
            redirect_with(
                &path,
                "warning",
                "Project saved, but its document folder could not be created.",
            )
        }
    }
}
