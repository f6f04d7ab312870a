mod auth;
mod projects;
mod render;

use crate::errors::{AppError, AppResult};

pub use auth::{serve_login_page, handle_login, handle_register, handle_logout};
pub use projects::{
    list_projects, serve_new_project_page, create_project, view_project, record_progress, download_report,
};

/// Runs a service call that may block (collection write lock, bcrypt,
/// report file writes) on tokio's blocking pool.
async fn run_blocking<T, E, F>(call: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(Into::into)
}
