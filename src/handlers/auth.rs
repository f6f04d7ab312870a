use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
};
use tower_sessions::Session;
use crate::errors::{response::redirect_with, AppError, AppResult};
use crate::handlers::render::{notice_html, render_template};
use crate::handlers::run_blocking;
use crate::middleware::USER_SESSION_KEY;
use crate::models::{LoginForm, Notice, RegisterForm};
use crate::AppState;

pub async fn serve_login_page(Query(notice): Query<Notice>) -> AppResult<Response> {
    let html = render_template("login.html", &[("notice", notice_html(&notice))])?;
    Ok(Html(html).into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    let users = state.users.clone();
    let (username, password) = (login_form.username.clone(), login_form.password.clone());
    let verified = run_blocking(move || users.authenticate(&username, &password)).await?;
    if !verified {
        tracing::info!("Login rejected for user: {}", login_form.username);
        return Ok(redirect_with("/", "error", "Invalid credentials"));
    }

    session
        .insert(USER_SESSION_KEY, login_form.username.clone())
        .await
        .map_err(|e| AppError::Auth(format!("Session error: {}", e)))?;

    tracing::info!("Welcome {}", login_form.username);
    Ok(Redirect::to("/projects").into_response())
}

pub async fn handle_register(
    State(state): State<AppState>,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    if register_form.password != register_form.confirm_password {
        return Ok(redirect_with("/", "error", "Passwords do not match"));
    }

    // AlreadyExists becomes an inline "Username already exists" message
    let users = state.users.clone();
    run_blocking(move || users.register(&register_form.username, &register_form.password)).await?;

    Ok(redirect_with("/", "message", "Registration successful! Please login."))
}

#[axum::debug_handler]
pub async fn handle_logout(
    session: Session,
) -> Response {
    if let Err(e) = session.remove::<String>(USER_SESSION_KEY).await {
        tracing::warn!("Session removal error: {}", e);
    }
    Redirect::to("/").into_response()
}
