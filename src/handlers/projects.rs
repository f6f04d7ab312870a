use axum::{
    body::Body,
    extract::{Extension, Form, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tokio::{fs::File, io::BufReader};
use tokio_util::io::ReaderStream;
use crate::errors::{response::redirect_with, AppError, AppResult, RegistryError};
use crate::handlers::render::{escape_html, notice_html, render_template};
use crate::handlers::run_blocking;
use crate::middleware::CurrentUser;
use crate::models::{NewProject, Notice, ProgressForm, ProjectForm};
use crate::services::format_money;
use crate::AppState;

fn project_url(name: &str) -> String {
    format!("/projects/{}", urlencoding::encode(name))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Query(notice): Query<Notice>,
) -> AppResult<Response> {
    let names = state.projects.list_names()?;
    tracing::debug!("Listing {} projects for {}", names.len(), username);

    let rows = if names.is_empty() {
        "<p>No projects yet.</p>".to_string()
    } else {
        let items = names
            .iter()
            .map(|name| format!(r#"<li><a href="{}">{}</a></li>"#, project_url(name), escape_html(name)))
            .collect::<Vec<_>>()
            .join("\n");
        format!("<ul>\n{}\n</ul>", items)
    };

    let html = render_template(
        "projects.html",
        &[
            ("username", escape_html(&username)),
            ("notice", notice_html(&notice)),
            ("projects", rows),
        ],
    )?;
    Ok(Html(html).into_response())
}

pub async fn serve_new_project_page(Query(notice): Query<Notice>) -> AppResult<Response> {
    let html = render_template("new_project.html", &[("notice", notice_html(&notice))])?;
    Ok(Html(html).into_response())
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Form(form): Form<ProjectForm>,
) -> AppResult<Response> {
    tracing::info!("User {} adding project {}", username, form.name);

    let name = form.name.trim().to_string();
    let project = NewProject {
        name: name.clone(),
        client: form.client,
        contract_value: form.contract_value,
        location: form.location,
        start_date: form.start_date,
        end_date: form.end_date,
    };
    let projects = state.projects.clone();
    run_blocking(move || projects.create(project)).await?;

    Ok(redirect_with(
        &project_url(&name),
        "message",
        &format!("Project '{}' added successfully!", name),
    ))
}

pub async fn view_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(notice): Query<Notice>,
) -> AppResult<Response> {
    let project = state
        .projects
        .get(&name)?
        .ok_or_else(|| RegistryError::NotFound(name.clone()))?;

    let progress = project
        .progress
        .iter()
        .map(|(element, percent)| format!("<li>{}: {}%</li>", escape_html(element), percent))
        .collect::<Vec<_>>()
        .join("\n");
    let progress = if progress.is_empty() {
        "<p>No progress recorded.</p>".to_string()
    } else {
        format!("<ul>\n{}\n</ul>", progress)
    };

    let url = project_url(&project.name);
    let html = render_template(
        "project.html",
        &[
            ("notice", notice_html(&notice)),
            ("name", escape_html(&project.name)),
            ("client", escape_html(&project.client)),
            ("contract_value", escape_html(&format_money(&state.config.report.currency_label, project.contract_value))),
            ("location", escape_html(&project.location)),
            ("start_date", project.start_date.to_string()),
            ("end_date", project.end_date.to_string()),
            ("progress", progress),
            ("progress_action", format!("{}/progress", url)),
            ("report_link", format!("{}/report", url)),
        ],
    )?;
    Ok(Html(html).into_response())
}

pub async fn record_progress(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Form(form): Form<ProgressForm>,
) -> AppResult<Response> {
    let projects = state.projects.clone();
    let project_name = name.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        projects.record_progress(&project_name, &form.element, form.percent)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?;

    match outcome {
        Ok(_) => Ok(redirect_with(&project_url(&name), "message", "Progress updated.")),
        Err(RegistryError::InvalidProject(msg)) => Ok(redirect_with(&project_url(&name), "error", &msg)),
        Err(e) => Err(e.into()),
    }
}

pub async fn download_report(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    tracing::info!("Generating report for project: {}", name);

    let project = state
        .projects
        .get(&name)?
        .ok_or_else(|| RegistryError::NotFound(name.clone()))?;
    let reports = state.reports.clone();
    let report_path = run_blocking(move || reports.export(&project)).await?;

    let file = File::open(&report_path).await.map_err(|e| {
        tracing::error!("Failed to open report {}: {}", report_path.display(), e);
        AppError::File(e)
    })?;
    let file_size = file.metadata().await.map_err(AppError::File)?.len();

    let stream = ReaderStream::new(BufReader::new(file));
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", state.config.report.file_name),
        )
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            AppError::Internal(format!("Failed to build report response: {}", e))
        })?;

    Ok(response)
}
