mod models;
mod handlers;
mod services;
mod middleware;
mod pdf;
mod config;
mod errors;

use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use std::sync::Arc;
use anyhow::Context;
use crate::{
    config::Config,
    errors::StoreResult,
    services::{JsonStore, ProjectRegistry, ReportExporter, Store, UserDirectory, WriteDiscipline},
};

// Application state that can be shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub projects: ProjectRegistry,
    pub reports: ReportExporter,
    pub config: Config,
}

impl AppState {
    /// Wires the collections named in `config` and makes sure both exist on disk.
    pub fn from_config(config: Config) -> StoreResult<Self> {
        let discipline = if config.storage.single_writer {
            WriteDiscipline::SingleWriter
        } else {
            WriteDiscipline::LastWriteWins
        };

        let user_store = JsonStore::new(&config.storage.users_file, discipline);
        let project_store = JsonStore::new(&config.storage.projects_file, discipline);
        user_store.initialize()?;
        project_store.initialize()?;

        Ok(Self {
            users: UserDirectory::new(
                Arc::new(user_store),
                config.auth.password_scheme,
                config.auth.bcrypt_cost,
            ),
            projects: ProjectRegistry::new(Arc::new(project_store), &config.storage.projects_dir),
            reports: ReportExporter::new(
                &config.storage.projects_dir,
                config.report.currency_label.clone(),
                config.report.file_name.clone(),
            ),
            config,
        })
    }
}

fn build_router(state: AppState) -> Router {
    // Session store setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    let max_form_size = state.config.upload.max_form_size;

    Router::new()
        // Auth routes
        .route("/", get(handlers::serve_login_page))
        .route("/login", post(handlers::handle_login))
        .route("/register", post(handlers::handle_register))
        .route("/logout", get(handlers::handle_logout))

        // Project routes
        .route("/projects", get(handlers::list_projects).post(handlers::create_project))
        .route("/new-project", get(handlers::serve_new_project_page))
        .route("/projects/:name", get(handlers::view_project))
        .route("/projects/:name/progress", post(handlers::record_progress))
        .route("/projects/:name/report", get(handlers::download_report))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        // Add middleware
        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)

        // Form size limit from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_form_size))

        // Add state
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;
    let address = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::from_config(config).context("Failed to initialize data files")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind server to {}", address))?;
    tracing::info!("Server running on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, PasswordScheme, ReportConfig, ServerConfig, StorageConfig, UploadConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            storage: StorageConfig {
                users_file: dir.path().join("users.json"),
                projects_file: dir.path().join("projects.json"),
                projects_dir: dir.path().join("projects"),
                single_writer: true,
            },
            auth: AuthConfig {
                password_scheme: PasswordScheme::Plaintext,
                bcrypt_cost: 4,
            },
            report: ReportConfig {
                currency_label: "RM".into(),
                file_name: "project_report.pdf".into(),
            },
            upload: UploadConfig {
                max_form_size: 64 * 1024,
            },
        }
    }

    fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Registers and logs in `alice`, returning the session cookie.
    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(form("/register", "username=alice&password=pw1&confirm_password=pw1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .clone()
            .oneshot(form("/login", "username=alice&password=pw1", None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/projects");

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_login_page_is_public() {
        let dir = TempDir::new().unwrap();
        let app = build_router(AppState::from_config(test_config(&dir)).unwrap());

        let response = app.oneshot(get_request("/?error=Invalid%20credentials", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_project_pages_require_login() {
        let dir = TempDir::new().unwrap();
        let app = build_router(AppState::from_config(test_config(&dir)).unwrap());

        for uri in ["/projects", "/new-project", "/projects/Tower%20A/report"] {
            let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn test_register_flow_messages() {
        let dir = TempDir::new().unwrap();
        let app = build_router(AppState::from_config(test_config(&dir)).unwrap());

        let response = app
            .clone()
            .oneshot(form("/register", "username=alice&password=pw1&confirm_password=pw2", None))
            .await
            .unwrap();
        assert_eq!(location(&response), format!("/?error={}", urlencoding::encode("Passwords do not match")));

        let response = app
            .clone()
            .oneshot(form("/register", "username=alice&password=pw1&confirm_password=pw1", None))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            format!("/?message={}", urlencoding::encode("Registration successful! Please login."))
        );

        let response = app
            .clone()
            .oneshot(form("/register", "username=alice&password=pw2&confirm_password=pw2", None))
            .await
            .unwrap();
        assert_eq!(location(&response), format!("/?error={}", urlencoding::encode("Username already exists")));

        let response = app
            .oneshot(form("/login", "username=alice&password=pw2", None))
            .await
            .unwrap();
        assert_eq!(location(&response), format!("/?error={}", urlencoding::encode("Invalid credentials")));
    }

    #[tokio::test]
    async fn test_project_lifecycle() {
        let dir = TempDir::new().unwrap();
        let app = build_router(AppState::from_config(test_config(&dir)).unwrap());
        let cookie = login(&app).await;

        let project = "name=Tower+A&client=AcmeCo&contract_value=150000.00&location=KL\
                       &start_date=2024-01-01&end_date=2024-12-31";
        let response = app.clone().oneshot(form("/projects", project, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/projects/Tower%20A?message="));

        let response = app.clone().oneshot(form("/projects", project, Some(&cookie))).await.unwrap();
        assert_eq!(
            location(&response),
            format!("/new-project?error={}", urlencoding::encode("Project already exists."))
        );

        let response = app
            .clone()
            .oneshot(form("/projects/Tower%20A/progress", "element=Piling&percent=40", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app.clone().oneshot(get_request("/projects", Some(&cookie))).await.unwrap();
        let listing = body_text(response).await;
        assert!(listing.contains(r#"<a href="/projects/Tower%20A">Tower A</a>"#));

        let response = app.clone().oneshot(get_request("/projects/Tower%20A", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail = body_text(response).await;
        assert!(detail.contains("AcmeCo"));
        assert!(detail.contains("RM 150000.00"));
        assert!(detail.contains("Piling: 40%"));

        let response = app.clone().oneshot(get_request("/projects/Tower%20A/report", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let pdf = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(dir.path().join("projects/Tower A/project_report.pdf").exists());

        let response = app.oneshot(get_request("/projects/Nowhere", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_project_named_new_is_viewable() {
        let dir = TempDir::new().unwrap();
        let app = build_router(AppState::from_config(test_config(&dir)).unwrap());
        let cookie = login(&app).await;

        let project = "name=new&client=SecretClient&contract_value=10&location=KL\
                       &start_date=2024-01-01&end_date=2024-12-31";
        let response = app.clone().oneshot(form("/projects", project, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/projects/new?message="));

        let response = app.clone().oneshot(get_request(&target, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail = body_text(response).await;
        assert!(detail.contains("SecretClient"));
        assert!(!detail.contains(r#"action="/projects""#));

        let response = app.oneshot(get_request("/new-project", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"action="/projects""#));
    }
}
