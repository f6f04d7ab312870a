use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
    body::Body,
};
use tower_sessions::Session;

pub const USER_SESSION_KEY: &str = "user_session";

/// The logged-in user, attached to each authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

fn is_public(path: &str) -> bool {
    path == "/" || path == "/login" || path == "/register" || path.starts_with("/static/")
}

pub async fn require_auth(
    session: Session,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    match session.get::<String>(USER_SESSION_KEY).await {
        Ok(Some(username)) => {
            req.extensions_mut().insert(CurrentUser(username));
            next.run(req).await
        }
        Ok(None) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            Redirect::to("/").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/"));
        assert!(is_public("/login"));
        assert!(is_public("/static/style.css"));
        assert!(!is_public("/projects"));
        assert!(!is_public("/projects/Tower%20A/report"));
    }
}
