mod auth;

pub use auth::{require_auth, CurrentUser, USER_SESSION_KEY};
