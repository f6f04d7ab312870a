use serde::Deserialize;
use chrono::NaiveDate;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

// Browsers submit `<input type="date">` as YYYY-MM-DD, which NaiveDate parses directly.
#[derive(Debug, Deserialize)]
pub struct ProjectForm {
    pub name: String,
    pub client: String,
    pub contract_value: f64,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    pub element: String,
    pub percent: f64,
}

/// Inline status messages carried in the query string after a redirect.
#[derive(Debug, Deserialize, Default)]
pub struct Notice {
    pub error: Option<String>,
    pub message: Option<String>,
    pub warning: Option<String>,
}
