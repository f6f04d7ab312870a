use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub report: ReportConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub users_file: PathBuf,
    pub projects_file: PathBuf,
    pub projects_dir: PathBuf,
    #[serde(default)]
    pub single_writer: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    Plaintext,
    Bcrypt,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub password_scheme: PasswordScheme,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub currency_label: String,
    pub file_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_form_size: usize,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_parse_toml_config() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [storage]
            users_file = "data/users.json"
            projects_file = "data/projects.json"
            projects_dir = "data/projects"

            [auth]
            password_scheme = "plaintext"

            [report]
            currency_label = "RM"
            file_name = "project_report.pdf"

            [upload]
            max_form_size = 1024
        "#;

        let config: Config = config::Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.users_file, PathBuf::from("data/users.json"));
        assert!(!config.storage.single_writer);
        assert_eq!(config.auth.password_scheme, PasswordScheme::Plaintext);
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.report.currency_label, "RM");
    }
}
