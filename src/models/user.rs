use serde::{Deserialize, Serialize};
use crate::config::PasswordScheme;

/// Stored credential. Verification dispatches on the scheme recorded with
/// the secret, so records written under an older scheme keep working.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "scheme", content = "value", rename_all = "lowercase")]
pub enum PasswordSecret {
    Plaintext(String),
    Bcrypt(String),
}

impl PasswordSecret {
    pub fn new(password: &str, scheme: PasswordScheme, bcrypt_cost: u32) -> Result<Self, bcrypt::BcryptError> {
        match scheme {
            PasswordScheme::Plaintext => Ok(PasswordSecret::Plaintext(password.to_string())),
            PasswordScheme::Bcrypt => Ok(PasswordSecret::Bcrypt(bcrypt::hash(password, bcrypt_cost)?)),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        match self {
            PasswordSecret::Plaintext(stored) => stored == password,
            // A corrupt hash is a failed login, not an error.
            PasswordSecret::Bcrypt(hash) => bcrypt::verify(password, hash).unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_secret: PasswordSecret,
}
