use std::sync::Arc;
use crate::config::PasswordScheme;
use crate::errors::DirectoryError;
use crate::models::{PasswordSecret, UserRecord};
use crate::services::json_store::{decode_record, encode_record, Store};

/// Registration and credential checks over the user collection.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
    scheme: PasswordScheme,
    bcrypt_cost: u32,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>, scheme: PasswordScheme, bcrypt_cost: u32) -> Self {
        Self {
            store,
            scheme,
            bcrypt_cost,
        }
    }

    /// Adds a user. An existing username is reported as `AlreadyExists`
    /// and leaves the stored record untouched.
    pub fn register(&self, username: &str, password: &str) -> Result<(), DirectoryError> {
        if username.trim().is_empty() {
            return Err(DirectoryError::InvalidUsername("Username must not be empty".into()));
        }

        let _guard = self.store.write_guard()?;
        let mut users = self.store.load()?;

        if users.contains_key(username) {
            tracing::info!("Registration refused, user exists: {}", username);
            return Err(DirectoryError::AlreadyExists(username.to_string()));
        }

        let record = UserRecord {
            username: username.to_string(),
            password_secret: PasswordSecret::new(password, self.scheme, self.bcrypt_cost)?,
        };
        let value = encode_record(self.store.as_ref(), username, &record)?;
        users.insert(username.to_string(), value);
        self.store.save(&users)?;

        tracing::info!("Registered user: {}", username);
        Ok(())
    }

    /// True only for a known user with a matching password. Unknown users
    /// and wrong passwords are deliberately indistinguishable.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool, DirectoryError> {
        let verified = self
            .get(username)?
            .map(|user| user.password_secret.verify(password))
            .unwrap_or(false);

        tracing::debug!("Authentication for {}: {}", username, if verified { "accepted" } else { "rejected" });
        Ok(verified)
    }

    pub fn get(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let mut users = self.store.load()?;
        match users.remove(username) {
            Some(value) => Ok(Some(decode_record(self.store.as_ref(), username, value)?)),
            None => Ok(None),
        }
    }
}
