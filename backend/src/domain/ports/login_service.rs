//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. HTTP handler tests substitute a test double instead of
//! wiring a repository.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::password::PasswordVault;
use crate::domain::user::User;

use super::user_repository::{UserPersistenceError, UserRepository};

/// Message shown for every credential failure, so responses do not reveal
/// whether the email exists.
pub const INVALID_CREDENTIALS: &str = "Invalid email/password combination";

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Repository-backed authenticator verifying Argon2id password hashes.
#[derive(Clone)]
pub struct PasswordLoginService {
    users: Arc<dyn UserRepository>,
    vault: PasswordVault,
}

impl PasswordLoginService {
    /// Create a new service over the given repository and vault.
    pub fn new(users: Arc<dyn UserRepository>, vault: PasswordVault) -> Self {
        Self { users, vault }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email during lookup: {email}"))
        }
    }
}

#[async_trait]
impl LoginService for PasswordLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if self.vault.verify(credentials.password(), user.password_hash()) {
            Ok(user)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}
