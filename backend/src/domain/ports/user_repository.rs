//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns this email address.
        DuplicateEmail { email: String } => "email address already taken: {email}",
    }
}

/// Driven port for the user store.
///
/// Adapters translate between their storage models and the domain [`User`];
/// no business rules live behind this trait. The policy layer is the only
/// authority on who may call which operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the email is
    /// already taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace an existing user record.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by their unique email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// List all users ordered by display name.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Delete a user record, reporting whether a record existed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Count stored user records.
    async fn count(&self) -> Result<u64, UserPersistenceError>;
}
