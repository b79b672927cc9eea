//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::PasswordVault;
use crate::domain::ports::{LoginService, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User store behind the Users resource.
    pub users: Arc<dyn UserRepository>,
    /// Credential verification use-case.
    pub login: Arc<dyn LoginService>,
    /// Hashing service for sign-up and password changes.
    pub vault: PasswordVault,
}

impl HttpState {
    /// Construct state from its port implementations.
    pub fn new(
        users: Arc<dyn UserRepository>,
        login: Arc<dyn LoginService>,
        vault: PasswordVault,
    ) -> Self {
        Self {
            users,
            login,
            vault,
        }
    }
}
