//! Credential hashing built on Argon2id.
//!
//! Centralising the hashing primitives in one type guarantees consistent
//! parameter choices across sign-up, password changes, and verification.

use argon2::password_hash::{PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, ParamsBuilder, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::domain::user::{PasswordHash, UserValidationError};

/// Errors raised while hashing or verifying credentials.
#[derive(Debug, Error)]
pub enum PasswordVaultError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing error: {0}")]
    Hashing(String),
}

impl From<argon2::password_hash::Error> for PasswordVaultError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl From<UserValidationError> for PasswordVaultError {
    fn from(err: UserValidationError) -> Self {
        Self::Hashing(err.to_string())
    }
}

/// Argon2id hashing service for password credentials.
#[derive(Debug, Clone)]
pub struct PasswordVault {
    argon2: Argon2<'static>,
}

impl PasswordVault {
    /// Defaults target ~64 MiB memory and 3 iterations, a solid baseline for
    /// servers without dedicated tuning.
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = 16;

    /// Build a vault with the default Argon2id parameters.
    pub fn new() -> Result<Self, PasswordVaultError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| PasswordVaultError::InvalidParams(err.to_string()))?;
        Ok(Self::with_params(params))
    }

    /// Build a vault with caller-specified parameters (useful for tests and
    /// constrained environments).
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        }
    }

    /// Hash a password with a freshly generated random salt.
    ///
    /// The salt comes from the `rand` crate's OS generator rather than
    /// `password_hash`'s optional rand shim, so minimal builds avoid the
    /// extra feature dependency.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, PasswordVaultError> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        Ok(PasswordHash::new(phc)?)
    }

    /// Verify a password against a stored hash.
    pub fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        let Ok(parsed) = PhcHash::new(stored.as_ref()) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_vault() -> PasswordVault {
    // Full-strength parameters make the suite crawl; 8 MiB is plenty here.
    let params = ParamsBuilder::new()
        .m_cost(8 * 1024)
        .t_cost(1)
        .p_cost(1)
        .output_len(32)
        .build()
        .expect("test Argon2 parameters");
    PasswordVault::with_params(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_passwords() {
        let vault = test_vault();
        let hash = vault.hash("correct horse").expect("hashing succeeds");
        assert!(vault.verify("correct horse", &hash));
        assert!(!vault.verify("battery staple", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let vault = test_vault();
        let first = vault.hash("same input").expect("hashing succeeds");
        let second = vault.hash("same input").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        let vault = test_vault();
        let stored = PasswordHash::new("not-a-phc-string").expect("non-empty");
        assert!(!vault.verify("anything", &stored));
    }
}
