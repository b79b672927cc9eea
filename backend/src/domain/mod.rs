//! Domain primitives, the access-control policy, and ports.
//!
//! Purpose: define strongly typed domain entities used by the inbound and
//! persistence layers. Keep types immutable and document invariants in each
//! type's Rustdoc. Nothing in this module knows about HTTP or Diesel.

pub mod auth;
pub mod error;
pub mod password;
pub mod policy;
pub mod ports;
pub mod user;

pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PASSWORD_MIN, PasswordPolicyError,
};
pub use self::error::{Error, ErrorCode};
pub use self::password::{PasswordVault, PasswordVaultError};
pub use self::policy::{Decision, DenyReason, UserAction, evaluate};
pub use self::user::{
    DisplayName, EmailAddress, PasswordHash, User, UserId, UserValidationError,
};

/// Convenient result alias for fallible domain and adapter operations.
pub type ApiResult<T> = Result<T, Error>;
