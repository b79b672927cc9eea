//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{EmailAddress, UserValidationError};

/// Minimum allowed length for a newly chosen password.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or not a valid address.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` satisfies the [`EmailAddress`] rules and is lowercased.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address suitable for user lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Domain error returned when a newly chosen password is unacceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password was blank.
    Empty,
    /// Password fell below the minimum length.
    TooShort { min: usize },
    /// Password and confirmation did not match.
    ConfirmationMismatch,
}

impl fmt::Display for PasswordPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "password must not be empty"),
            Self::TooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::ConfirmationMismatch => {
                write!(f, "password confirmation does not match")
            }
        }
    }
}

impl std::error::Error for PasswordPolicyError {}

/// Newly chosen password awaiting hashing.
///
/// Sign-up and password changes go through this type so the length and
/// confirmation rules are enforced in one place. The clear text is held in
/// zeroizing storage and only read once by the password vault.
#[derive(Debug, Clone)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a chosen password against its confirmation.
    pub fn try_from_parts(
        password: &str,
        confirmation: &str,
    ) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(PasswordPolicyError::TooShort { min: PASSWORD_MIN });
        }
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }

        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Clear-text password for one-time hashing.
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}
