//! Access control policy for the Users resource.
//!
//! The policy is a pure function over the acting user, the requested action,
//! and the target account. Inbound adapters run it before any handler logic
//! executes and translate denials into redirects; nothing here touches the
//! session store or the repository, which keeps the rules trivially testable.

use std::fmt;

use crate::domain::user::{User, UserId};

/// Operation requested against the Users resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction<'a> {
    /// List all users.
    Index,
    /// View a single profile.
    Show { target: &'a UserId },
    /// Render the registration form.
    NewForm,
    /// Create a new account.
    Create,
    /// Render the edit form for an account.
    Edit { target: &'a UserId },
    /// Apply changes to an account.
    Update { target: &'a UserId },
    /// Delete an account.
    Destroy { target: &'a UserId },
}

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated session; the visitor must sign in first.
    Unauthenticated,
    /// The actor is signed in but targets somebody else's account.
    WrongUser,
    /// The action requires the administrator role.
    NotAdmin,
    /// Administrators may not delete their own account.
    SelfDeleteBlocked,
    /// Signed-in users may not reach the registration flow.
    AlreadyAuthenticated,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::WrongUser => "wrong-user",
            Self::NotAdmin => "non-admin",
            Self::SelfDeleteBlocked => "self-destroy-blocked",
            Self::AlreadyAuthenticated => "already-authenticated",
        };
        f.write_str(label)
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation must not execute; adapters redirect instead.
    Deny(DenyReason),
}

/// Evaluate the policy for `actor` attempting `action`.
///
/// Guards apply in order and the first match wins:
///
/// 1. Anonymous visitors are turned away from every protected action
///    (index, edit, update, destroy).
/// 2. Signed-in users may not reach the registration form or create
///    accounts.
/// 3. Edit and update are self-only; the administrator role grants no
///    exemption.
/// 4. Destroy requires the administrator role.
/// 5. Administrators never destroy their own account.
///
/// Profile pages (`Show`) are public, and registration is open to anonymous
/// visitors.
pub fn evaluate(actor: Option<&User>, action: UserAction<'_>) -> Decision {
    let Some(user) = actor else {
        return match action {
            UserAction::Index
            | UserAction::Edit { .. }
            | UserAction::Update { .. }
            | UserAction::Destroy { .. } => Decision::Deny(DenyReason::Unauthenticated),
            UserAction::Show { .. } | UserAction::NewForm | UserAction::Create => Decision::Allow,
        };
    };

    match action {
        UserAction::NewForm | UserAction::Create => {
            Decision::Deny(DenyReason::AlreadyAuthenticated)
        }
        UserAction::Edit { target } | UserAction::Update { target } if user.id() != target => {
            Decision::Deny(DenyReason::WrongUser)
        }
        UserAction::Destroy { .. } if !user.is_admin() => Decision::Deny(DenyReason::NotAdmin),
        UserAction::Destroy { target } if user.id() == target => {
            Decision::Deny(DenyReason::SelfDeleteBlocked)
        }
        _ => Decision::Allow,
    }
}
