//! Role-based access checks for views and commands.
//!
//! A guard receives the current user (if any) and an allow-list of role
//! names. Role names are compared case-insensitively. An empty allow-list
//! admits any authenticated user.

use crate::error::CoreError;
use crate::user::SessionUser;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Nobody is logged in; the caller should send the user to the login view.
    Unauthenticated,
    /// Logged in, but the role is not on the allow-list.
    Forbidden,
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }

    /// Convert into a `Result`, mapping denials onto [`CoreError`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Access::Granted => Ok(()),
            Access::Unauthenticated => Err(CoreError::Unauthorized("Login required".into())),
            Access::Forbidden => Err(CoreError::Forbidden(
                "Your role does not grant access to this resource".into(),
            )),
        }
    }
}

/// Decide whether `user` may enter a view restricted to `allowed` roles.
pub fn check_access(user: Option<&SessionUser>, allowed: &[&str]) -> Access {
    let Some(user) = user else {
        return Access::Unauthenticated;
    };

    if allowed.is_empty() {
        return Access::Granted;
    }

    if allowed.iter().any(|role| user.has_role(role)) {
        Access::Granted
    } else {
        Access::Forbidden
    }
}
