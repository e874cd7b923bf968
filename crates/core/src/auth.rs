//! Request payloads for the authentication endpoints.

use std::fmt;

use serde::Serialize;
use validator::Validate;

use crate::types::Identifier;
use crate::user::SessionUser;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Profile to fall back on when the issued token carries no claims.
    pub fn fallback_user(&self) -> SessionUser {
        SessionUser::with_username(self.username.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub role_id: Identifier,
}

impl RegisterRequest {
    /// Profile to fall back on when the issued token carries no claims.
    pub fn fallback_user(&self) -> SessionUser {
        SessionUser {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            role_id: Some(self.role_id.clone()),
            ..SessionUser::default()
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .finish()
    }
}
