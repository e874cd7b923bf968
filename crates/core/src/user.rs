//! The identity record held by a session.
//!
//! A [`SessionUser`] is assembled from two partial sources: a profile cached
//! in persistent storage and the claims embedded in the bearer token. Every
//! field is therefore optional, and the two sources are combined with
//! [`SessionUser::merged_with`].

use serde::{Deserialize, Serialize};

use crate::types::Identifier;

/// Who is logged in, as far as the client knows.
///
/// Serialized with the wire keys the backend uses (`rolId` for the role id);
/// `roleId` is accepted on input as well because registration payloads
/// spell it that way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        rename = "rolId",
        alias = "roleId",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_id: Option<Identifier>,
}

impl SessionUser {
    /// A record carrying only a username.
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// Shallow merge: every field present in `overlay` replaces the field in
    /// `self`; fields absent from `overlay` keep their current value.
    pub fn merged_with(&self, overlay: &SessionUser) -> SessionUser {
        SessionUser {
            id: overlay.id.clone().or_else(|| self.id.clone()),
            email: overlay.email.clone().or_else(|| self.email.clone()),
            username: overlay.username.clone().or_else(|| self.username.clone()),
            role: overlay.role.clone().or_else(|| self.role.clone()),
            role_id: overlay.role_id.clone().or_else(|| self.role_id.clone()),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.email.is_none()
            && self.username.is_none()
            && self.role.is_none()
            && self.role_id.is_none()
    }

    /// Case-insensitive role comparison.
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(role))
    }
}
