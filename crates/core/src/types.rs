use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend primary keys are numeric.
pub type DbId = i64;

/// An identifier as it appears on the wire.
///
/// The backend and its tokens are not consistent about whether ids are
/// numbers or strings (`"sub"` is usually a string, `"id"` usually a
/// number), so both shapes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(DbId),
    Text(String),
}

impl Identifier {
    /// Read an identifier out of an arbitrary JSON value.
    ///
    /// Numbers that do not fit a [`DbId`] (huge or fractional) are kept
    /// as their literal text. Returns `None` for anything that is neither a
    /// number nor a string.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(id) => Identifier::Number(id),
                None => Identifier::Text(n.to_string()),
            }),
            serde_json::Value::String(s) => Some(Identifier::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<DbId> for Identifier {
    fn from(id: DbId) -> Self {
        Identifier::Number(id)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier::Text(id.to_string())
    }
}
