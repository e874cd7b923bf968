//! The REST resources exposed by the ordering backend.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, STAFF_ROLES};

/// A CRUD resource on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Tables,
    Products,
    Orders,
    Users,
    Roles,
    PaymentMethods,
    Promotions,
    Posts,
    AuditLogs,
}

impl Resource {
    pub const ALL: &'static [Resource] = &[
        Resource::Tables,
        Resource::Products,
        Resource::Orders,
        Resource::Users,
        Resource::Roles,
        Resource::PaymentMethods,
        Resource::Promotions,
        Resource::Posts,
        Resource::AuditLogs,
    ];

    /// URL path segment under the API base, e.g. `payment-methods`.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Tables => "tables",
            Resource::Products => "products",
            Resource::Orders => "orders",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::PaymentMethods => "payment-methods",
            Resource::Promotions => "promotions",
            Resource::Posts => "posts",
            Resource::AuditLogs => "audit-logs",
        }
    }

    /// Singular human-readable entity name used in error messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            Resource::Tables => "Table",
            Resource::Products => "Product",
            Resource::Orders => "Order",
            Resource::Users => "User",
            Resource::Roles => "Role",
            Resource::PaymentMethods => "Payment method",
            Resource::Promotions => "Promotion",
            Resource::Posts => "Post",
            Resource::AuditLogs => "Audit log",
        }
    }

    /// Roles allowed to manage this resource. Empty means any logged-in user.
    pub fn allowed_roles(self) -> &'static [&'static str] {
        match self {
            Resource::Users | Resource::Roles | Resource::AuditLogs => &[ROLE_ADMIN],
            Resource::Tables | Resource::PaymentMethods | Resource::Promotions => STAFF_ROLES,
            Resource::Products | Resource::Orders | Resource::Posts => &[],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = CoreError;

    /// Accepts the path form (`payment-methods`), snake case
    /// (`payment_methods`) and the squashed form (`paymentmethods`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Resource::ALL
            .iter()
            .copied()
            .find(|resource| resource.path().replace('-', "") == wanted)
            .ok_or_else(|| CoreError::Validation(format!("Unknown resource: {s}")))
    }
}
