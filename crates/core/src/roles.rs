//! Well-known role names.
//!
//! Role names are compared case-insensitively everywhere; the backend
//! issues them upper-case.

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_EMPLOYEE: &str = "EMPLEADO";
pub const ROLE_CUSTOMER: &str = "CLIENTE";

/// Roles allowed to reach the administrative back-office.
pub const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EMPLOYEE];
