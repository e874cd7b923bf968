//! Domain types shared by the restaurant-ordering client crates.
//!
//! Nothing in here performs I/O: token claim decoding, the session user
//! record, role checks, resource descriptors and pagination types.

pub mod access;
pub mod auth;
pub mod claims;
pub mod error;
pub mod pagination;
pub mod resource;
pub mod roles;
pub mod types;
pub mod user;
