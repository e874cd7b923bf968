//! Client library for the restaurant-ordering REST API.
//!
//! Provides the HTTP client wrapper, the session store (token + profile,
//! persisted across restarts), typed CRUD access to the backend resources and
//! search debouncing. Front ends build one [`context::AppContext`] at startup
//! and pass it down.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod resources;
pub mod search;
pub mod session;
pub mod storage;
