//! The seam between the session store and whatever issues tokens.

use async_trait::async_trait;
use resto_core::auth::{Credentials, RegisterRequest};

use crate::api::RestoApi;
use crate::error::ClientResult;

/// Issues bearer tokens.
///
/// Implementations must not retry or translate failures; the session store
/// hands them to its caller unchanged.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn authenticate(&self, credentials: &Credentials) -> ClientResult<String>;

    /// Create an account and return a bearer token for it.
    async fn register(&self, request: &RegisterRequest) -> ClientResult<String>;
}

#[async_trait]
impl AuthBackend for RestoApi {
    async fn authenticate(&self, credentials: &Credentials) -> ClientResult<String> {
        RestoApi::authenticate(self, credentials).await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        RestoApi::register(self, request).await
    }
}
