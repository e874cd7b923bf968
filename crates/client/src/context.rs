//! Explicit application context and a task-scoped session provider.
//!
//! [`AppContext`] is built once at startup and passed down by value (it is
//! cheap to clone). Code that cannot take the context as a parameter can run
//! inside [`scope`] and fetch the store with [`current`], which fails with
//! [`ClientError::OutsideSessionScope`] when no scope is active.

use std::future::Future;
use std::sync::Arc;

use resto_core::resource::Resource;

use crate::api::RestoApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::resources::ResourceClient;
use crate::search::SearchDebouncer;
use crate::session::SessionStore;
use crate::storage::KeyValueStorage;

tokio::task_local! {
    static SESSION: Arc<SessionStore>;
}

/// Everything a front end needs to talk to the backend.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    /// Shared HTTP client.
    pub api: RestoApi,
    pub session: Arc<SessionStore>,
}

impl AppContext {
    /// Wire up the HTTP client and restore the session from `storage`.
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStorage>) -> ClientResult<Self> {
        let api = RestoApi::from_config(&config)?;
        let session = Arc::new(SessionStore::load(Arc::new(api.clone()), storage));
        Ok(Self {
            config: Arc::new(config),
            api,
            session,
        })
    }

    /// CRUD client for one resource, authenticated with the current session.
    pub fn resource(&self, resource: Resource) -> ResourceClient {
        ResourceClient::new(self.api.clone(), Arc::clone(&self.session), resource)
    }

    /// Debouncer configured with the search quiet period.
    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(self.config.search_debounce())
    }
}

/// Run `future` with `store` available through [`current`].
pub async fn scope<F: Future>(store: Arc<SessionStore>, future: F) -> F::Output {
    SESSION.scope(store, future).await
}

/// The session store of the enclosing [`scope`].
pub fn current() -> ClientResult<Arc<SessionStore>> {
    SESSION
        .try_with(Arc::clone)
        .map_err(|_| ClientError::OutsideSessionScope)
}
