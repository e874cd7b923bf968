//! Generic CRUD client for the backend's resources.
//!
//! Each list/form view of the back-office maps onto the same five calls
//! against `/{resource}` and `/{resource}/{id}`; rows are kept as raw JSON
//! because the client does not interpret them.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use resto_core::error::CoreError;
use resto_core::pagination::{Page, PageQuery};
use resto_core::resource::Resource;
use resto_core::types::Identifier;

use crate::api::RestoApi;
use crate::error::{ClientError, ClientResult};
use crate::search::SearchDebouncer;
use crate::session::SessionStore;

/// CRUD operations on one [`Resource`].
///
/// The bearer token is read from the session on every call, so a client
/// created before login picks up the token once the user logs in. Without a
/// token, requests go out anonymously and the backend decides.
pub struct ResourceClient {
    api: RestoApi,
    session: Arc<SessionStore>,
    resource: Resource,
}

impl ResourceClient {
    pub fn new(api: RestoApi, session: Arc<SessionStore>, resource: Resource) -> Self {
        Self {
            api,
            session,
            resource,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// `GET /{resource}?page=&size=&search=`
    pub async fn list(&self, query: &PageQuery) -> ClientResult<Page<Value>> {
        let token = self.session.token();
        let body: Value = self
            .api
            .get_json(self.resource.path(), &query.to_query_pairs(), token.as_deref())
            .await?;
        let page = Page::from_value(body, query)?;
        tracing::debug!(
            resource = %self.resource,
            page = page.page,
            rows = page.items.len(),
            total = page.total,
            "Listed resource page"
        );
        Ok(page)
    }

    /// Wait out the debounce window for `query.search`, then list if the term
    /// was not superseded. Returns `None` when a newer search won.
    pub async fn search_debounced(
        &self,
        debouncer: &SearchDebouncer,
        query: PageQuery,
    ) -> ClientResult<Option<Page<Value>>> {
        let term = query.search.clone().unwrap_or_default();
        if debouncer.settle(term).await.is_none() {
            return Ok(None);
        }
        self.list(&query).await.map(Some)
    }

    /// `GET /{resource}/{id}`
    pub async fn get(&self, id: &Identifier) -> ClientResult<Value> {
        let token = self.session.token();
        let body: Value = self
            .api
            .get_json(&self.item_path(id), &[], token.as_deref())
            .await
            .map_err(|e| self.not_found(e, id))?;
        Ok(unwrap_data(body))
    }

    /// `POST /{resource}`
    pub async fn create(&self, body: &Value) -> ClientResult<Value> {
        let token = self.session.token();
        let created: Value = self
            .api
            .send_json(Method::POST, self.resource.path(), body, token.as_deref())
            .await?;
        tracing::info!(resource = %self.resource, "Created entry");
        Ok(unwrap_data(created))
    }

    /// `PUT /{resource}/{id}`
    pub async fn update(&self, id: &Identifier, body: &Value) -> ClientResult<Value> {
        let token = self.session.token();
        let updated: Value = self
            .api
            .send_json(Method::PUT, &self.item_path(id), body, token.as_deref())
            .await
            .map_err(|e| self.not_found(e, id))?;
        tracing::info!(resource = %self.resource, id = %id, "Updated entry");
        Ok(unwrap_data(updated))
    }

    /// `DELETE /{resource}/{id}`
    pub async fn delete(&self, id: &Identifier) -> ClientResult<()> {
        let token = self.session.token();
        self.api
            .delete(&self.item_path(id), token.as_deref())
            .await
            .map_err(|e| self.not_found(e, id))?;
        tracing::info!(resource = %self.resource, id = %id, "Deleted entry");
        Ok(())
    }

    fn item_path(&self, id: &Identifier) -> String {
        format!("{}/{}", self.resource.path(), id)
    }

    /// Turn a 404 from an item endpoint into [`CoreError::NotFound`].
    fn not_found(&self, error: ClientError, id: &Identifier) -> ClientError {
        match error.status() {
            Some(404) => ClientError::Core(CoreError::NotFound {
                entity: self.resource.entity_name(),
                id: id.to_string(),
            }),
            _ => error,
        }
    }
}

/// Strip a `{ "data": ... }` envelope if the body is exactly that.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
