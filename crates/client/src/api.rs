//! HTTP client for the ordering backend's REST API.
//!
//! Every feature module reaches the backend through one [`RestoApi`], which
//! wraps a shared [`reqwest::Client`] (connection pooling, request timeout)
//! together with the API base URL. Authenticated calls take the bearer token
//! explicitly; the API layer itself holds no session state.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use resto_core::auth::{Credentials, RegisterRequest};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Path of the authentication endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "auth/login";
/// Path of the registration endpoint, relative to the API base URL.
pub const REGISTER_PATH: &str = "auth/register";

/// HTTP client for one backend.
#[derive(Debug, Clone)]
pub struct RestoApi {
    client: reqwest::Client,
    api_url: String,
}

/// Body returned by the authentication endpoints.
///
/// Some deployments answer with `{ "token": "..." }`, others with
/// `{ "accessToken": "..." }` or a bare JSON string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Bare(String),
    Object {
        #[serde(alias = "accessToken", alias = "access_token")]
        token: String,
    },
}

impl TokenResponse {
    fn into_token(self) -> String {
        match self {
            TokenResponse::Bare(token) | TokenResponse::Object { token } => token,
        }
    }
}

impl RestoApi {
    /// Create a client for `api_url` with reqwest defaults.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from configuration, applying the request timeout.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Sends `POST /auth/login`. Rejections are returned as
    /// [`ClientError::Api`] with the backend's status and body.
    pub async fn authenticate(&self, credentials: &Credentials) -> ClientResult<String> {
        tracing::debug!(username = %credentials.username, "Authenticating");
        let response: TokenResponse = self
            .send_json(Method::POST, LOGIN_PATH, credentials, None)
            .await?;
        Ok(response.into_token())
    }

    /// Create an account and receive a bearer token for it.
    ///
    /// Sends `POST /auth/register`.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        tracing::debug!(username = %request.username, "Registering account");
        let response: TokenResponse = self
            .send_json(Method::POST, REGISTER_PATH, request, None)
            .await?;
        Ok(response.into_token())
    }

    /// `GET {path}` with query parameters, decoding the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::GET, path, token)
            .query(query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Send `body` as JSON with the given method, decoding the JSON reply.
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let response = self.request(method, path, token).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// `DELETE {path}`, discarding any response body.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> ClientResult<()> {
        let response = self.request(Method::DELETE, path, token).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Pass 2xx responses through. Anything else becomes
    /// [`ClientError::Api`] carrying the backend's error body, which the
    /// ordering API uses for messages like "Invalid username or password".
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status, "Backend rejected request");
        Err(ClientError::Api { status, body })
    }

    /// Decode the JSON body of a successful reply.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
