#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Deserialize;
use serde_json::{json, Value};

/// Sign a token carrying `claims` the way the backend does (HS256).
pub fn mint_token(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-test-secret"),
    )
    .expect("encoding should succeed")
}

/// Requests observed by the fake backend.
#[derive(Debug, Default)]
pub struct Recorded {
    pub authorization: Vec<Option<String>>,
    pub queries: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub recorded: Arc<Mutex<Recorded>>,
}

impl FakeBackend {
    pub fn last_authorization(&self) -> Option<String> {
        self.recorded
            .lock()
            .unwrap()
            .authorization
            .last()
            .cloned()
            .flatten()
    }

    pub fn last_query(&self) -> Option<Value> {
        self.recorded.lock().unwrap().queries.last().cloned()
    }

    fn record(&self, headers: &HeaderMap, query: Option<Value>) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.authorization.push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        );
        if let Some(query) = query {
            recorded.queries.push(query);
        }
    }
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
    role_id: Value,
}

async fn login(Json(body): Json<LoginBody>) -> impl IntoResponse {
    if body.username == "bob" && body.password == "pw" {
        let token = mint_token(json!({ "role": "ADMIN", "sub": "7", "exp": 4_102_444_800i64 }));
        (StatusCode::OK, Json(json!({ "token": token })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid username or password", "code": "UNAUTHORIZED" })),
        )
    }
}

async fn register(Json(body): Json<RegisterBody>) -> impl IntoResponse {
    if body.username == "taken" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Username already exists", "code": "CONFLICT" })),
        );
    }
    let token = mint_token(json!({
        "id": 99,
        "username": body.username,
        "role": "CLIENTE",
        "rolId": body.role_id,
    }));
    (
        StatusCode::CREATED,
        Json(json!({ "accessToken": token, "type": "Bearer" })),
    )
}

async fn list_products(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(query): Query<serde_json::Map<String, Value>>,
) -> Json<Value> {
    backend.record(&headers, Some(Value::Object(query)));
    Json(json!({
        "content": [
            { "id": 1, "name": "Pizza margherita" },
            { "id": 2, "name": "Pizza napolitana" },
        ],
        "totalElements": 5,
        "totalPages": 3,
        "number": 0,
        "size": 2,
    }))
}

async fn list_posts(State(backend): State<FakeBackend>, headers: HeaderMap) -> Json<Value> {
    backend.record(&headers, None);
    Json(json!([{ "id": 1, "title": "Nuevo menú" }]))
}

async fn list_orders(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> impl IntoResponse {
    backend.record(&headers, None);
    if headers.get("authorization").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Missing token" })));
    }
    (StatusCode::OK, Json(json!({ "data": [{ "id": 10, "total": 25.5 }], "total": 1 })))
}

async fn get_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    backend.record(&headers, None);
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })));
    }
    (StatusCode::OK, Json(json!({ "data": { "id": id, "name": "Pizza" } })))
}

async fn create_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    backend.record(&headers, None);
    body["id"] = json!(3);
    (StatusCode::CREATED, Json(body))
}

async fn update_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Json<Value> {
    backend.record(&headers, None);
    body["id"] = json!(id);
    Json(body)
}

async fn delete_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    backend.record(&headers, None);
    if id == 404 {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

/// Start the fake backend on an ephemeral port and return its API base URL.
pub async fn spawn_backend() -> (String, FakeBackend) {
    let backend = FakeBackend::default();

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/posts", get(list_posts))
        .route("/orders", get(list_orders))
        .with_state(backend.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });

    (format!("http://{addr}/api"), backend)
}
