//! Session store behaviour against scripted auth backends and storage.
//!
//! Covers restoring from storage, the claim/profile merge order, login and
//! register persistence, failure isolation and logout.

mod common;

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use common::mint_token;
use resto_client::auth::AuthBackend;
use resto_client::error::{ClientError, ClientResult};
use resto_client::session::{Session, SessionStore, TOKEN_KEY, USER_KEY};
use resto_client::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
use resto_core::auth::{Credentials, RegisterRequest};
use resto_core::types::Identifier;
use resto_core::user::SessionUser;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Auth backend that replays a fixed outcome.
struct ScriptedAuth {
    outcome: Mutex<Option<ClientResult<String>>>,
}

impl ScriptedAuth {
    fn issuing(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Some(Ok(token.into()))),
        })
    }

    fn rejecting(status: u16) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Some(Err(ClientError::Api {
                status,
                body: "rejected".into(),
            }))),
        })
    }

    fn next(&self) -> ClientResult<String> {
        self.outcome
            .lock()
            .unwrap()
            .take()
            .expect("auth backend called more often than scripted")
    }
}

#[async_trait]
impl AuthBackend for ScriptedAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> ClientResult<String> {
        self.next()
    }

    async fn register(&self, _request: &RegisterRequest) -> ClientResult<String> {
        self.next()
    }
}

/// Storage whose writes always fail.
#[derive(Default)]
struct ReadOnlyStorage {
    inner: MemoryStorage,
}

impl KeyValueStorage for ReadOnlyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: "read-only".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: "read-only".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Storage that accepts everything except writes of the profile entry.
#[derive(Default)]
struct ProfileRejectingStorage {
    inner: MemoryStorage,
}

impl KeyValueStorage for ProfileRejectingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == USER_KEY {
            return Err(StorageError::Io {
                path: "profile".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

fn stored_user(storage: &MemoryStorage) -> Option<SessionUser> {
    storage
        .get(USER_KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).expect("stored profile must be valid JSON"))
}

/// Store already logged in as `ana` with a profile and a token.
fn logged_in_store(storage: Arc<MemoryStorage>, auth: Arc<dyn AuthBackend>) -> SessionStore {
    let token = mint_token(json!({ "username": "ana", "role": "CLIENTE" }));
    storage.set(TOKEN_KEY, &token).unwrap();
    storage
        .set(USER_KEY, r#"{"username":"ana","email":"ana@example.com"}"#)
        .unwrap();
    SessionStore::load(auth, storage)
}

// ---------------------------------------------------------------------------
// Restoring from storage
// ---------------------------------------------------------------------------

/// Claims override the stored profile only on keys they carry.
#[test]
fn test_claims_override_profile_on_conflicting_keys_only() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, r#"{"username":"a","email":"x"}"#).unwrap();
    storage
        .set(TOKEN_KEY, &mint_token(json!({ "username": "b" })))
        .unwrap();

    let store = SessionStore::load(ScriptedAuth::rejecting(500), storage);

    let user = store.user().expect("user must be present");
    assert_eq!(user.username.as_deref(), Some("b"));
    assert_eq!(user.email.as_deref(), Some("x"));
}

/// A persisted token without a profile still yields a user built from claims.
#[test]
fn test_token_without_profile_uses_claims_alone() {
    let storage = Arc::new(MemoryStorage::new());
    let token = mint_token(json!({ "sub": "12", "role": "ADMIN", "email": "root@example.com" }));
    storage.set(TOKEN_KEY, &token).unwrap();

    let store = SessionStore::load(ScriptedAuth::rejecting(500), storage);

    let session = store.snapshot();
    assert_eq!(session.token.as_deref(), Some(token.as_str()));
    let user = session.user.as_ref().unwrap();
    assert_eq!(user.id, Some(Identifier::Text("12".into())));
    assert_eq!(user.role.as_deref(), Some("ADMIN"));
    assert_eq!(user.email.as_deref(), Some("root@example.com"));
    assert_eq!(user.username, None);
}

/// A token that carries no decodable claims and no profile gives an empty
/// user record, not an absent one.
#[test]
fn test_opaque_token_without_profile_gives_empty_user() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(TOKEN_KEY, "not-a-jwt").unwrap();

    let store = SessionStore::load(ScriptedAuth::rejecting(500), storage);

    assert!(store.is_authenticated());
    assert_eq!(store.user(), Some(SessionUser::default()));
}

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------

/// Successful login merges claims over the username fallback and persists
/// both entries.
#[tokio::test]
async fn test_login_merges_fallback_with_claims_and_persists() {
    let token = mint_token(json!({ "role": "ADMIN" }));
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::load(ScriptedAuth::issuing(token.clone()), storage.clone());

    let session = store
        .login(&Credentials::new("bob", "pw"))
        .await
        .expect("login should succeed");

    let user = session.user.as_ref().unwrap();
    assert_eq!(user.username.as_deref(), Some("bob"));
    assert_eq!(user.role.as_deref(), Some("ADMIN"));

    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some(token.as_str()));
    assert_eq!(stored_user(&storage).as_ref(), Some(user));
    assert_eq!(*store.snapshot(), *session);
}

/// A rejected login propagates the backend error and changes nothing.
#[tokio::test]
async fn test_rejected_login_leaves_session_untouched() {
    let storage = Arc::new(MemoryStorage::new());
    let store = logged_in_store(storage.clone(), ScriptedAuth::rejecting(401));
    let before = store.snapshot();
    let stored_token_before = storage.get(TOKEN_KEY).unwrap();

    let result = store.login(&Credentials::new("bob", "wrong")).await;

    assert_matches!(result, Err(ClientError::Api { status: 401, .. }));
    assert_eq!(*store.snapshot(), *before);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), stored_token_before);
    assert_eq!(stored_user(&storage).unwrap().username.as_deref(), Some("ana"));
}

/// A token with no decodable claims still logs in with the fallback profile.
#[tokio::test]
async fn test_login_with_opaque_token_keeps_fallback() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::load(ScriptedAuth::issuing("opaque"), storage.clone());

    let session = store.login(&Credentials::new("bob", "pw")).await.unwrap();

    assert_eq!(session.token.as_deref(), Some("opaque"));
    assert_eq!(session.user, Some(SessionUser::with_username("bob")));
}

/// Registration falls back on `{username, email, role_id}`; claims win where
/// present.
#[tokio::test]
async fn test_register_merges_fallback_with_claims() {
    let token = mint_token(json!({ "id": 99, "role": "CLIENTE", "rolId": 3 }));
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::load(ScriptedAuth::issuing(token), storage.clone());

    let request = RegisterRequest {
        username: "ana".into(),
        email: "ana@example.com".into(),
        password: "pw".into(),
        role_id: Identifier::Number(2),
    };
    let session = store.register(&request).await.expect("register should succeed");

    let user = session.user.as_ref().unwrap();
    assert_eq!(user.id, Some(Identifier::Number(99)));
    assert_eq!(user.username.as_deref(), Some("ana"));
    assert_eq!(user.email.as_deref(), Some("ana@example.com"));
    assert_eq!(user.role.as_deref(), Some("CLIENTE"));
    assert_eq!(user.role_id, Some(Identifier::Number(3)));
    assert_eq!(stored_user(&storage).as_ref(), Some(user));
}

/// A failed registration propagates unchanged.
#[tokio::test]
async fn test_rejected_register_propagates() {
    let store = SessionStore::load(ScriptedAuth::rejecting(409), Arc::new(MemoryStorage::new()));
    let request = RegisterRequest {
        username: "taken".into(),
        email: "t@example.com".into(),
        password: "pw".into(),
        role_id: Identifier::Number(2),
    };

    assert_matches!(
        store.register(&request).await,
        Err(ClientError::Api { status: 409, .. })
    );
    assert_eq!(*store.snapshot(), Session::default());
}

/// When storage refuses the write, login fails and memory is unchanged.
#[tokio::test]
async fn test_storage_failure_during_login_keeps_previous_session() {
    let token = mint_token(json!({ "role": "ADMIN" }));
    let store = SessionStore::load(
        ScriptedAuth::issuing(token),
        Arc::new(ReadOnlyStorage::default()),
    );

    let result = store.login(&Credentials::new("bob", "pw")).await;

    assert_matches!(result, Err(ClientError::Storage(_)));
    assert_eq!(*store.snapshot(), Session::default());
}

/// A failed profile write puts the previous token back, so a restart never
/// pairs the old profile with the new account's claims.
#[tokio::test]
async fn test_failed_profile_write_restores_previous_token() {
    let storage = Arc::new(ProfileRejectingStorage::default());
    let ana_token = mint_token(json!({ "username": "ana", "role": "CLIENTE" }));
    storage.inner.set(TOKEN_KEY, &ana_token).unwrap();
    storage
        .inner
        .set(USER_KEY, r#"{"id":1,"username":"ana","email":"ana@example.com"}"#)
        .unwrap();

    let bob_token = mint_token(json!({ "role": "ADMIN" }));
    let store = SessionStore::load(ScriptedAuth::issuing(bob_token), storage.clone());
    let before = store.snapshot();

    let result = store.login(&Credentials::new("bob", "pw")).await;

    assert_matches!(result, Err(ClientError::Storage(_)));
    assert_eq!(*store.snapshot(), *before);
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some(ana_token.as_str()));

    let restarted = SessionStore::load(ScriptedAuth::rejecting(500), storage);
    let user = restarted.user().unwrap();
    assert_eq!(user.username.as_deref(), Some("ana"));
    assert_eq!(user.role.as_deref(), Some("CLIENTE"));
}

/// Without a previous session, a failed profile write leaves no token behind.
#[tokio::test]
async fn test_failed_profile_write_without_previous_session_removes_token() {
    let storage = Arc::new(ProfileRejectingStorage::default());
    let store = SessionStore::load(
        ScriptedAuth::issuing(mint_token(json!({ "role": "ADMIN" }))),
        storage.clone(),
    );

    assert_matches!(
        store.login(&Credentials::new("bob", "pw")).await,
        Err(ClientError::Storage(_))
    );
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert!(!store.is_authenticated());
}

/// A corrupt session file does not block logging in; the write replaces it.
#[tokio::test]
async fn test_login_repairs_corrupt_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = FileStorage::in_dir(dir.path());
    std::fs::write(file.path(), "{ truncated").unwrap();

    let token = mint_token(json!({ "role": "ADMIN" }));
    let store = SessionStore::load(ScriptedAuth::issuing(token.clone()), Arc::new(file));
    assert!(!store.is_authenticated());

    store
        .login(&Credentials::new("bob", "pw"))
        .await
        .expect("login should replace the corrupt file");

    let restarted = SessionStore::load(
        ScriptedAuth::rejecting(500),
        Arc::new(FileStorage::in_dir(dir.path())),
    );
    assert_eq!(restarted.token().as_deref(), Some(token.as_str()));
    assert_eq!(restarted.user().unwrap().username.as_deref(), Some("bob"));
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout clears memory and both storage keys regardless of prior state.
#[test]
fn test_logout_clears_memory_and_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let store = logged_in_store(storage.clone(), ScriptedAuth::rejecting(500));
    assert!(store.is_authenticated());

    store.logout();

    assert_eq!(store.token(), None);
    assert_eq!(store.user(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);

    // Logging out twice is harmless.
    store.logout();
    assert_eq!(*store.snapshot(), Session::default());
}

/// Logout cannot fail, even when storage refuses to delete.
#[test]
fn test_logout_tolerates_storage_failure() {
    let store = SessionStore::load(
        ScriptedAuth::rejecting(500),
        Arc::new(ReadOnlyStorage::default()),
    );
    store.logout();
    assert_eq!(*store.snapshot(), Session::default());
}

/// Snapshots taken before an operation are not affected by it.
#[tokio::test]
async fn test_snapshots_are_immutable() {
    let storage = Arc::new(MemoryStorage::new());
    let store = logged_in_store(storage, ScriptedAuth::rejecting(500));
    let before = store.snapshot();

    store.logout();

    assert!(before.is_authenticated());
    assert_eq!(
        before.user.as_ref().unwrap().email.as_deref(),
        Some("ana@example.com")
    );
}
