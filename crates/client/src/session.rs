//! Session store: the single source of truth for who is logged in.
//!
//! The current [`Session`] is computed from two sources: a profile cached in
//! [`KeyValueStorage`] and the claims embedded in the bearer token. Claims
//! win on every key they carry. A session is never mutated in place; each
//! `login`, `register` and `logout` publishes a fresh `Arc<Session>`, and
//! readers only ever see whole snapshots.
//!
//! Persisted layout:
//!
//! | Key         | Value                                   |
//! |-------------|-----------------------------------------|
//! | `token`     | raw bearer token                        |
//! | `auth_user` | JSON-serialized merged [`SessionUser`]  |

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use resto_core::auth::{Credentials, RegisterRequest};
use resto_core::claims::decode_claims;
use resto_core::user::SessionUser;

use crate::auth::AuthBackend;
use crate::error::ClientResult;
use crate::storage::KeyValueStorage;

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized user profile.
pub const USER_KEY: &str = "auth_user";

/// Current token and user. Either may be absent independently of the other.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
}

impl Session {
    /// A token is held. Callers that also need a known identity should check
    /// `user` themselves.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Owns the current session and the operations that replace it.
///
/// Construct once at startup with [`SessionStore::load`] and share it behind
/// an `Arc`.
pub struct SessionStore {
    auth: Arc<dyn AuthBackend>,
    storage: Arc<dyn KeyValueStorage>,
    current: RwLock<Arc<Session>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store from whatever is persisted in `storage`.
    ///
    /// - Token present: the user is the stored profile (or an empty record)
    ///   overlaid with the token's claims (or nothing, if it does not decode).
    /// - No token: the user is the stored profile as-is, or `None`.
    ///
    /// Read failures and an unparseable profile are logged and treated as
    /// absent entries.
    pub fn load(auth: Arc<dyn AuthBackend>, storage: Arc<dyn KeyValueStorage>) -> Self {
        let token = read_entry(storage.as_ref(), TOKEN_KEY).filter(|token| !token.is_empty());
        let profile = read_entry(storage.as_ref(), USER_KEY).and_then(|raw| {
            serde_json::from_str::<SessionUser>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "Ignoring unparseable stored profile"))
                .ok()
        });

        let user = match &token {
            Some(token) => {
                let claims = decode_claims(token).unwrap_or_default();
                Some(profile.unwrap_or_default().merged_with(&claims))
            }
            None => profile,
        };

        let session = Session { token, user };
        tracing::debug!(
            authenticated = session.is_authenticated(),
            username = session.user.as_ref().and_then(|u| u.username.as_deref()),
            "Session restored from storage"
        );

        Self {
            auth,
            storage,
            current: RwLock::new(Arc::new(session)),
        }
    }

    /// The current session.
    pub fn snapshot(&self) -> Arc<Session> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.snapshot().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// Log in with username and password.
    ///
    /// Errors from the auth backend are returned unchanged and leave the
    /// current session untouched. On success the new token's claims are
    /// merged over `{username}`, persisted, and published.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Arc<Session>> {
        let token = self.auth.authenticate(credentials).await?;
        let session = self.establish(token, credentials.fallback_user())?;
        tracing::info!(
            username = %credentials.username,
            role = session.user.as_ref().and_then(|u| u.role.as_deref()),
            "Logged in"
        );
        Ok(session)
    }

    /// Register a new account and log in as it.
    ///
    /// Same contract as [`login`](Self::login); the fallback profile is
    /// `{username, email, role_id}`.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Arc<Session>> {
        let token = self.auth.register(request).await?;
        let session = self.establish(token, request.fallback_user())?;
        tracing::info!(username = %request.username, "Registered and logged in");
        Ok(session)
    }

    /// Forget the session in memory and in storage. Never fails; storage
    /// errors are logged.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session entry from storage");
            }
        }
        self.publish(Arc::new(Session::default()));
        tracing::info!("Logged out");
    }

    // ---- private helpers ----

    /// Persist and publish a session for a freshly issued token.
    ///
    /// Storage is written before the in-memory snapshot is swapped, so a
    /// storage failure leaves the previous session in place.
    fn establish(&self, token: String, fallback: SessionUser) -> ClientResult<Arc<Session>> {
        let claims = decode_claims(&token).unwrap_or_default();
        let user = fallback.merged_with(&claims);

        self.persist(&token, &serde_json::to_string(&user)?)?;

        let session = Arc::new(Session {
            token: Some(token),
            user: Some(user),
        });
        self.publish(Arc::clone(&session));
        Ok(session)
    }

    /// Write both entries or neither.
    ///
    /// A token must never sit next to another account's profile: if the
    /// profile write fails, the previous token is put back. Should that fail
    /// too, the old profile is dropped so the next `load` trusts the claims
    /// alone.
    fn persist(&self, token: &str, profile: &str) -> ClientResult<()> {
        let previous_token = read_entry(self.storage.as_ref(), TOKEN_KEY);

        self.storage.set(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(USER_KEY, profile) {
            let restored = match &previous_token {
                Some(previous) => self.storage.set(TOKEN_KEY, previous),
                None => self.storage.remove(TOKEN_KEY),
            };
            if let Err(restore_err) = restored {
                tracing::warn!(error = %restore_err, "Failed to restore previous token");
                if let Err(remove_err) = self.storage.remove(USER_KEY) {
                    tracing::warn!(error = %remove_err, "Failed to drop stale profile");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn publish(&self, session: Arc<Session>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

fn read_entry(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    storage
        .get(key)
        .map_err(|e| tracing::warn!(key, error = %e, "Failed to read session entry"))
        .ok()
        .flatten()
}
