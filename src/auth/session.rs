//! In-memory sessions and the production identity provider.
//!
//! DESIGN
//! ======
//! Requests carry a random session token in an HttpOnly cookie. The store
//! maps tokens to the identity plus the backend id token that proved it.
//! Fresh sessions answer identity checks synchronously; stale ones are
//! re-verified against the backend from a spawned task, so a revoked account
//! stops passing the guard within the re-verify interval. Durable data lives
//! in the cloud provider; nothing here survives a restart.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use time::{Duration, OffsetDateTime};

use super::cloud::IdentityBackend;
use super::provider::{
    AuthProvider, Identity, IdentityEvent, IdentityObserver, ProviderError, Subscription,
};

/// How long a verified session answers checks without consulting the backend.
const REVERIFY_INTERVAL: Duration = Duration::minutes(5);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// One signed-in session.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    /// Backend id token backing this session.
    pub id_token: String,
    /// Hard expiry; the session never outlives the backend token.
    pub expires_at: OffsetDateTime,
    /// Last time the backend confirmed the id token.
    pub verified_at: OffsetDateTime,
}

/// Cloneable handle to the in-memory session map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session under a fresh random token, returning the token.
    pub fn insert(&self, session: Session) -> String {
        let token = generate_token();
        self.lock().insert(token.clone(), session);
        token
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<Session> {
        self.lock().get(token).cloned()
    }

    pub fn remove(&self, token: &str) {
        self.lock().remove(token);
    }

    /// Record a successful backend re-verification.
    fn refresh(&self, token: &str, identity: Identity, at: OffsetDateTime) {
        if let Some(session) = self.lock().get_mut(token) {
            session.identity = identity;
            session.verified_at = at;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// PRODUCTION PROVIDER
// =============================================================================

/// [`AuthProvider`] scoped to one request's session token.
///
/// Built per navigation attempt; concurrent checks therefore never share a
/// subscription.
pub struct SessionAuthProvider {
    store: SessionStore,
    backend: Option<Arc<dyn IdentityBackend>>,
    token: Option<String>,
}

impl SessionAuthProvider {
    #[must_use]
    pub fn new(store: SessionStore, backend: Option<Arc<dyn IdentityBackend>>, token: Option<String>) -> Self {
        Self { store, backend, token }
    }
}

impl AuthProvider for SessionAuthProvider {
    fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
        let now = OffsetDateTime::now_utc();

        let Some(token) = self.token.clone() else {
            observer.emit(IdentityEvent::Changed(None));
            return Subscription::completed();
        };
        let Some(session) = self.store.get(&token) else {
            observer.emit(IdentityEvent::Changed(None));
            return Subscription::completed();
        };
        if session.expires_at <= now {
            self.store.remove(&token);
            observer.emit(IdentityEvent::Changed(None));
            return Subscription::completed();
        }

        let stale = now - session.verified_at >= REVERIFY_INTERVAL;
        let Some(backend) = stale.then(|| self.backend.clone()).flatten() else {
            observer.emit(IdentityEvent::Changed(Some(session.identity)));
            return Subscription::completed();
        };

        // Stale session: confirm the backend still honors the id token.
        let store = self.store.clone();
        let handle = tokio::spawn(async move {
            match backend.lookup(&session.id_token).await {
                Ok(Some(identity)) => {
                    store.refresh(&token, identity.clone(), OffsetDateTime::now_utc());
                    observer.emit(IdentityEvent::Changed(Some(identity)));
                }
                Ok(None) => {
                    store.remove(&token);
                    observer.emit(IdentityEvent::Changed(None));
                }
                Err(err) => {
                    observer.emit(IdentityEvent::Failed(ProviderError::Backend(err.to_string())));
                }
            }
        });
        Subscription::task(handle)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
