//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the in-memory session store, the optional auth backend client, and
//! the navigation guard. All fields are cheap to clone or Arc-wrapped.

use std::sync::Arc;

use crate::auth::cloud::IdentityBackend;
use crate::auth::session::{SessionAuthProvider, SessionStore};
use crate::guard::NavigationGuard;
use crate::routes::table;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// `None` when the auth backend env vars are missing (sign-in disabled).
    pub backend: Option<Arc<dyn IdentityBackend>>,
    pub guard: NavigationGuard,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Option<Arc<dyn IdentityBackend>>) -> Self {
        Self {
            sessions: SessionStore::new(),
            backend,
            guard: NavigationGuard::new(table::LOGIN_PATH),
        }
    }

    /// Identity provider scoped to one request's session token.
    #[must_use]
    pub fn provider_for(&self, token: Option<String>) -> SessionAuthProvider {
        SessionAuthProvider::new(self.sessions.clone(), self.backend.clone(), token)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
