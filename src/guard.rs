//! Navigation guard — the allow/deny decision for every page navigation.
//!
//! DESIGN
//! ======
//! One invocation per navigation attempt. Unprotected targets are allowed
//! synchronously without consulting the identity provider; protected targets
//! suspend on a one-shot identity query. Absence and resolution failure both
//! deny: a stuck pending navigation would lock the user out, so every failed
//! check redirects to the login route with a notice. No retries.

use uuid::Uuid;

use crate::auth::provider::{AuthProvider, current_identity};
use crate::routes::table::RouteDescriptor;

/// Notice shown when an unauthenticated user hits a protected page.
pub const LOGIN_REQUIRED_NOTICE: &str = "Você precisa fazer login para acessar essa página!";

// =============================================================================
// NAVIGATION INTENT
// =============================================================================

/// One navigation attempt: target, origin, and the route segments the target
/// matched. Created per attempt, consumed immediately.
pub struct NavigationIntent<'a> {
    /// Correlation id for logs; carries no other meaning.
    pub id: Uuid,
    pub target: &'a str,
    pub source: Option<&'a str>,
    pub matched: Vec<&'a RouteDescriptor>,
}

impl<'a> NavigationIntent<'a> {
    #[must_use]
    pub fn new(target: &'a str, source: Option<&'a str>, matched: Vec<&'a RouteDescriptor>) -> Self {
        Self { id: Uuid::new_v4(), target, source, matched }
    }

    /// True when any matched segment is protected.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.matched.iter().any(|r| r.requires_auth)
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Terminal outcome of one guard invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied {
        redirect_to: String,
        notice: &'static str,
    },
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone)]
pub struct NavigationGuard {
    login_path: String,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(login_path: impl Into<String>) -> Self {
        Self { login_path: login_path.into() }
    }

    /// Decide one navigation attempt.
    ///
    /// The identity query owns its own subscription, torn down when this
    /// call completes or is canceled; concurrent checks share no state.
    pub async fn check(&self, intent: &NavigationIntent<'_>, provider: &dyn AuthProvider) -> Decision {
        if !intent.requires_auth() {
            return Decision::Allowed;
        }

        match current_identity(provider).await {
            Ok(Some(identity)) => {
                tracing::debug!(intent = %intent.id, to = intent.target, uid = %identity.uid, "navigation allowed");
                Decision::Allowed
            }
            Ok(None) => {
                tracing::info!(intent = %intent.id, to = intent.target, from = ?intent.source, "navigation denied: not signed in");
                self.deny()
            }
            Err(err) => {
                tracing::warn!(intent = %intent.id, to = intent.target, error = %err, "identity resolution failed, denying navigation");
                self.deny()
            }
        }
    }

    fn deny(&self) -> Decision {
        Decision::Denied {
            redirect_to: self.login_path.clone(),
            notice: LOGIN_REQUIRED_NOTICE,
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
