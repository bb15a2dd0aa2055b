//! Identity resolution seam — observable auth state and its one-shot query.
//!
//! DESIGN
//! ======
//! The auth backend exposes "who is signed in" as a subscribable value that
//! may resolve asynchronously. [`current_identity`] turns that into an
//! explicit query: subscribe, await exactly one emission, unsubscribe.
//! Teardown rides on the RAII [`Subscription`], so a listener cannot outlive
//! its check even when the check is canceled mid-flight.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// =============================================================================
// ERROR
// =============================================================================

/// Failures of identity resolution itself. Absence of a signed-in user is
/// not an error; it is a successful `None` resolution.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The backend reported a failure while resolving identity.
    #[error("identity backend failure: {0}")]
    Backend(String),

    /// The provider dropped its observer before emitting anything.
    #[error("identity subscription closed before first emission")]
    SubscriptionClosed,
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The resolved signed-in user. Produced exclusively by the auth layer;
/// consumers only read it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Identity {
    /// Backend-assigned user id.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A single emission of the auth state.
#[derive(Debug)]
pub enum IdentityEvent {
    /// Current state: signed in as `Some(identity)`, or signed out.
    Changed(Option<Identity>),
    /// Resolution failed; no state could be determined.
    Failed(ProviderError),
}

// =============================================================================
// OBSERVER + SUBSCRIPTION
// =============================================================================

/// Callback handle registered with a provider.
pub struct IdentityObserver {
    notify: Box<dyn FnMut(IdentityEvent) + Send>,
}

impl IdentityObserver {
    pub fn new(notify: impl FnMut(IdentityEvent) + Send + 'static) -> Self {
        Self { notify: Box::new(notify) }
    }

    pub fn emit(&mut self, event: IdentityEvent) {
        (self.notify)(event);
    }
}

/// RAII handle for a registered observer. Dropping it unsubscribes; the
/// provider must not invoke the observer afterwards.
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    teardown: Teardown,
}

enum Teardown {
    Completed,
    Cancel(Option<Box<dyn FnOnce() + Send>>),
    Task(JoinHandle<()>),
}

impl Subscription {
    /// Subscription for a provider that emitted synchronously during
    /// `subscribe` and holds no observer afterwards.
    pub fn completed() -> Self {
        Self { teardown: Teardown::Completed }
    }

    /// Subscription that runs `cancel` on drop.
    pub fn on_cancel(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { teardown: Teardown::Cancel(Some(Box::new(cancel))) }
    }

    /// Subscription backed by a spawned emission task; dropping aborts it.
    pub fn task(handle: JoinHandle<()>) -> Self {
        Self { teardown: Teardown::Task(handle) }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        match &mut self.teardown {
            Teardown::Completed => {}
            Teardown::Cancel(cancel) => {
                if let Some(cancel) = cancel.take() {
                    cancel();
                }
            }
            Teardown::Task(handle) => handle.abort(),
        }
    }
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// "Get current signed-in identity" as a subscribable value.
///
/// Contract: implementations emit the current state at least once after
/// registration (synchronously or from a task) and stop emitting once the
/// returned subscription is dropped.
pub trait AuthProvider: Send + Sync {
    fn subscribe(&self, observer: IdentityObserver) -> Subscription;
}

/// Resolve the current identity through a one-shot subscription: subscribe,
/// take the first emission, unsubscribe.
///
/// The subscription is torn down when this future completes or is dropped,
/// whichever comes first. Emissions after the first are discarded.
///
/// # Errors
///
/// Returns an error if the provider emits a failure or drops the observer
/// without emitting.
pub async fn current_identity(provider: &dyn AuthProvider) -> Result<Option<Identity>, ProviderError> {
    let (tx, rx) = oneshot::channel();
    let mut slot = Some(tx);
    let observer = IdentityObserver::new(move |event| {
        if let Some(tx) = slot.take() {
            let _ = tx.send(event);
        }
    });

    // Held across the await: unsubscribes on completion and on cancellation.
    let _subscription = provider.subscribe(observer);

    match rx.await {
        Ok(IdentityEvent::Changed(identity)) => Ok(identity),
        Ok(IdentityEvent::Failed(err)) => Err(err),
        Err(_) => Err(ProviderError::SubscriptionClosed),
    }
}

// =============================================================================
// TEST DOUBLES
// =============================================================================

#[cfg(test)]
pub mod test_doubles {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    pub fn identity(uid: &str) -> Identity {
        Identity { uid: uid.to_owned(), email: Some(format!("{uid}@example.com")), display_name: None }
    }

    /// Emits its configured state synchronously during `subscribe`.
    pub struct StaticProvider {
        pub identity: Option<Identity>,
    }

    impl AuthProvider for StaticProvider {
        fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
            observer.emit(IdentityEvent::Changed(self.identity.clone()));
            Subscription::completed()
        }
    }

    /// Emits a backend failure synchronously.
    pub struct FailingProvider;

    impl AuthProvider for FailingProvider {
        fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
            observer.emit(IdentityEvent::Failed(ProviderError::Backend("boom".into())));
            Subscription::completed()
        }
    }

    /// Drops the observer without ever emitting.
    pub struct SilentProvider;

    impl AuthProvider for SilentProvider {
        fn subscribe(&self, observer: IdentityObserver) -> Subscription {
            drop(observer);
            Subscription::completed()
        }
    }

    /// Panics if consulted at all. Proves a code path performs no check.
    pub struct PanicProvider;

    impl AuthProvider for PanicProvider {
        fn subscribe(&self, _observer: IdentityObserver) -> Subscription {
            panic!("identity check performed on a path that must not check");
        }
    }

    /// Emits from a spawned task after `delay`.
    pub struct DelayedProvider {
        pub delay: std::time::Duration,
        pub identity: Option<Identity>,
    }

    impl AuthProvider for DelayedProvider {
        fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
            let delay = self.delay;
            let identity = self.identity.clone();
            Subscription::task(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                observer.emit(IdentityEvent::Changed(identity));
            }))
        }
    }

    /// Emits twice in a row; only the first emission may be observed.
    pub struct ChattyProvider {
        pub first: Option<Identity>,
        pub second: Option<Identity>,
    }

    impl AuthProvider for ChattyProvider {
        fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
            observer.emit(IdentityEvent::Changed(self.first.clone()));
            observer.emit(IdentityEvent::Changed(self.second.clone()));
            Subscription::completed()
        }
    }

    /// Emits synchronously while counting subscribe calls and live
    /// subscriptions, for leak-freedom assertions.
    pub struct TrackingProvider {
        pub identity: Option<Identity>,
        pub subscribed: Arc<AtomicUsize>,
        pub active: Arc<AtomicUsize>,
    }

    impl TrackingProvider {
        pub fn new(identity: Option<Identity>) -> Self {
            Self {
                identity,
                subscribed: Arc::new(AtomicUsize::new(0)),
                active: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl AuthProvider for TrackingProvider {
        fn subscribe(&self, mut observer: IdentityObserver) -> Subscription {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            self.active.fetch_add(1, Ordering::SeqCst);
            observer.emit(IdentityEvent::Changed(self.identity.clone()));
            let active = Arc::clone(&self.active);
            Subscription::on_cancel(move || {
                active.fetch_sub(1, Ordering::SeqCst);
            })
        }
    }

    /// Never emits; the observer stays registered until teardown.
    pub struct HangingProvider {
        pub active: Arc<AtomicUsize>,
    }

    impl HangingProvider {
        pub fn new() -> Self {
            Self { active: Arc::new(AtomicUsize::new(0)) }
        }
    }

    impl AuthProvider for HangingProvider {
        fn subscribe(&self, observer: IdentityObserver) -> Subscription {
            self.active.fetch_add(1, Ordering::SeqCst);
            let active = Arc::clone(&self.active);
            Subscription::on_cancel(move || {
                drop(observer);
                active.fetch_sub(1, Ordering::SeqCst);
            })
        }
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
