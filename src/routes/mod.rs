//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page routes sit behind the navigation guard middleware; the session API
//! and health endpoint bypass it. The guard is the only place that decides
//! whether a page response is produced at all.

pub mod pages;
pub mod session;
pub mod table;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router: guarded pages + session API + health.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let page_routes = Router::new()
        .route("/", get(pages::login))
        .route("/Home", get(pages::home))
        .route("/dashboard", get(pages::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), pages::guard_navigation));

    let api_routes = Router::new()
        .route("/api/session", post(session::login))
        .route("/api/session/logout", post(session::logout))
        .route("/api/session/me", get(session::me))
        .layer(cors);

    page_routes
        .merge(api_routes)
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
