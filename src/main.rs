mod auth;
mod guard;
mod notice;
mod routes;
mod state;

use std::sync::Arc;

use auth::cloud::{CloudAuthClient, CloudAuthConfig, IdentityBackend};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // Auth backend is optional: without it the app still serves, but every
    // protected page denies and sign-in answers 503.
    let backend: Option<Arc<dyn IdentityBackend>> = match CloudAuthConfig::from_env() {
        Some(config) => {
            tracing::info!(project = config.project_id.as_deref().unwrap_or("-"), "auth backend configured");
            Some(Arc::new(CloudAuthClient::new(config)))
        }
        None => {
            tracing::warn!("auth backend env vars missing — sign-in disabled");
            None
        }
    };

    let state = state::AppState::new(backend);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "fintrack listening");
    axum::serve(listener, app).await.expect("server failed");
}
