//! Session API — sign-in against the cloud backend, logout, current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::auth::cloud::CloudAuthError;
use crate::auth::provider::current_identity;
use crate::auth::session::Session;
use crate::state::AppState;

pub(crate) const SESSION_COOKIE: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

/// Session token from the request's cookie jar, if any.
pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/session` — password sign-in; sets the session cookie.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let Some(backend) = &state.backend else {
        return (StatusCode::SERVICE_UNAVAILABLE, "auth backend not configured").into_response();
    };

    let backend_session = match backend.sign_in(&req.email, &req.password).await {
        Ok(s) => s,
        Err(CloudAuthError::InvalidCredentials) => {
            return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in failed");
            return (StatusCode::BAD_GATEWAY, "auth backend unavailable").into_response();
        }
    };

    let identity = match backend.lookup(&backend_session.id_token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "profile lookup failed");
            return (StatusCode::BAD_GATEWAY, "auth backend unavailable").into_response();
        }
    };

    // The profile must belong to the account that just signed in.
    if identity.uid != backend_session.uid {
        tracing::error!(signed_in = %backend_session.uid, resolved = %identity.uid, "sign-in and lookup disagree on uid");
        return (StatusCode::BAD_GATEWAY, "auth backend unavailable").into_response();
    }

    let now = OffsetDateTime::now_utc();
    let token = state.sessions.insert(Session {
        identity: identity.clone(),
        id_token: backend_session.id_token,
        expires_at: now + Duration::seconds(backend_session.expires_in_secs),
        verified_at: now,
    });

    tracing::info!(uid = %identity.uid, "session created");
    let jar = CookieJar::new().add(session_cookie(token));
    (jar, Json(identity)).into_response()
}

/// `POST /api/session/logout` — remove the session, clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        state.sessions.remove(&token);
    }
    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/session/me` — current identity, resolved through the same
/// provider the navigation guard uses.
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Response {
    let provider = state.provider_for(session_token(&jar));
    match current_identity(&provider).await {
        Ok(Some(identity)) => Json(identity).into_response(),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "identity resolution failed");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
