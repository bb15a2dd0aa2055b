//! Managed auth backend client — password sign-in and id-token lookup.
//!
//! Speaks the identity-toolkit REST surface of the hosted auth service.
//! Configuration comes from environment variables; when it is missing the
//! server still starts, with sign-in disabled.

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::Identity;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Body markers the backend uses for rejected credentials.
const SIGN_IN_REJECTIONS: &[&str] = &["INVALID_PASSWORD", "EMAIL_NOT_FOUND", "INVALID_LOGIN_CREDENTIALS"];

/// Body markers for an id token the backend no longer honors.
const TOKEN_REJECTIONS: &[&str] = &["INVALID_ID_TOKEN", "USER_NOT_FOUND", "TOKEN_EXPIRED"];

// =============================================================================
// CONFIG
// =============================================================================

/// Auth backend configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct CloudAuthConfig {
    pub api_key: String,
    /// Informational only; the account endpoints authenticate by API key.
    pub project_id: Option<String>,
    pub base_url: String,
}

impl CloudAuthConfig {
    /// Load from `AUTH_API_KEY` (required), `AUTH_PROJECT_ID` (optional,
    /// surfaced in startup logs) and optional `AUTH_BASE_URL` (emulator
    /// override). Returns `None` if the API key is missing (sign-in will be
    /// disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("AUTH_API_KEY").ok()?;
        let project_id = std::env::var("AUTH_PROJECT_ID").ok();
        let base_url = std::env::var("AUTH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Some(Self { api_key, project_id, base_url })
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CloudAuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth api request failed: {0}")]
    Api(String),
    #[error("auth api response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// One successful password sign-in.
#[derive(Debug, Clone)]
pub struct BackendSession {
    pub uid: String,
    pub id_token: String,
    pub expires_in_secs: i64,
}

/// The managed auth service, behind a trait so tests inject stubs.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Exchange email + password for a backend session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<BackendSession, CloudAuthError>;

    /// Resolve the profile behind an id token. `None` means the backend no
    /// longer honors the token (revoked, expired, account deleted).
    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, CloudAuthError>;
}

// =============================================================================
// REST CLIENT
// =============================================================================

pub struct CloudAuthClient {
    config: CloudAuthConfig,
    http: reqwest::Client,
}

impl CloudAuthClient {
    #[must_use]
    pub fn new(config: CloudAuthConfig) -> Self {
        Self { config, http: reqwest::Client::new() }
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/v1/accounts:{op}?key={}", self.config.base_url, self.config.api_key)
    }
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "expiresIn")]
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    users: Option<Vec<LookupUser>>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

fn body_contains(body: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| body.contains(m))
}

#[async_trait]
impl IdentityBackend for CloudAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<BackendSession, CloudAuthError> {
        let resp = self
            .http
            .post(self.endpoint("signInWithPassword"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| CloudAuthError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if body_contains(&body, SIGN_IN_REJECTIONS) {
                return Err(CloudAuthError::InvalidCredentials);
            }
            return Err(CloudAuthError::Api(format!("{status}: {body}")));
        }

        let signed: SignInResponse = resp.json().await.map_err(|e| CloudAuthError::Parse(e.to_string()))?;
        let expires_in_secs = signed
            .expires_in
            .parse::<i64>()
            .map_err(|_| CloudAuthError::Parse(format!("bad expiresIn: {}", signed.expires_in)))?;

        Ok(BackendSession { uid: signed.local_id, id_token: signed.id_token, expires_in_secs })
    }

    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, CloudAuthError> {
        let resp = self
            .http
            .post(self.endpoint("lookup"))
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| CloudAuthError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if body_contains(&body, TOKEN_REJECTIONS) {
                return Ok(None);
            }
            return Err(CloudAuthError::Api(format!("{status}: {body}")));
        }

        let looked: LookupResponse = resp.json().await.map_err(|e| CloudAuthError::Parse(e.to_string()))?;
        let Some(user) = looked.users.and_then(|users| users.into_iter().next()) else {
            return Ok(None);
        };

        Ok(Some(Identity {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
        }))
    }
}

#[cfg(test)]
#[path = "cloud_test.rs"]
mod tests;
