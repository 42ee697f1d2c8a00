//! Raw auth endpoint round-trips.
//!
//! None of these calls attach a bearer header: login and refresh run
//! before a usable access token exists, and logout carries the refresh
//! token in the body.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AuthError, Result};

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Refresh endpoint path.
pub const REFRESH_PATH: &str = "/api/auth/refresh";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Fallback when a response body yields no usable message.
pub const REQUEST_FAILED: &str = "Request failed";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token response from login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, as reported by the server.
    /// Expiry checks derive from the JWT `exp` claim, not this field.
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Exchange credentials for a token pair.
///
/// A rejection surfaces the server's own message; nothing is stored here.
pub async fn login(
    http: &reqwest::Client,
    base_url: &Url,
    username: &str,
    password: &str,
) -> Result<LoginResponse> {
    let response = http
        .post(endpoint(base_url, LOGIN_PATH)?)
        .json(&LoginRequest { username, password })
        .send()
        .await?;
    read_json(response).await
}

/// Mint a new token pair from a refresh token.
pub async fn refresh(
    http: &reqwest::Client,
    base_url: &Url,
    refresh_token: &str,
) -> Result<LoginResponse> {
    let response = http
        .post(endpoint(base_url, REFRESH_PATH)?)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await?;
    read_json(response).await
}

/// Invalidate a refresh token server-side.
pub async fn logout(http: &reqwest::Client, base_url: &Url, refresh_token: &str) -> Result<()> {
    let response = http
        .post(endpoint(base_url, LOGOUT_PATH)?)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(())
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url> {
    base_url
        .join(path.trim_start_matches('/'))
        .map_err(|e| AuthError::Config(format!("invalid endpoint url: {e}")))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| AuthError::Serialization(format!("failed to parse response: {e}")))
}

async fn error_from_response(response: reqwest::Response) -> AuthError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AuthError::Server {
        status,
        message: error_message(&body),
    }
}

/// Pull a human-readable message out of an error body.
///
/// JSON bodies surface their `message` field, then their `error` field;
/// non-JSON bodies are surfaced verbatim; empty or fieldless bodies fall
/// back to a generic message.
pub fn error_message(body: &str) -> String {
    if body.is_empty() {
        return REQUEST_FAILED.to_string();
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            if let Some(message) = value.get("message").and_then(|v| v.as_str()) {
                return message.to_string();
            }
            if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
                return error.to_string();
            }
            REQUEST_FAILED.to_string()
        }
        Err(_) => body.to_string(),
    }
}
