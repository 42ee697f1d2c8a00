//! Auth API.

use liceo_auth::LoginResponse;

use crate::client::LiceoClient;
use crate::error::Result;
use crate::types::AuthProfile;

/// Auth lifecycle API client.
///
/// Login and refresh go out without a bearer header; a 401 from them is
/// a credential failure surfaced verbatim, never a refresh trigger.
pub struct AuthApi {
    client: LiceoClient,
}

impl AuthApi {
    pub(crate) fn new(client: LiceoClient) -> Self {
        Self { client }
    }

    /// Log in and store the token pair. Nothing is stored on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        Ok(self.client.session().login(username, password).await?)
    }

    /// Invalidate the session server-side (best effort) and clear local
    /// state. Always succeeds locally.
    pub async fn logout(&self) {
        self.client.session().logout().await
    }

    /// Profile of the authenticated user.
    pub async fn profile(&self) -> Result<AuthProfile> {
        self.client.get("/api/auth/profile").await
    }

    /// Mint and store a new token pair from a refresh token.
    ///
    /// On failure the stored tokens are left untouched so callers can
    /// decide whether the session is gone.
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse> {
        Ok(self.client.session().refresh_with(refresh_token).await?)
    }
}
