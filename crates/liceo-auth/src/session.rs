//! Session state shared by every authenticated caller.
//!
//! [`Session`] owns the token store and performs the round-trips that
//! rotate it. All mutation of the pair goes through here, as one
//! indivisible store update per login, refresh, or logout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

use crate::endpoints::{self, LoginResponse};
use crate::error::{AuthError, Result};
use crate::jwt;
use crate::store::SharedTokenStore;

/// How often the background task checks the access token.
pub const AUTO_REFRESH_PERIOD: Duration = Duration::from_secs(14 * 60);

/// Authenticated session against the portal backend.
///
/// Cheap to clone; clones share the store, the single-flight refresh
/// lock, and the background task slot.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    http: reqwest::Client,
    base_url: Url,
    store: SharedTokenStore,
    /// Serializes refreshes so concurrent stale callers share one round-trip.
    refresh_lock: Mutex<()>,
    auto_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session over a store. The base URL must be the server
    /// root; auth endpoint paths are fixed.
    pub fn new(http: reqwest::Client, base_url: Url, store: SharedTokenStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                http,
                base_url,
                store,
                refresh_lock: Mutex::new(()),
                auto_refresh: Mutex::new(None),
            }),
        }
    }

    /// The token store backing this session.
    pub fn store(&self) -> &SharedTokenStore {
        &self.inner.store
    }

    /// The server root URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Log in and store the returned pair. Nothing is stored on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response =
            endpoints::login(&self.inner.http, &self.inner.base_url, username, password).await?;
        self.inner
            .store
            .set_tokens(&response.access_token, &response.refresh_token)
            .await?;
        tracing::info!("Logged in, token pair stored");
        Ok(response)
    }

    /// Invalidate the refresh token server-side (best effort), stop the
    /// auto-refresh task, and clear the store.
    ///
    /// Always succeeds locally; a failed server round-trip is only
    /// logged. Requests already in flight are not aborted, their results
    /// are discarded by callers finding the store empty.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.inner.store.refresh_token().await {
            if let Err(e) =
                endpoints::logout(&self.inner.http, &self.inner.base_url, &refresh_token).await
            {
                tracing::debug!(error = %e, "Server-side logout failed, clearing local session anyway");
            }
        }
        self.stop_auto_refresh().await;
        if let Err(e) = self.inner.store.clear_tokens().await {
            tracing::warn!(error = %e, "Failed to clear token store during logout");
        }
    }

    /// Mint and store a new pair from a caller-supplied refresh token.
    ///
    /// On failure the store is left untouched; callers decide whether
    /// the session is gone.
    pub async fn refresh_with(&self, refresh_token: &str) -> Result<LoginResponse> {
        let mut response =
            endpoints::refresh(&self.inner.http, &self.inner.base_url, refresh_token).await?;
        // Servers that do not rotate the refresh token may omit it.
        if response.refresh_token.is_empty() {
            response.refresh_token = refresh_token.to_string();
        }
        self.inner
            .store
            .set_tokens(&response.access_token, &response.refresh_token)
            .await?;
        tracing::info!("Access token refreshed");
        Ok(response)
    }

    /// Mint and store a new pair from the stored refresh token.
    pub async fn refresh_access_token(&self) -> Result<LoginResponse> {
        let refresh_token = self
            .inner
            .store
            .refresh_token()
            .await
            .ok_or(AuthError::NotAuthenticated)?;
        self.refresh_with(&refresh_token).await
    }

    /// Refresh, but only if the stored pair still matches what the
    /// caller observed as stale.
    ///
    /// Callers that queued behind an in-flight refresh find the pair
    /// already rotated and return without a second round-trip, so N
    /// concurrent 401s cost exactly one refresh.
    pub async fn refresh_stale(&self, observed_access_token: Option<&str>) -> Result<()> {
        let _guard = self.inner.refresh_lock.lock().await;
        let current = self.inner.store.access_token().await;
        if current.as_deref() != observed_access_token {
            return match current {
                Some(_) => Ok(()),
                // Cleared while we waited for the lock: logged out.
                None => Err(AuthError::NotAuthenticated),
            };
        }
        self.refresh_access_token().await?;
        Ok(())
    }

    /// A bearer-ready access token, refreshing first when the stored one
    /// fails the expiry check. `None` when no token is stored at all.
    pub async fn valid_access_token(&self) -> Result<Option<String>> {
        let Some(access_token) = self.inner.store.access_token().await else {
            return Ok(None);
        };
        if !jwt::is_token_expired(&access_token) {
            return Ok(Some(access_token));
        }
        self.refresh_stale(Some(&access_token)).await?;
        Ok(self.inner.store.access_token().await)
    }

    /// Start the periodic token check with the default 14 minute period.
    pub async fn start_auto_refresh(&self) {
        self.start_auto_refresh_every(AUTO_REFRESH_PERIOD).await;
    }

    /// Start the periodic token check. Replaces any running task.
    ///
    /// Each tick refreshes only when the stored access token is already
    /// expired. A failed refresh clears the store and ends the task.
    pub async fn start_auto_refresh_every(&self, period: Duration) {
        let session = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; the first check belongs one period out
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(access_token) = session.inner.store.access_token().await else {
                    continue;
                };
                if !jwt::is_token_expired(&access_token) {
                    continue;
                }
                match session.refresh_stale(Some(&access_token)).await {
                    Ok(()) => {
                        tracing::debug!("Auto-refresh rotated the token pair");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Auto-refresh failed, clearing session");
                        if let Err(e) = session.inner.store.clear_tokens().await {
                            tracing::warn!(error = %e, "Failed to clear token store");
                        }
                        break;
                    }
                }
            }
        });

        let mut slot = self.inner.auto_refresh.lock().await;
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Stop the periodic token check, if running.
    pub async fn stop_auto_refresh(&self) {
        let mut slot = self.inner.auto_refresh.lock().await;
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}
