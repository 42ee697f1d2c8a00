//! Client-side persistence of the token pair.
//!
//! The pair is stored and read as a single value: no reader can ever
//! observe an access token from one pair combined with a refresh token
//! from another. A stored access token is never assumed valid; consumers
//! run the expiry check in [`crate::jwt`] before trusting it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AuthError, Result};

/// Default token file name within the data directory.
pub const TOKEN_FILE: &str = "tokens.json";

/// Marker file name. Route guards that have no access to the tokens read
/// this file to decide whether a session is present.
pub const AUTH_MARKER_FILE: &str = "authenticated";

/// Validity window of the authenticated marker, independent of the
/// tokens' own expiry.
const AUTH_MARKER_DAYS: i64 = 7;

/// Access and refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Storage for the token pair and the authenticated marker.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Current pair, or `None` when absent or the medium is unavailable.
    async fn pair(&self) -> Option<TokenPair>;

    /// Persist both tokens as one indivisible update and stamp the
    /// authenticated marker with its 7-day window.
    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()>;

    /// Remove the pair and the marker. Safe to call when already cleared.
    async fn clear_tokens(&self) -> Result<()>;

    /// Whether the authenticated marker exists and is inside its window.
    async fn is_marked_authenticated(&self) -> bool;

    /// Access token of the current pair.
    async fn access_token(&self) -> Option<String> {
        self.pair().await.map(|pair| pair.access_token)
    }

    /// Refresh token of the current pair.
    async fn refresh_token(&self) -> Option<String> {
        self.pair().await.map(|pair| pair.refresh_token)
    }
}

fn marker_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::days(AUTH_MARKER_DAYS)
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-backed store for native deployments.
///
/// The pair lives in a JSON token file; the marker is a separate plain
/// file holding its own expiry timestamp, cheap to check without parsing
/// tokens. Read failures report "no tokens" rather than erroring, so a
/// missing or unreadable medium degrades to the logged-out state.
#[derive(Debug)]
pub struct FileTokenStore {
    token_path: PathBuf,
    marker_path: PathBuf,
    cached: Arc<RwLock<Option<TokenPair>>>,
}

impl FileTokenStore {
    /// Create a store rooted at a data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            token_path: data_dir.join(TOKEN_FILE),
            marker_path: data_dir.join(AUTH_MARKER_FILE),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    async fn load(&self) -> Option<TokenPair> {
        {
            let cache = self.cached.read().await;
            if cache.is_some() {
                return cache.clone();
            }
        }

        if !self.token_path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&self.token_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.token_path.display(), "Failed to read token file");
                return None;
            }
        };

        let pair: TokenPair = match serde_json::from_str(&content) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse token file");
                return None;
            }
        };

        let mut cache = self.cached.write().await;
        *cache = Some(pair.clone());
        Some(pair)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn pair(&self) -> Option<TokenPair> {
        self.load().await
    }

    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let pair = TokenPair {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };

        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AuthError::Storage(format!("failed to create token directory: {e}")))?;
        }

        let json = serde_json::to_string_pretty(&pair)
            .map_err(|e| AuthError::Serialization(format!("failed to serialize tokens: {e}")))?;

        std::fs::write(&self.token_path, json)
            .map_err(|e| AuthError::Storage(format!("failed to write token file: {e}")))?;

        std::fs::write(&self.marker_path, marker_expiry().to_rfc3339())
            .map_err(|e| AuthError::Storage(format!("failed to write auth marker: {e}")))?;

        let mut cache = self.cached.write().await;
        *cache = Some(pair);

        tracing::debug!(path = %self.token_path.display(), "Token pair saved");
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<()> {
        for path in [&self.token_path, &self.marker_path] {
            if path.exists() {
                std::fs::remove_file(path)
                    .map_err(|e| AuthError::Storage(format!("failed to remove {}: {e}", path.display())))?;
            }
        }
        let mut cache = self.cached.write().await;
        *cache = None;
        Ok(())
    }

    async fn is_marked_authenticated(&self) -> bool {
        let Ok(content) = std::fs::read_to_string(&self.marker_path) else {
            return false;
        };
        match DateTime::parse_from_rfc3339(content.trim()) {
            Ok(expiry) => Utc::now() < expiry,
            Err(_) => false,
        }
    }
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// In-memory store for tests and short-lived embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    pair: Option<TokenPair>,
    marked_until: Option<DateTime<Utc>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a pair, as after a login.
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                pair: Some(TokenPair {
                    access_token: access_token.to_string(),
                    refresh_token: refresh_token.to_string(),
                }),
                marked_until: Some(marker_expiry()),
            }),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn pair(&self) -> Option<TokenPair> {
        self.state.read().await.pair.clone()
    }

    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.pair = Some(TokenPair {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        });
        state.marked_until = Some(marker_expiry());
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.pair = None;
        state.marked_until = None;
        Ok(())
    }

    async fn is_marked_authenticated(&self) -> bool {
        self.state
            .read()
            .await
            .marked_until
            .is_some_and(|until| Utc::now() < until)
    }
}

// ============================================================================
// Shared Token Store
// ============================================================================

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Create a shared file-backed token store.
pub fn file_store(data_dir: &Path) -> SharedTokenStore {
    Arc::new(FileTokenStore::new(data_dir))
}

/// Create a shared in-memory token store.
pub fn memory_store() -> SharedTokenStore {
    Arc::new(MemoryTokenStore::new())
}
