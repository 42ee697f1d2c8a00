//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use url::Url;

use liceo_auth::{endpoints, memory_store, Session, SharedTokenStore};

use crate::api::{AuthApi, InscripcionesApi};
use crate::error::{Error, Result};

/// Environment variable overriding the default backend address.
pub const BASE_URL_ENV: &str = "LICEO_API_BASE_URL";

/// Default backend address when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a call carries the bearer token and participates in the
/// refresh-and-retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Attach the bearer header; refresh and retry once on 401.
    Bearer,
    /// No auth header and no refresh: login, refresh, public registration.
    /// A 401 here is a credential failure and surfaces verbatim.
    Skip,
}

/// Liceo portal API client.
///
/// Wraps every call in the bearer-token lifecycle: an expired access
/// token is refreshed before the request goes out, and a 401 answer
/// triggers exactly one refresh-and-retry cycle before the session is
/// declared expired.
///
/// # Example
///
/// ```no_run
/// use liceo_client::LiceoClient;
///
/// # async fn example() -> liceo_client::Result<()> {
/// let client = LiceoClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
///
/// client.auth().login("maria.gonzalez", "secreta").await?;
///
/// let cursos = client.inscripciones().cursos_disponibles(2026).await?;
/// for curso in cursos {
///     println!("{} ({} divisiones)", curso.descripcion, curso.divisiones.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LiceoClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Session holding the token store and refresh machinery.
    pub(crate) session: Session,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl LiceoClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from `LICEO_API_BASE_URL`, falling back to the
    /// default localhost address.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::builder().base_url(base_url).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The session behind this client: token store, explicit refresh,
    /// and the background auto-refresh task.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the inscripciones API.
    pub fn inscripciones(&self) -> InscripcionesApi {
        InscripcionesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>, Auth::Bearer, HeaderMap::new())
            .await
    }

    /// Make an authenticated POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), Auth::Bearer, HeaderMap::new())
            .await
    }

    /// Make a POST request to a public endpoint, without auth.
    pub(crate) async fn post_public<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), Auth::Skip, HeaderMap::new())
            .await
    }

    /// Run one request through the full cycle and parse the response.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
        extra_headers: HeaderMap,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self.execute(method, path, body, auth, extra_headers).await?;
        Self::read_json(response).await
    }

    /// BUILD_HEADERS → SEND → (401) REFRESH → RETRY_SEND → RESOLVE|FAIL.
    ///
    /// Returns the response once its status is 2xx; every failure path
    /// has already been normalized into an [`Error`].
    pub(crate) async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
        extra_headers: HeaderMap,
    ) -> Result<reqwest::Response>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;

        // Resolve the bearer token, refreshing an expired one up front.
        // A failed pre-send refresh means the session is gone: nothing
        // is sent.
        let bearer = match auth {
            Auth::Skip => None,
            Auth::Bearer => match self.inner.session.valid_access_token().await {
                Ok(token) => token,
                Err(e) => {
                    tracing::debug!(error = %e, "Pre-send refresh failed");
                    self.clear_session().await;
                    return Err(Error::SessionExpired);
                }
            },
        };

        let response = self
            .send_once(&method, &url, body, bearer.as_deref(), &extra_headers)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            tracing::debug!(url = %url, "Got 401, refreshing and retrying once");
            if let Err(e) = self.inner.session.refresh_stale(bearer.as_deref()).await {
                tracing::debug!(error = %e, "Refresh after 401 failed");
                self.clear_session().await;
                return Err(Error::SessionExpired);
            }
            let bearer = self.inner.session.store().access_token().await;
            let retry = self
                .send_once(&method, &url, body, bearer.as_deref(), &extra_headers)
                .await?;
            if retry.status() == StatusCode::UNAUTHORIZED {
                // The fresh token was rejected too; give up, never loop.
                self.clear_session().await;
                return Err(Error::SessionExpired);
            }
            return Self::check_status(retry).await;
        }

        Self::check_status(response).await
    }

    async fn send_once<B>(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&B>,
        bearer: Option<&str>,
        extra_headers: &HeaderMap,
    ) -> Result<reqwest::Response>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::Config("Invalid bearer token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut request = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .headers(headers)
            .timeout(self.inner.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn clear_session(&self) {
        if let Err(e) = self.inner.session.store().clear_tokens().await {
            tracing::warn!(error = %e, "Failed to clear token store");
        }
    }

    /// Pass 2xx through; normalize everything else into the server's own
    /// message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status,
            message: endpoints::error_message(&body),
        })
    }

    /// Parse a JSON body when the response declares one. Responses
    /// without a JSON content-type produce no value; callers typed to
    /// expect a body get a JSON error rather than a silent default.
    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        if is_json {
            return Ok(response.json().await?);
        }
        Ok(serde_json::from_value(serde_json::Value::Null)?)
    }
}

/// Builder for creating a [`LiceoClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<SharedTokenStore>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a specific token store. Defaults to an in-memory store that
    /// lives as long as the client; pass a [`liceo_auth::FileTokenStore`]
    /// to keep the session across runs.
    pub fn token_store(mut self, store: SharedTokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LiceoClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize so Url::join keeps the full path.
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("liceo-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(Error::from)?;

        let store = self.store.unwrap_or_else(memory_store);
        let session = Session::new(http.clone(), base_url.clone(), store);

        Ok(LiceoClient {
            inner: Arc::new(ClientInner {
                http,
                session,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
