//! Authenticated request pipeline.
//!
//! Every call goes through [`ApiClient::execute`]: the stored access token is
//! attached as a bearer header, and a 401 on the first attempt triggers one
//! refresh and one retry. A failed refresh, or a second 401, tears the
//! session down.
//!
//! Per-request states:
//!
//! ```text
//! UNAUTHENTICATED/SENT --2xx--> DONE
//! SENT --401--> AWAITING_REFRESH --refresh ok--> RETRIED --2xx--> DONE
//! AWAITING_REFRESH --refresh failed | 401--> FAILED (session cleared)
//! ```

mod auth;
mod error;
pub mod resources;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use rxdesk_types::Session;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use self::error::{ApiError, ApiErrorKind, ApiResult};
use crate::session::SessionStore;

/// Standard User-Agent header for rxdesk API requests.
pub const USER_AGENT: &str = concat!("rxdesk/", env!("CARGO_PKG_VERSION"));

/// Which send of a request this is.
///
/// A request is sent at most twice: once, and once more after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Lifecycle of one outgoing request, as reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Sent without credentials (no session)
    Unauthenticated,
    /// Sent with the stored bearer token
    Sent,
    /// Got a 401; waiting on the refresh call
    AwaitingRefresh,
    /// Re-sent with the refreshed token
    Retried,
    Done,
    /// Gave up; the session has been torn down
    Failed,
}

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A successful (2xx) response. The body is returned exactly as received.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
    /// Whether the body came from the first send or the post-refresh retry
    pub attempt: Attempt,
}

impl ApiResponse {
    /// Deserializes the body.
    ///
    /// # Errors
    /// Returns a parse error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ApiError::new(ApiErrorKind::Parse, "Failed to parse response body")
                .with_details(e.to_string())
        })
    }

    /// Returns the body as JSON, mapping an empty body (e.g. 204) to `null`.
    ///
    /// # Errors
    /// Returns a parse error if a non-empty body is not JSON.
    pub fn value(&self) -> ApiResult<Value> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        self.json()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client that authenticates against the pharmacy API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
    /// Serializes refreshes, login and logout. Concurrent 401s share one
    /// refresh call, and a refresh never writes over a newer session.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ApiClient {
    /// Creates a client with default HTTP settings and no timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, sessions: Arc<dyn SessionStore>) -> ApiResult<Self> {
        Self::with_timeout(base_url, sessions, None)
    }

    /// Creates a client with an HTTP timeout (`None` disables it).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ApiError::network(&e))?;
        Ok(Self::with_http(http, base_url, sessions))
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            sessions,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `request`, refreshing and retrying once on a 401.
    ///
    /// # Errors
    /// Returns the failing response as an `HttpStatus` error, or a network
    /// error. After a failed refresh the error is the original 401.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let sent = self.sessions.load()?;
        let sent_token = sent.as_ref().map(|s| s.access_token.as_str());

        match self.dispatch(request, Attempt::First, sent_token).await {
            Err(err) if err.is_unauthorized() => self.recover(request, sent.as_ref(), err).await,
            other => other,
        }
    }

    /// Sends and decodes the body as JSON.
    ///
    /// # Errors
    /// See [`ApiClient::execute`]; additionally a parse error for a non-JSON body.
    pub async fn execute_json(&self, request: &ApiRequest) -> ApiResult<Value> {
        self.execute(request).await?.value()
    }

    async fn recover(
        &self,
        request: &ApiRequest,
        sent: Option<&Session>,
        original: ApiError,
    ) -> ApiResult<ApiResponse> {
        debug!(
            path = %request.path,
            state = ?RequestState::AwaitingRefresh,
            "unauthorized, refreshing access token"
        );

        let token = match self.refresh_for(sent).await {
            Ok(token) => token,
            Err(refresh_err) if refresh_err.kind == ApiErrorKind::SessionChanged => {
                // Logged out or replaced elsewhere: leave the store alone.
                info!(path = %request.path, "session changed during refresh");
                return Err(original);
            }
            Err(refresh_err) => {
                warn!(
                    path = %request.path,
                    state = ?RequestState::Failed,
                    error = %refresh_err,
                    kind = %refresh_err.kind,
                    "refresh failed"
                );
                self.teardown();
                return Err(original);
            }
        };

        match self.dispatch(request, Attempt::Retry, Some(&token)).await {
            Err(err) if err.is_unauthorized() => {
                warn!(
                    path = %request.path,
                    state = ?RequestState::Failed,
                    "refreshed token rejected"
                );
                self.teardown();
                Err(err)
            }
            other => other,
        }
    }

    /// Returns a usable access token after the token from `sent` was rejected.
    ///
    /// Holds the refresh lock across the read-refresh-write sequence. If
    /// another request already replaced the access token while this one
    /// waited, the replacement is returned without a second refresh call.
    /// A session that was removed or belongs to a different login yields
    /// `SessionChanged`.
    async fn refresh_for(&self, sent: Option<&Session>) -> ApiResult<String> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.sessions.load()?;

        let (Some(sent), Some(current)) = (sent, current.as_ref()) else {
            return Err(if sent.is_none() && current.is_none() {
                ApiError::no_session()
            } else {
                ApiError::new(ApiErrorKind::SessionChanged, "Session changed before refresh")
            });
        };

        if current.refresh_token != sent.refresh_token || current.username != sent.username {
            return Err(ApiError::new(
                ApiErrorKind::SessionChanged,
                "Session changed before refresh",
            ));
        }

        if current.access_token != sent.access_token {
            debug!("access token already replaced, reusing it");
            return Ok(current.access_token.clone());
        }

        self.refresh_locked(current).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        attempt: Attempt,
        token: Option<&str>,
    ) -> ApiResult<ApiResponse> {
        let state = match (attempt, token) {
            (Attempt::Retry, _) => RequestState::Retried,
            (Attempt::First, Some(_)) => RequestState::Sent,
            (Attempt::First, None) => RequestState::Unauthenticated,
        };
        debug!(method = %request.method, path = %request.path, ?state, "sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::network(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiError::network(&e))?;

        if !status.is_success() {
            debug!(path = %request.path, status = status.as_u16(), ?state, "request failed");
            return Err(ApiError::http_status(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        debug!(path = %request.path, status = status.as_u16(), state = ?RequestState::Done, "request complete");
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            attempt,
        })
    }

    /// Clears the stored session. Storage failures are logged, not raised,
    /// so the caller still sees the error that caused the teardown.
    fn teardown(&self) {
        match self.sessions.clear() {
            Ok(true) => info!("session cleared"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to clear session"),
        }
    }
}
