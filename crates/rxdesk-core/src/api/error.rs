//! Error taxonomy for API calls.

use std::fmt;

use serde_json::Value;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Credentials rejected at login
    Authentication,
    /// Login succeeded but no user record matched the username
    UserResolution,
    /// Refresh token rejected or refresh request failed
    RefreshFailed,
    /// No stored session to refresh
    NoSession,
    /// Stored session was replaced or removed while a refresh was in flight
    SessionChanged,
    /// Transport failure (connect, timeout, body read)
    Network,
    /// Non-2xx response from a pass-through endpoint
    HttpStatus,
    /// Response body did not have the expected shape
    Parse,
    /// Session file could not be read or written
    Storage,
    /// Request rejected locally before it was sent
    InvalidRequest,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::Authentication => "authentication",
            ApiErrorKind::UserResolution => "user_resolution",
            ApiErrorKind::RefreshFailed => "refresh_failed",
            ApiErrorKind::NoSession => "no_session",
            ApiErrorKind::SessionChanged => "session_changed",
            ApiErrorKind::Network => "network",
            ApiErrorKind::HttpStatus => "http_status",
            ApiErrorKind::Parse => "parse",
            ApiErrorKind::Storage => "storage",
            ApiErrorKind::InvalidRequest => "invalid_request",
        };
        f.write_str(label)
    }
}

/// Structured error from the client with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
    /// Raw response body or underlying cause
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Attaches details (cause or body).
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Creates an HTTP status error from a response status and body.
    ///
    /// Django REST framework reports errors as `{"detail": ...}` or
    /// `{"error": ...}`; either is lifted into the message when present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let summary = serde_json::from_str::<Value>(body).ok().and_then(|json| {
            ["detail", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
        });

        Self {
            kind: ApiErrorKind::HttpStatus,
            message: match summary {
                Some(text) => format!("HTTP {status}: {text}"),
                None => format!("HTTP {status}"),
            },
            status: Some(status),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a transport error.
    pub fn network(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out"
        } else if err.is_connect() {
            "Connection failed"
        } else {
            "Request failed"
        };
        Self::new(ApiErrorKind::Network, message).with_details(err.to_string())
    }

    pub fn no_session() -> Self {
        Self::new(ApiErrorKind::NoSession, "Not logged in")
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Storage, message)
    }

    /// Returns true for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::HttpStatus && self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
