//! Core rxdesk library (config, session storage, authenticated API client).

pub mod api;
pub mod config;
pub mod logging;
pub mod session;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiRequest, ApiResponse, ApiResult};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
