//! Shared helpers for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rxdesk_core::{ApiClient, MemorySessionStore};
use rxdesk_types::{Role, Session};
use serde_json::json;
use wiremock::{MockServer, Request, ResponseTemplate};

pub const STALE_TOKEN: &str = "access-stale";
pub const FRESH_TOKEN: &str = "access-fresh";
pub const REFRESH_TOKEN: &str = "refresh-1";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: REFRESH_TOKEN.to_string(),
        username: "alice".to_string(),
        user_id: 5,
        role: Role::PharmacyStaff,
    }
}

/// Client against `server` with an in-memory store holding `initial`.
pub fn client(server: &MockServer, initial: Option<Session>) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(match initial {
        Some(session) => MemorySessionStore::with_session(session),
        None => MemorySessionStore::new(),
    });
    let shared: Arc<MemorySessionStore> = Arc::clone(&store);
    let client = ApiClient::new(server.uri(), shared).unwrap();
    (client, store)
}

/// The 401 body simplejwt returns for an expired access token.
pub fn token_not_valid() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    }))
}

pub fn authorization(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
