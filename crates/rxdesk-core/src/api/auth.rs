//! Login, logout and token refresh.
//!
//! These calls talk to the token endpoints directly rather than through the
//! pipeline: a 401 from `/token/` means bad credentials, not an expired
//! session, and must never trigger a refresh.

use rxdesk_types::Session;
use rxdesk_types::wire::{RefreshRequest, RefreshResponse, TokenRequest, TokenResponse, UserRecord};
use tracing::{debug, info, warn};

use super::{ApiClient, ApiError, ApiErrorKind, ApiResult};
use crate::session::mask_token;

const TOKEN_PATH: &str = "/token/";
const REFRESH_PATH: &str = "/token/refresh/";
const USER_LOOKUP_PATH: &str = "/users/fetch/";

impl ApiClient {
    /// Exchanges credentials for a token pair and persists the new session.
    ///
    /// The token endpoint does not return the numeric user id, so the user
    /// listing is fetched and searched by username. Nothing is persisted
    /// unless every step succeeds.
    ///
    /// # Errors
    /// `Authentication` for rejected credentials, `UserResolution` when no
    /// user record matches, or the underlying network/HTTP/parse error.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let tokens = self.exchange_credentials(username, password).await?;
        let user_id = self
            .resolve_user_id(&tokens.username, &tokens.access)
            .await?;

        let session = Session {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            username: tokens.username,
            user_id,
            role: tokens.userrole,
        };
        {
            let _guard = self.refresh_lock.lock().await;
            self.sessions.save(&session)?;
        }

        info!(
            username = %session.username,
            user_id = session.user_id,
            role = %session.role,
            "logged in"
        );
        Ok(session)
    }

    /// Clears the stored session. Returns whether one existed.
    ///
    /// Waits for an in-flight refresh so it cannot write the session back.
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be removed.
    pub async fn logout(&self) -> ApiResult<bool> {
        let _guard = self.refresh_lock.lock().await;
        let had_session = self.sessions.clear()?;
        if had_session {
            info!("logged out");
        }
        Ok(had_session)
    }

    /// Returns the stored session, if any.
    ///
    /// # Errors
    /// Returns a storage error if the store cannot be read.
    pub fn current_session(&self) -> ApiResult<Option<Session>> {
        self.sessions.load()
    }

    /// Mints a new access token from the stored refresh token and persists it.
    ///
    /// A rejected refresh token ends the session.
    ///
    /// # Errors
    /// `NoSession` when nothing is stored, `RefreshFailed` when the refresh
    /// call fails, `SessionChanged` when the session was replaced meanwhile.
    pub async fn refresh(&self) -> ApiResult<String> {
        let _guard = self.refresh_lock.lock().await;
        let session = self.sessions.load()?.ok_or_else(ApiError::no_session)?;

        match self.refresh_locked(&session).await {
            Err(err) if err.kind == ApiErrorKind::RefreshFailed => {
                self.teardown();
                Err(err)
            }
            other => other,
        }
    }

    /// Performs the refresh call. Caller must hold `refresh_lock`.
    ///
    /// The result is dropped with `SessionChanged` if the stored session no
    /// longer matches `session` when the response arrives.
    pub(super) async fn refresh_locked(&self, session: &Session) -> ApiResult<String> {
        if session.refresh_token.is_empty() {
            return Err(ApiError::no_session());
        }

        let refresh_failed = |message: &str| ApiError::new(ApiErrorKind::RefreshFailed, message);

        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: &session.refresh_token,
            })
            .send()
            .await
            .map_err(|e| refresh_failed("Failed to send token refresh request").with_details(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut err = refresh_failed(&format!("Token refresh failed (HTTP {status})"));
            err.status = Some(status.as_u16());
            return Err(err.with_details(body));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| refresh_failed("Failed to parse token refresh response").with_details(e.to_string()))?;

        // The store is shared with other processes; only update the session
        // this refresh was issued for.
        let current = self.sessions.load()?;
        let unchanged = current.as_ref().is_some_and(|c| {
            c.refresh_token == session.refresh_token && c.username == session.username
        });
        if !unchanged {
            return Err(ApiError::new(
                ApiErrorKind::SessionChanged,
                "Session changed during token refresh",
            ));
        }

        self.sessions
            .save(&session.with_access_token(&refreshed.access))?;
        debug!(token = %mask_token(&refreshed.access), "access token refreshed");

        Ok(refreshed.access)
    }

    async fn exchange_credentials(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .json(&TokenRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut err = ApiError::http_status(status.as_u16(), &body);
            if matches!(status.as_u16(), 400 | 401) {
                warn!(username, status = status.as_u16(), "login rejected");
                err.kind = ApiErrorKind::Authentication;
                err.message = "Invalid credentials".to_string();
            }
            return Err(err);
        }

        response.json().await.map_err(|e| {
            ApiError::new(ApiErrorKind::Parse, "Failed to parse token response")
                .with_details(e.to_string())
        })
    }

    async fn resolve_user_id(&self, username: &str, access_token: &str) -> ApiResult<u64> {
        let response = self
            .http
            .get(self.url(USER_LOOKUP_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        let users: Vec<UserRecord> = response.json().await.map_err(|e| {
            ApiError::new(ApiErrorKind::Parse, "Failed to parse user listing")
                .with_details(e.to_string())
        })?;

        users
            .into_iter()
            .find(|user| user.username == username)
            .map(|user| user.id)
            .ok_or_else(|| {
                ApiError::new(
                    ApiErrorKind::UserResolution,
                    format!("User details not found for '{username}'"),
                )
            })
    }
}
