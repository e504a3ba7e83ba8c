//! The persisted login session.
//!
//! A session is always complete: every field is required, so a document that
//! is missing any of them fails to deserialize instead of producing a
//! half-initialized session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role as reported by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "Pharmacy Staff")]
    PharmacyStaff,
    Customer,
}

impl Role {
    /// Returns the role string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::PharmacyStaff => "Pharmacy Staff",
            Role::Customer => "Customer",
        }
    }

    /// Returns true for back-office roles (admin and pharmacy staff).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::PharmacyStaff)
    }

    /// Returns all roles for iteration.
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::PharmacyStaff, Role::Customer]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Credentials and identity for the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Long-lived credential used only to mint new access tokens
    pub refresh_token: String,
    pub username: String,
    /// Numeric user id resolved at login
    #[serde(rename = "id")]
    pub user_id: u64,
    #[serde(rename = "userrole")]
    pub role: Role,
}

impl Session {
    /// Returns a copy with the access token replaced.
    ///
    /// The refresh token is never rotated by the backend, so it is kept.
    #[must_use]
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..self.clone()
        }
    }
}
