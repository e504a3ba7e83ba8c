//! Request and response bodies for the auth endpoints, plus the status
//! vocabularies accepted by the order and prescription endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::Role;

/// Body of `POST /token/`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub userrole: Role,
    pub username: String,
}

/// Body of `POST /token/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of `POST /token/refresh/`.
///
/// The backend does not rotate refresh tokens, so only `access` comes back.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// One entry of `GET /users/fetch/`.
///
/// Only `id` and `username` matter to the client; everything else is kept
/// opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Order lifecycle states accepted by `PUT /orders/{id}/status/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn all() -> &'static [OrderStatus] {
        &[
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ]
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<_> = OrderStatus::all().iter().map(OrderStatus::as_str).collect();
                format!("invalid order status '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

/// Outcome of a pharmacist's prescription review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionDecision {
    Approved,
    Rejected,
}

impl PrescriptionDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionDecision::Approved => "Approved",
            PrescriptionDecision::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PrescriptionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /prescriptions/{id}/verify/`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPrescriptionRequest<'a> {
    pub status: PrescriptionDecision,
    pub verification_notes: &'a str,
}

/// Body of `PUT /orders/{id}/status/`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}
