//! Convenience calls for the catalog, order, prescription and report
//! endpoints. Payloads stay opaque JSON.

use std::fmt;
use std::str::FromStr;

use rxdesk_types::wire::{
    OrderStatus, OrderStatusRequest, PrescriptionDecision, VerifyPrescriptionRequest,
};
use serde_json::Value;

use super::{ApiClient, ApiError, ApiErrorKind, ApiRequest, ApiResult};

/// Listable API collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Categories,
    Batches,
    Orders,
    Prescriptions,
    PendingPrescriptions,
    MyPrescriptions,
    Users,
    Dashboard,
    RecentOrders,
    SalesReport,
    InventoryReport,
    PrescriptionReport,
}

impl Resource {
    pub fn all() -> &'static [Resource] {
        &[
            Resource::Products,
            Resource::Categories,
            Resource::Batches,
            Resource::Orders,
            Resource::Prescriptions,
            Resource::PendingPrescriptions,
            Resource::MyPrescriptions,
            Resource::Users,
            Resource::Dashboard,
            Resource::RecentOrders,
            Resource::SalesReport,
            Resource::InventoryReport,
            Resource::PrescriptionReport,
        ]
    }

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Batches => "batches",
            Resource::Orders => "orders",
            Resource::Prescriptions => "prescriptions",
            Resource::PendingPrescriptions => "pending-prescriptions",
            Resource::MyPrescriptions => "my-prescriptions",
            Resource::Users => "users",
            Resource::Dashboard => "dashboard",
            Resource::RecentOrders => "recent-orders",
            Resource::SalesReport => "sales-report",
            Resource::InventoryReport => "inventory-report",
            Resource::PrescriptionReport => "prescription-report",
        }
    }

    /// Collection path relative to the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Products => "/products/",
            Resource::Categories => "/categories/",
            Resource::Batches => "/batches/",
            Resource::Orders => "/orders/",
            Resource::Prescriptions => "/prescriptions/",
            Resource::PendingPrescriptions => "/prescriptions/pending/",
            Resource::MyPrescriptions => "/prescriptions/customer/",
            Resource::Users => "/users/",
            Resource::Dashboard => "/dashboard/stats/",
            Resource::RecentOrders => "/dashboard/recent-orders/",
            Resource::SalesReport => "/reports/sales/",
            Resource::InventoryReport => "/reports/inventory/",
            Resource::PrescriptionReport => "/reports/prescriptions/",
        }
    }

    /// Detail path for one record, for collections that have one.
    pub fn detail_path(&self, id: u64) -> Option<String> {
        match self {
            Resource::Products
            | Resource::Batches
            | Resource::Orders
            | Resource::Prescriptions
            | Resource::Users => Some(format!("{}{id}/", self.path())),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Resource::all()
            .iter()
            .copied()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Resource::all().iter().map(Resource::name).collect();
                format!("unknown resource '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

impl ApiClient {
    /// Fetches a collection.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn list(&self, resource: Resource, query: &[(String, String)]) -> ApiResult<Value> {
        let mut request = ApiRequest::get(resource.path());
        request.query.extend_from_slice(query);
        self.execute_json(&request).await
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    /// `InvalidRequest` for collections without a detail route; otherwise see
    /// [`ApiClient::execute`].
    pub async fn show(&self, resource: Resource, id: u64) -> ApiResult<Value> {
        let path = resource.detail_path(id).ok_or_else(|| {
            ApiError::new(
                ApiErrorKind::InvalidRequest,
                format!("'{resource}' has no per-record endpoint"),
            )
        })?;
        self.execute_json(&ApiRequest::get(path)).await
    }

    /// Lists the batches of one product, optionally only unexpired stock.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn product_batches(&self, product_id: u64, active_only: bool) -> ApiResult<Value> {
        let path = if active_only {
            format!("/product/{product_id}/batches/active/")
        } else {
            format!("/product/{product_id}/batches/")
        };
        self.execute_json(&ApiRequest::get(path)).await
    }

    /// Moves an order to a new status.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn update_order_status(&self, order_id: u64, status: OrderStatus) -> ApiResult<Value> {
        let body = serde_json::to_value(OrderStatusRequest { status }).map_err(|e| {
            ApiError::new(ApiErrorKind::InvalidRequest, "Failed to encode request")
                .with_details(e.to_string())
        })?;
        self.execute_json(&ApiRequest::put(format!("/orders/{order_id}/status/"), body))
            .await
    }

    /// Records a pharmacist's decision on a prescription.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn verify_prescription(
        &self,
        prescription_id: u64,
        decision: PrescriptionDecision,
        notes: &str,
    ) -> ApiResult<Value> {
        let body = serde_json::to_value(VerifyPrescriptionRequest {
            status: decision,
            verification_notes: notes,
        })
        .map_err(|e| {
            ApiError::new(ApiErrorKind::InvalidRequest, "Failed to encode request")
                .with_details(e.to_string())
        })?;
        self.execute_json(&ApiRequest::post(
            format!("/prescriptions/{prescription_id}/verify/"),
            body,
        ))
        .await
    }
}
