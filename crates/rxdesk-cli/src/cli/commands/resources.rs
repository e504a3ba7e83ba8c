//! Catalog, order and prescription command handlers.

use anyhow::Result;
use rxdesk_core::ApiClient;
use rxdesk_core::api::resources::Resource;
use rxdesk_types::wire::{OrderStatus, PrescriptionDecision};

use super::{print_value, report};

pub async fn list(
    client: &ApiClient,
    resource: Resource,
    query: &[(String, String)],
    table: bool,
) -> Result<()> {
    let value = client.list(resource, query).await.map_err(report)?;
    print_value(&value, table)
}

pub async fn show(client: &ApiClient, resource: Resource, id: u64) -> Result<()> {
    let value = client.show(resource, id).await.map_err(report)?;
    print_value(&value, false)
}

pub async fn batches(client: &ApiClient, product_id: u64, active: bool, table: bool) -> Result<()> {
    let value = client
        .product_batches(product_id, active)
        .await
        .map_err(report)?;
    print_value(&value, table)
}

pub async fn order_status(client: &ApiClient, order_id: u64, status: OrderStatus) -> Result<()> {
    let value = client
        .update_order_status(order_id, status)
        .await
        .map_err(report)?;
    print_value(&value, false)
}

pub async fn verify(
    client: &ApiClient,
    prescription_id: u64,
    decision: PrescriptionDecision,
    notes: &str,
) -> Result<()> {
    let value = client
        .verify_prescription(prescription_id, decision, notes)
        .await
        .map_err(report)?;
    if value.is_null() {
        println!("Prescription {prescription_id} {}", decision.as_str().to_lowercase());
        return Ok(());
    }
    print_value(&value, false)
}
