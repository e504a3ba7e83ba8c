//! Integration tests for the resource helpers.

mod support;

use rxdesk_core::ApiErrorKind;
use rxdesk_core::api::resources::Resource;
use rxdesk_types::wire::{OrderStatus, PrescriptionDecision};
use serde_json::json;
use support::{STALE_TOKEN, can_bind_localhost, client, session};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_and_show_use_resource_paths() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prescriptions/pending/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 4 }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12, "name": "Amoxicillin" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client(&server, Some(session(STALE_TOKEN)));

    let pending = client
        .list(
            Resource::PendingPrescriptions,
            &[("page".to_string(), "2".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(pending, json!([{ "id": 4 }]));

    let product = client.show(Resource::Products, 12).await.unwrap();
    assert_eq!(product["name"], "Amoxicillin");
}

#[tokio::test]
async fn test_show_without_detail_route_fails_locally() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let (client, _store) = client(&server, None);

    let err = client.show(Resource::Dashboard, 1).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::InvalidRequest);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_product_batches_active_path() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/3/batches/active/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client(&server, None);
    assert_eq!(client.product_batches(3, true).await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_update_order_status_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/orders/8/status/"))
        .and(body_json(json!({ "status": "Completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 8, "status": "Completed" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client(&server, Some(session(STALE_TOKEN)));
    let order = client
        .update_order_status(8, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order["status"], "Completed");
}

#[tokio::test]
async fn test_verify_prescription_body_and_empty_response() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prescriptions/2/verify/"))
        .and(body_json(json!({ "status": "Approved", "verification_notes": "ok" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client(&server, Some(session(STALE_TOKEN)));
    let body = client
        .verify_prescription(2, PrescriptionDecision::Approved, "ok")
        .await
        .unwrap();
    assert_eq!(body, serde_json::Value::Null);
}
