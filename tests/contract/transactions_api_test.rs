//! Contract tests for the ledger endpoints under /transactions
//!
//! Covers listing, single lookup with ownership checks, creation, status
//! updates and QR insights.

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::test;
use chrono::{Duration, Utc};
use helpers::*;
use mpesa_dashboard::transactions::TransactionStatus;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn as_merchant(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-API-Key", MERCHANT_KEY))
}

fn ids(body: &Value) -> Vec<String> {
    body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["id"].as_str().unwrap().to_string())
        .collect()
}

/// Test: Listing is newest first with count
#[actix_web::test]
async fn test_list_transactions() {
    let now = Utc::now();
    let repo = repository(vec![
        TestDataFactory::success("old", dec!(10), now - Duration::days(40)),
        TestDataFactory::success("new", dec!(10), now - Duration::hours(2)),
        TestDataFactory::guest_success("guest", dec!(10), now - Duration::days(3)),
        TestDataFactory::malformed("broken", dec!(10)),
    ]);
    let app = spawn_app!(repo);

    let resp = test::call_service(&app, as_merchant(test::TestRequest::get().uri("/transactions")).to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 4);
    // Unbounded listing keeps unreadable timestamps, sorted last
    assert_eq!(ids(&body), vec!["new", "guest", "old", "broken"]);
    assert!(body["transactions"][3]["createdAt"].is_null());
}

/// Test: Period and status narrow the listing
#[actix_web::test]
async fn test_list_with_period_and_status() {
    let now = Utc::now();
    let repo = repository(vec![
        TestDataFactory::success("recent", dec!(10), now - Duration::days(2)),
        TestDataFactory::record("pending", dec!(10), TransactionStatus::Pending, now - Duration::days(2)),
        TestDataFactory::success("old", dec!(10), now - Duration::days(40)),
        TestDataFactory::malformed("broken", dec!(10)),
    ]);
    let app = spawn_app!(repo);

    let req = as_merchant(test::TestRequest::get().uri("/transactions?period=week&status=success"));
    let body: Value = test::read_body_json(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(ids(&body), vec!["recent"]);

    let req = as_merchant(test::TestRequest::get().uri("/transactions/all?limit=2"));
    let body: Value = test::read_body_json(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["count"], 2);
}

/// Test: Single lookup enforces ownership
#[actix_web::test]
async fn test_get_transaction_ownership() {
    let at = Utc::now() - Duration::hours(1);
    let foreign = mpesa_dashboard::transactions::TransactionRecord::new(
        "foreign",
        OTHER_MERCHANT,
        dec!(5),
        TransactionStatus::Success,
        at.into(),
    );
    let repo = repository(vec![
        TestDataFactory::success("mine", dec!(10), at),
        TestDataFactory::guest_success("guest", dec!(10), at),
        foreign,
    ]);
    let app = spawn_app!(repo);

    let resp = test::call_service(&app, as_merchant(test::TestRequest::get().uri("/transactions/mine")).to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["transaction"]["id"], "mine");
    assert_eq!(body["transaction"]["amount"], 10.0);

    let resp = test::call_service(&app, as_merchant(test::TestRequest::get().uri("/transactions/guest")).to_request()).await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(&app, as_merchant(test::TestRequest::get().uri("/transactions/foreign")).to_request()).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");

    let resp = test::call_service(&app, as_merchant(test::TestRequest::get().uri("/transactions/missing")).to_request()).await;
    assert_eq!(resp.status(), 404);
}

/// Test: Analytics is not captured by the `/{id}` route
#[actix_web::test]
async fn test_analytics_route_is_not_an_id() {
    let app = spawn_app!(repository(vec![]));

    let resp = test::call_service(
        &app,
        as_merchant(test::TestRequest::get().uri("/transactions/analytics")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("analytics").is_some());
}

/// Test: Creation records a pending transaction with its source
#[actix_web::test]
async fn test_create_transaction() {
    let repo = repository(vec![]);
    let app = spawn_app!(repo.clone());

    let req = as_merchant(test::TestRequest::post().uri("/transactions")).set_json(json!({
        "phoneNumber": "254712345678",
        "amount": 250,
        "qrData": {"name": "Counter 1", "description": "Lunch"}
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "Transaction successful");
    let id = body["data"]["transactionId"].as_str().unwrap().to_string();

    let req = as_merchant(test::TestRequest::get().uri(&format!("/transactions/{}", id)));
    let body: Value = test::read_body_json(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["transaction"]["status"], "pending");
    assert_eq!(body["transaction"]["source"], "qr_generated");
    assert_eq!(body["transaction"]["description"], "Lunch");
    assert!(body["transaction"]["transactionRef"].as_str().unwrap().starts_with("Tx_"));
}

/// Test: Creation validates phone and amount
#[actix_web::test]
async fn test_create_transaction_validation() {
    let app = spawn_app!(repository(vec![]));

    for payload in [
        json!({"amount": 100}),
        json!({"phoneNumber": "254712345678"}),
        json!({"phoneNumber": "254712345678", "amount": 0}),
        json!({"phoneNumber": "254712345678", "amount": -5}),
    ] {
        let req = as_merchant(test::TestRequest::post().uri("/transactions")).set_json(&payload);
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 400, "{}", payload);
    }
}

/// Test: Status updates stamp reason and updatedAt
#[actix_web::test]
async fn test_update_status() {
    let at = Utc::now() - Duration::hours(1);
    let repo = repository(vec![TestDataFactory::record("p1", dec!(10), TransactionStatus::Pending, at)]);
    let app = spawn_app!(repo);

    let req = as_merchant(test::TestRequest::patch().uri("/transactions/p1/status"))
        .set_json(json!({"status": "success", "reason": "Confirmed by M-Pesa"}));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["transaction"]["status"], "success");
    assert_eq!(body["transaction"]["updateReason"], "Confirmed by M-Pesa");
    assert!(body["transaction"]["updatedAt"].is_string());

    let other = test::TestRequest::patch()
        .uri("/transactions/p1/status")
        .insert_header(("X-API-Key", OTHER_MERCHANT_KEY))
        .set_json(json!({"status": "failed"}));
    assert_eq!(test::call_service(&app, other.to_request()).await.status(), 403);
}

/// Test: QR insights cover every QR record of the merchant
#[actix_web::test]
async fn test_qr_insights() {
    let at = Utc::now() - Duration::days(60);
    let repo = repository(vec![
        TestDataFactory::success("q1", dec!(300), at).with_qr_data(json!({"name": "Till"})),
        TestDataFactory::record("q2", dec!(50), TransactionStatus::Failed, at)
            .with_qr_data(json!({"name": "Till"})),
        TestDataFactory::success("plain", dec!(900), at),
    ]);
    let app = spawn_app!(repo);

    let req = as_merchant(test::TestRequest::get().uri("/transactions/qr-insights"));
    let body: Value = test::read_body_json(test::call_service(&app, req.to_request()).await).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["insights"]["qrCount"], 2);
    assert_eq!(body["insights"]["qrSuccessCount"], 1);
    assert_eq!(body["insights"]["qrRevenue"], 300.0);
}

/// Test: Health probe is public
#[actix_web::test]
async fn test_health_is_public() {
    let app = spawn_app!(repository(vec![]));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);
}
