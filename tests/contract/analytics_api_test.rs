//! Contract tests for GET /transactions/analytics
//!
//! Validates the response envelope, field names and types, and the error
//! shape for rejected windows. Runs the full app in-process against the
//! in-memory repository.

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::test;
use chrono::{Duration, Utc};
use helpers::*;
use rust_decimal_macros::dec;
use serde_json::Value;

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("X-API-Key", MERCHANT_KEY))
}

/// Test: Missing API key is rejected before the handler runs
#[actix_web::test]
async fn test_requires_api_key() {
    let app = spawn_app!(repository(vec![]));

    let req = test::TestRequest::get()
        .uri("/transactions/analytics")
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.as_response_error().status_code(), 401);
}

/// Test: Response envelope matches the dashboard contract
#[actix_web::test]
async fn test_week_response_structure() {
    let two_days_ago = Utc::now() - Duration::days(2);
    let repo = repository(vec![
        TestDataFactory::success("s1", dec!(150.50), two_days_ago),
        TestDataFactory::record(
            "p1",
            dec!(40),
            mpesa_dashboard::transactions::TransactionStatus::Pending,
            two_days_ago,
        ),
    ]);
    let app = spawn_app!(repo);

    let resp = test::call_service(&app, get("/transactions/analytics?period=week").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["analytics"]["period"], "week");

    let summary = &body["analytics"]["summary"];
    assert_eq!(summary["totalRevenue"], 150.5);
    assert_eq!(summary["totalTransactions"], 1);
    assert_eq!(summary["pendingCount"], 1);
    assert_eq!(summary["recordCount"], 2);
    assert!(summary["qrRevenue"].is_number());

    let insights = &body["analytics"]["insights"];
    assert!(insights["peakTradingHour"].as_str().unwrap().ends_with(":00"));
    let trend = insights["prediction"]["trendDirection"].as_str().unwrap();
    assert!(["growth", "decline", "stable"].contains(&trend));
    assert!(insights["prediction"]["todayRevenueForecast"].is_i64());
    assert!(insights["prediction"]["nextDayRevenue"].is_i64());

    let days = body["analytics"]["dailySummaries"].as_array().unwrap();
    assert_eq!(days.len(), 8);
    for day in days {
        assert_eq!(day["dateKey"].as_str().unwrap().len(), 10);
        assert!(day["totalRevenue"].is_number());
        assert!(day["successCount"].is_u64());
        assert!(day["pendingCount"].is_u64());
        assert!(day["failedCount"].is_u64());
    }

    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    for tx in transactions {
        // Always a single ISO-8601 string, never a provider object
        let created_at = tx["createdAt"].as_str().unwrap();
        assert!(created_at.ends_with('Z'));
    }
}

/// Test: Period defaults to week
#[actix_web::test]
async fn test_default_period_is_week() {
    let app = spawn_app!(repository(vec![]));

    let resp = test::call_service(&app, get("/transactions/analytics").to_request()).await;
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["analytics"]["period"], "week");
    assert!(body["analytics"]["insights"]["peakTradingHour"].is_null());
    assert_eq!(body["analytics"]["insights"]["prediction"]["trendDirection"], "stable");
}

/// Test: Epoch-object and ISO timestamps both come back as ISO strings
#[actix_web::test]
async fn test_mixed_timestamp_shapes_serialize_canonically() {
    let at = Utc::now() - Duration::days(1);
    let repo = repository(vec![
        TestDataFactory::epoch_success("epoch", dec!(10), at),
        TestDataFactory::iso_success("iso", dec!(20), at),
    ]);
    let app = spawn_app!(repo);

    let resp = test::call_service(&app, get("/transactions/analytics?period=week").to_request()).await;
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["analytics"]["summary"]["totalRevenue"], 30.0);
    for tx in body["transactions"].as_array().unwrap() {
        assert!(tx["createdAt"].is_string());
    }
}

/// Test: Status filter and limit only shape the transaction page
#[actix_web::test]
async fn test_status_filter_and_limit() {
    let now = Utc::now();
    let repo = repository(vec![
        TestDataFactory::success("a", dec!(10), now - Duration::days(1)),
        TestDataFactory::success("b", dec!(10), now - Duration::days(2)),
        TestDataFactory::success("c", dec!(10), now - Duration::days(3)),
        TestDataFactory::record(
            "f",
            dec!(10),
            mpesa_dashboard::transactions::TransactionStatus::Failed,
            now - Duration::days(1),
        ),
    ]);
    let app = spawn_app!(repo);

    let resp = test::call_service(
        &app,
        get("/transactions/analytics?period=week&status=success&limit=2").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;

    let ids: Vec<&str> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(body["analytics"]["summary"]["failedCount"], 1);
    assert_eq!(body["analytics"]["summary"]["totalTransactions"], 3);
}

/// Test: Rejected windows use the error envelope
#[actix_web::test]
async fn test_invalid_windows_are_rejected() {
    let app = spawn_app!(repository(vec![]));

    for uri in [
        "/transactions/analytics?period=fortnight",
        "/transactions/analytics?period=custom&startDate=2026-02-10",
        "/transactions/analytics?period=custom&startDate=2026-02-12&endDate=2026-02-10",
        "/transactions/analytics?period=custom&startDate=soon&endDate=2026-02-10",
        "/transactions/analytics?status=refunded",
        "/transactions/analytics?period=custom&startDate=-262143-01-01&endDate=2026-01-01",
        "/transactions/analytics?period=custom&startDate=0001-01-01&endDate=9999-12-31",
        "/transactions?period=custom&startDate=2026-01-01&endDate=%2B262142-12-31",
    ] {
        let resp = test::call_service(&app, get(uri).to_request()).await;
        assert_eq!(resp.status(), 400, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }
}

/// Test: Custom window spans exactly its EAT days
#[actix_web::test]
async fn test_custom_window_day_keys() {
    let app = spawn_app!(repository(vec![]));

    let resp = test::call_service(
        &app,
        get("/transactions/analytics?period=custom&startDate=2026-01-30&endDate=2026-02-02")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;

    let keys: Vec<&str> = body["analytics"]["dailySummaries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|day| day["dateKey"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02"]);
}

/// Test: Guest-attributed records count for the attributed merchant only
#[actix_web::test]
async fn test_guest_attribution() {
    let at = Utc::now() - Duration::days(1);
    let repo = repository(vec![TestDataFactory::guest_success("g1", dec!(75), at)]);
    let app = spawn_app!(repo);

    let resp = test::call_service(&app, get("/transactions/analytics?period=week").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["analytics"]["summary"]["totalRevenue"], 75.0);
    assert_eq!(
        body["transactions"][0]["guestMerchantInfo"]["originalMerchantId"],
        MERCHANT
    );

    let other = test::TestRequest::get()
        .uri("/transactions/analytics?period=week")
        .insert_header(("X-API-Key", OTHER_MERCHANT_KEY))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, other).await).await;
    // Owned directly by merchant-b as well
    assert_eq!(body["analytics"]["summary"]["totalRevenue"], 75.0);
}
