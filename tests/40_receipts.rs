mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn receipt_numbers_follow_the_daily_sequence() {
    let app = common::test_app().await;

    let mut numbers = Vec::new();
    for value in [100, 250] {
        let (status, body) = common::request(
            &app,
            "POST",
            "/api/receipt",
            Some(json!({
                "type": "قبض",
                "value": value,
                "client_name": "Ali",
                "description": "rent payment"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "receipt create failed: {body}");
        numbers.push(body["receipt_number"].as_str().unwrap().to_string());
    }

    assert!(numbers[0].ends_with("-001"));
    assert!(numbers[1].ends_with("-002"));
    // Same day, same prefix
    assert_eq!(numbers[0].split('-').next(), numbers[1].split('-').next());
}

#[tokio::test]
async fn receipt_create_validates_required_fields() {
    let app = common::test_app().await;

    let (status, _body) = common::request(
        &app,
        "POST",
        "/api/receipt",
        Some(json!({ "type": "قبض", "value": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_balance_receipts_against_payouts() {
    let app = common::test_app().await;

    for (receipt_type, value) in [("قبض", 300), ("قبض", 200), ("صرف", 100)] {
        let (status, _body) = common::request(
            &app,
            "POST",
            "/api/receipt",
            Some(json!({
                "type": receipt_type,
                "value": value,
                "client_name": "Ali",
                "description": "entry"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, stats) = common::request(&app, "GET", "/api/receipts-stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_receipts"], json!(3));
    assert_eq!(stats["total_receipt_amount"], json!(500.0));
    assert_eq!(stats["total_payment_amount"], json!(100.0));
    assert_eq!(stats["balance"], json!(400.0));
}

#[tokio::test]
async fn receipt_search_fetch_and_delete_round_out_the_lifecycle() {
    let app = common::test_app().await;

    let (_, created) = common::request(
        &app,
        "POST",
        "/api/receipt",
        Some(json!({
            "type": "قبض",
            "value": 100,
            "client_name": "Omar",
            "description": "deposit"
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, rows) = common::request(&app, "GET", "/api/receipts?q=Omar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let (status, _row) = common::request(&app, "GET", &format!("/api/receipt/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) =
        common::request(&app, "DELETE", &format!("/api/receipt/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _row) = common::request(&app, "GET", &format!("/api/receipt/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn precontracts_number_by_month_and_support_partial_updates() {
    let app = common::test_app().await;

    let (status, first) = common::request(
        &app,
        "POST",
        "/api/precontract",
        Some(json!({ "client_name": "Ali", "unit_number": "U1", "rent_value": 4000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "precontract create failed: {first}");
    let first_number = first["contract_number"].as_str().unwrap();
    assert!(first_number.ends_with("-00001"));
    assert_eq!(first_number.split('-').count(), 3);

    let (_, second) = common::request(
        &app,
        "POST",
        "/api/precontract",
        Some(json!({ "client_name": "Omar" })),
    )
    .await;
    assert!(second["contract_number"].as_str().unwrap().ends_with("-00002"));

    // Partial update touches only the submitted columns
    let id = first["id"].as_i64().unwrap();
    let (status, body) = common::request(
        &app,
        "PATCH",
        &format!("/api/precontract/{id}"),
        Some(json!({ "rent_value": 4500, "details": "renewed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "patch failed: {body}");

    let (_, rows) = common::request(&app, "GET", "/api/precontracts", None).await;
    let row = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap()
        .clone();
    assert_eq!(row["rent_value"], json!(4500.0));
    assert_eq!(row["details"], json!("renewed"));
    assert_eq!(row["client_name"], json!("Ali"));

    // Empty patch is rejected
    let (status, _body) = common::request(
        &app,
        "PATCH",
        &format!("/api/precontract/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
