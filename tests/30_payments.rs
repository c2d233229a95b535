mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

/// Create a building and a unit to hang payments off, returning the unit id.
async fn seed_unit(app: &axum::Router) -> i64 {
    let (status, building) = common::request(
        app,
        "POST",
        "/api/buildings",
        Some(json!({ "name": "Marina Tower" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "building create failed: {building}");
    let building_id = building["id"].as_i64().unwrap();

    let (status, unit) = common::request(
        app,
        "POST",
        "/api/units",
        Some(json!({
            "building_id": building_id,
            "unit_number": "U1",
            "unit_type": "apartment"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unit create failed: {unit}");
    unit["id"].as_i64().unwrap()
}

async fn payments_for(app: &axum::Router, unit_id: i64) -> Vec<Value> {
    let (status, body) =
        common::request(app, "GET", &format!("/api/payments?unit_id={unit_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn single_payment_is_stored_with_attribution() {
    let app = common::test_app().await;
    let unit_id = seed_unit(&app).await;

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "unit_id": unit_id,
            "installments": "1",
            "payment_installment_amount_1": "1200",
            "payment_installment_due_date_1": "2025-02-01",
            "payment_installment_type_1": "rent"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "payment create failed: {body}");
    assert_eq!(body["paymentsAdded"], json!(1));

    let payments = payments_for(&app, unit_id).await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], json!(1200.0));
    assert_eq!(payments[0]["status"], json!("pending"));
    assert_eq!(payments[0]["payment_type"], json!("rent"));
    assert_eq!(payments[0]["created_by_username"], json!("admin"));
    assert_eq!(payments[0]["calculated_status"], json!("overdue"));
}

#[tokio::test]
async fn three_installments_with_a_gap_store_two_rows() {
    let app = common::test_app().await;
    let unit_id = seed_unit(&app).await;

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "unit_id": unit_id,
            "installments": "3",
            "payment_installment_amount_1": "100",
            "payment_installment_due_date_1": "2025-02-01",
            // index 2 has a due date but no amount: silently skipped
            "payment_installment_due_date_2": "2025-03-01",
            "payment_installment_amount_3": "300",
            "payment_installment_due_date_3": "2025-04-01"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paymentsAdded"], json!(2));

    let mut amounts: Vec<f64> = payments_for(&app, unit_id)
        .await
        .iter()
        .map(|p| p["amount"].as_f64().unwrap())
        .collect();
    amounts.sort_by(f64::total_cmp);
    assert_eq!(amounts, vec![100.0, 300.0]);
}

#[tokio::test]
async fn single_payment_without_due_date_is_rejected() {
    let app = common::test_app().await;
    let unit_id = seed_unit(&app).await;

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "unit_id": unit_id,
            "installments": "1",
            "payment_installment_amount_1": "1200"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn schedule_where_no_installment_survives_is_rejected() {
    let app = common::test_app().await;
    let unit_id = seed_unit(&app).await;

    let (status, _body) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "unit_id": unit_id,
            "installments": "2",
            "payment_installment_amount_1": "100",
            "payment_installment_amount_2": "200"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_unit_id_is_rejected() {
    let app = common::test_app().await;

    let (status, _body) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "installments": "1",
            "payment_installment_amount_1": "1200",
            "payment_installment_due_date_1": "2025-02-01"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settlement_updates_progress_and_details() {
    let app = common::test_app().await;
    let unit_id = seed_unit(&app).await;

    let (_, created) = common::request(
        &app,
        "POST",
        "/api/payments",
        Some(json!({
            "unit_id": unit_id,
            "installments": "1",
            "payment_installment_amount_1": "1000",
            "payment_installment_due_date_1": "2099-01-01"
        })),
    )
    .await;
    let payment_id = created["id"].as_i64().unwrap();

    let (status, body) = common::request(
        &app,
        "PUT",
        &format!("/api/payments/{payment_id}/payment-status"),
        Some(json!({ "paid_amount": "250", "payment_status": "partial" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, details) = common::request(
        &app,
        "GET",
        &format!("/api/payments/{payment_id}/details"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["paid_amount"], json!(250.0));
    assert_eq!(details["remaining_amount"], json!(750.0));
    assert_eq!(details["payment_percentage"], json!(25.0));
    assert_eq!(details["calculated_status"], json!("paid_partial"));

    // Updating a missing payment reports 404
    let (status, _body) = common::request(
        &app,
        "PUT",
        "/api/payments/999/payment-status",
        Some(json!({ "paid_amount": "1", "payment_status": "partial" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
