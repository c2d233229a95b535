use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::receipt::{Receipt, ReceiptStats};
use crate::error::{ApiError, ApiResult};
use crate::services::sequence;
use crate::types::FormField;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReceiptPayload {
    #[serde(default, rename = "type")]
    pub receipt_type: FormField,
    #[serde(default)]
    pub value: FormField,
    #[serde(default)]
    pub client_name: FormField,
    #[serde(default)]
    pub phone: FormField,
    #[serde(default)]
    pub description: FormField,
    #[serde(default)]
    pub payment_method: FormField,
    #[serde(default)]
    pub reference_number: FormField,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// POST /api/receipt - voucher with a daily sequential number
/// (`YYYYMMDD-NNN`); the receipt number column is UNIQUE as a backstop for
/// the allocation lock.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ReceiptPayload>,
) -> ApiResult<Json<Value>> {
    let receipt_type = payload.receipt_type.to_text();
    let value = payload.value.number();
    let client_name = payload.client_name.to_text();
    let description = payload.description.to_text();
    if receipt_type.is_none() || value.is_none() || client_name.is_none() || description.is_none()
    {
        return Err(ApiError::bad_request(
            "type, value, client name and description are required",
        ));
    }

    let now = Local::now();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();
    let created_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let guard = state.sequence_lock.lock().await;
    let receipt_number = sequence::next_identifier(
        &state.pool,
        "receipts",
        "receipt_number",
        &sequence::daily_prefix(now),
        sequence::DAILY,
    )
    .await?;

    let result = sqlx::query(
        "INSERT INTO receipts (
            receipt_number, type, value, client_name, phone, description,
            payment_method, reference_number, date, time, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&receipt_number)
    .bind(receipt_type)
    .bind(value)
    .bind(client_name)
    .bind(payload.phone.to_text())
    .bind(description)
    .bind(payload.payment_method.to_text())
    .bind(payload.reference_number.to_text())
    .bind(&date)
    .bind(&time)
    .bind(&created_at)
    .execute(&state.pool)
    .await?;
    drop(guard);

    Ok(Json(json!({
        "success": true,
        "id": result.last_insert_rowid(),
        "receipt_number": receipt_number
    })))
}

/// GET /api/receipts - with optional `q` search over client and description.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Receipt>>> {
    let rows = match query.q.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => {
            let like = format!("%{}%", q);
            sqlx::query_as::<_, Receipt>(
                "SELECT * FROM receipts
                 WHERE client_name LIKE ? OR description LIKE ?
                 ORDER BY created_at DESC",
            )
            .bind(&like)
            .bind(&like)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Receipt>("SELECT * FROM receipts ORDER BY created_at DESC")
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/receipt/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Receipt>> {
    let receipt = sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("receipt not found"))?;

    Ok(Json(receipt))
}

/// DELETE /api/receipt/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    sqlx::query("DELETE FROM receipts WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// GET /api/receipts-stats - totals per voucher type and the running balance.
/// Types are the Arabic domain values: قبض (received) and صرف (paid out).
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<ReceiptStats>> {
    let stats = sqlx::query_as::<_, ReceiptStats>(
        "SELECT
            COUNT(*) AS total_receipts,
            COALESCE(SUM(CASE WHEN type = 'قبض' THEN value ELSE 0 END), 0) AS total_receipt_amount,
            COALESCE(SUM(CASE WHEN type = 'صرف' THEN value ELSE 0 END), 0) AS total_payment_amount,
            COALESCE(SUM(CASE WHEN type = 'قبض' THEN value ELSE -value END), 0) AS balance
         FROM receipts",
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(stats))
}
