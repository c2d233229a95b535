use axum::extract::{Path, Query, Request, State};
use axum::{Extension, Json};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::payment::{PaymentDetails, PaymentListRow};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::services::installments::split_installments;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    pub unit_id: Option<i64>,
}

/// POST /api/payments - record one payment or a multi-installment schedule
/// against a unit. Rows are persisted sequentially, one insert per surviving
/// installment; all of them share the submission metadata and the uploaded
/// document manifest.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;

    let unit_id = payload
        .field("unit_id")
        .integer()
        .ok_or_else(|| ApiError::bad_request("unit id is required"))?;

    let drafts = split_installments(&payload)?;

    let payment_date = payload.field("payment_date").to_text();
    let documents = payload.manifest();

    let now = Local::now();
    let created_date = now.format("%Y-%m-%d").to_string();
    let created_time = now.format("%H:%M:%S").to_string();
    let created_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut saved = 0usize;
    let mut last_id = 0i64;
    for draft in &drafts {
        let result = sqlx::query(
            "INSERT INTO payments (
                unit_id, payment_type, amount, payment_date, due_date, status, description,
                payment_method, documents, created_by, created_by_name, created_by_username,
                created_date, created_time, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(unit_id)
        .bind(&draft.payment_type)
        .bind(draft.amount)
        .bind(&payment_date)
        .bind(&draft.due_date)
        .bind(&draft.status)
        .bind(&draft.notes)
        .bind(&draft.payment_method)
        .bind(&documents)
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&created_date)
        .bind(&created_time)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&state.pool)
        .await
        .map_err(|e| {
            tracing::warn!("payment insert failed after {} of {} rows: {}", saved, drafts.len(), e);
            ApiError::internal(format!("failed to save payment: {}", e))
        })?;

        saved += 1;
        last_id = result.last_insert_rowid();
    }

    tracing::info!("Saved {} payment(s) for unit {}", saved, unit_id);
    Ok(Json(json!({ "success": true, "id": last_id, "paymentsAdded": saved })))
}

/// GET /api/payments - listing with computed settlement columns, optionally
/// filtered by unit.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> ApiResult<Json<Vec<PaymentListRow>>> {
    let base = "SELECT p.*, u.unit_number, b.name AS building_name,
            CASE
              WHEN p.paid_amount >= p.amount THEN 'paid_full'
              WHEN p.paid_amount > 0 THEN 'paid_partial'
              WHEN p.due_date < date('now') THEN 'overdue'
              ELSE 'pending'
            END AS calculated_status,
            CASE
              WHEN p.paid_amount >= p.amount THEN 'دفع كلي'
              WHEN p.paid_amount > 0 THEN 'دفع جزئي'
              WHEN p.due_date < date('now') THEN 'متأخر'
              ELSE 'معلق'
            END AS status_arabic,
            (p.amount - COALESCE(p.paid_amount, 0)) AS remaining_amount,
            CASE
              WHEN p.amount > 0 THEN ROUND((COALESCE(p.paid_amount, 0) / p.amount) * 100, 2)
              ELSE 0
            END AS payment_percentage
         FROM payments p
         LEFT JOIN units u ON p.unit_id = u.id
         LEFT JOIN buildings b ON u.building_id = b.id";

    let rows = match query.unit_id {
        Some(unit_id) => {
            let sql = format!("{base} WHERE p.unit_id = ? ORDER BY p.created_at DESC");
            sqlx::query_as::<_, PaymentListRow>(&sql)
                .bind(unit_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            let sql = format!("{base} ORDER BY p.created_at DESC");
            sqlx::query_as::<_, PaymentListRow>(&sql)
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(rows))
}

/// PUT /api/payments/:id/payment-status - record a (possibly partial)
/// settlement; newly uploaded receipt documents are appended to the existing
/// manifest.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;

    let paid_amount = payload.field("paid_amount").number();
    let payment_status = payload.field("payment_status").to_text();
    if paid_amount.is_none() || payment_status.is_none() {
        return Err(ApiError::bad_request(
            "paid amount and payment status are required",
        ));
    }

    let receipt_documents = payload.manifest();
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let result = sqlx::query(
        "UPDATE payments SET
            paid_amount = ?,
            payment_status = ?,
            payment_date_actual = ?,
            receipt_documents = CASE
              WHEN ? != '' THEN CASE
                WHEN receipt_documents IS NULL OR receipt_documents = '' THEN ?
                ELSE receipt_documents || ',' || ?
              END
              ELSE receipt_documents
            END,
            updated_at = ?
         WHERE id = ?",
    )
    .bind(paid_amount)
    .bind(payment_status)
    .bind(payload.field("payment_date_actual").to_text())
    .bind(&receipt_documents)
    .bind(&receipt_documents)
    .bind(&receipt_documents)
    .bind(&now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("payment not found"));
    }

    Ok(Json(json!({ "success": true, "message": "payment status updated" })))
}

/// GET /api/payments/:id/details - single payment with settlement progress.
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let details = sqlx::query_as::<_, PaymentDetails>(
        "SELECT p.*, u.unit_number, b.name AS building_name,
            CASE
              WHEN p.paid_amount >= p.amount THEN 'paid_full'
              WHEN p.paid_amount > 0 THEN 'paid_partial'
              WHEN p.due_date < date('now') THEN 'overdue'
              ELSE 'pending'
            END AS calculated_status
         FROM payments p
         LEFT JOIN units u ON p.unit_id = u.id
         LEFT JOIN buildings b ON u.building_id = b.id
         WHERE p.id = ?",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("payment not found"))?;

    let amount = details.payment.amount.unwrap_or(0.0);
    let paid = details.payment.paid_amount.unwrap_or(0.0);
    let percentage = if amount > 0.0 {
        ((paid / amount) * 10000.0).round() / 100.0
    } else {
        0.0
    };

    let mut body = serde_json::to_value(&details)
        .map_err(|e| ApiError::internal(format!("failed to serialize payment: {}", e)))?;
    if let Value::Object(map) = &mut body {
        map.insert("payment_percentage".into(), json!(percentage));
        map.insert("remaining_amount".into(), json!(amount - paid));
    }

    Ok(Json(body))
}
