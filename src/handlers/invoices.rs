use axum::extract::{Query, Request, State};
use axum::{Extension, Json};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::invoice::InvoiceListRow;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub unit_id: Option<i64>,
}

/// POST /api/invoices
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;

    let unit_id = payload.field("unit_id").integer();
    let invoice_type = payload.field("invoice_type").to_text();
    let amount = payload.field("amount").number();
    if unit_id.is_none() || invoice_type.is_none() || amount.is_none() {
        return Err(ApiError::bad_request(
            "unit id, invoice type and amount are required",
        ));
    }

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let documents = payload.manifest();

    let result = sqlx::query(
        "INSERT INTO invoices (
            unit_id, invoice_type, amount, invoice_date, due_date, status, description,
            documents, created_by, created_by_name, created_by_username, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(unit_id)
    .bind(invoice_type)
    .bind(amount)
    .bind(payload.field("invoice_date").to_text())
    .bind(payload.field("due_date").to_text())
    .bind(payload.field("status").to_text().unwrap_or_else(|| "pending".to_string()))
    .bind(payload.field("description").to_text())
    .bind(&documents)
    .bind(user.id)
    .bind(&user.full_name)
    .bind(&user.username)
    .bind(&now)
    .bind(&now)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "id": result.last_insert_rowid() })))
}

/// GET /api/invoices - optionally filtered by unit, joined with unit and
/// building names.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<Json<Vec<InvoiceListRow>>> {
    let base = "SELECT i.*, u.unit_number, b.name AS building_name
         FROM invoices i
         LEFT JOIN units u ON i.unit_id = u.id
         LEFT JOIN buildings b ON u.building_id = b.id";

    let rows = match query.unit_id {
        Some(unit_id) => {
            let sql = format!("{base} WHERE i.unit_id = ? ORDER BY i.created_at DESC");
            sqlx::query_as::<_, InvoiceListRow>(&sql)
                .bind(unit_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            let sql = format!("{base} ORDER BY i.created_at DESC");
            sqlx::query_as::<_, InvoiceListRow>(&sql)
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(rows))
}
