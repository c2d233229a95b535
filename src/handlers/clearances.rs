use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::clearance::Clearance;
use crate::error::{ApiError, ApiResult};
use crate::types::FormField;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClearancePayload {
    #[serde(default)]
    pub name: FormField,
    #[serde(default)]
    pub phone: FormField,
    #[serde(default)]
    pub email: FormField,
    #[serde(default)]
    pub commission_rate: FormField,
}

/// GET /api/clearances
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Clearance>>> {
    let rows = sqlx::query_as::<_, Clearance>("SELECT * FROM clearances ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(rows))
}

/// POST /api/clearances
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ClearancePayload>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .to_text()
        .ok_or_else(|| ApiError::bad_request("clearance name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let result = sqlx::query(
        "INSERT INTO clearances (name, phone, email, commission_rate, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(payload.phone.to_text().unwrap_or_default())
    .bind(payload.email.to_text().unwrap_or_default())
    .bind(payload.commission_rate.number().unwrap_or(0.0))
    .bind(&now)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "id": result.last_insert_rowid() })))
}

/// GET /api/clearances/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Clearance>> {
    let clearance = sqlx::query_as::<_, Clearance>("SELECT * FROM clearances WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("clearance not found"))?;

    Ok(Json(clearance))
}

/// PUT /api/clearances/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClearancePayload>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .to_text()
        .ok_or_else(|| ApiError::bad_request("clearance name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    sqlx::query(
        "UPDATE clearances SET name = ?, phone = ?, email = ?, commission_rate = ?, created_at = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(payload.phone.to_text().unwrap_or_default())
    .bind(payload.email.to_text().unwrap_or_default())
    .bind(payload.commission_rate.number().unwrap_or(0.0))
    .bind(&now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/clearances/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    sqlx::query("DELETE FROM clearances WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}
