use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::broker::Broker;
use crate::error::{ApiError, ApiResult};
use crate::types::FormField;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BrokerPayload {
    #[serde(default)]
    pub name: FormField,
    #[serde(default)]
    pub phone: FormField,
    #[serde(default)]
    pub email: FormField,
    #[serde(default)]
    pub commission_rate: FormField,
    #[serde(default)]
    pub address: FormField,
    #[serde(default)]
    pub status: FormField,
    #[serde(default)]
    pub notes: FormField,
}

/// POST /api/brokers
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<BrokerPayload>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .to_text()
        .ok_or_else(|| ApiError::bad_request("broker name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let result = sqlx::query(
        "INSERT INTO brokers (name, phone, email, commission_rate, address, status, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(payload.phone.to_text().unwrap_or_default())
    .bind(payload.email.to_text().unwrap_or_default())
    .bind(payload.commission_rate.number().unwrap_or(0.0))
    .bind(payload.address.to_text().unwrap_or_default())
    .bind(payload.status.to_text().unwrap_or_else(|| "active".to_string()))
    .bind(payload.notes.to_text().unwrap_or_default())
    .bind(&now)
    .bind(&now)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "id": result.last_insert_rowid() })))
}

/// GET /api/brokers
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Broker>>> {
    let rows = sqlx::query_as::<_, Broker>("SELECT * FROM brokers ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(rows))
}

/// GET /api/brokers/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Broker>> {
    let broker = sqlx::query_as::<_, Broker>("SELECT * FROM brokers WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("broker not found"))?;

    Ok(Json(broker))
}

/// PUT /api/brokers/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BrokerPayload>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .to_text()
        .ok_or_else(|| ApiError::bad_request("broker name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    sqlx::query(
        "UPDATE brokers
         SET name = ?, phone = ?, email = ?, commission_rate = ?, address = ?, status = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(payload.phone.to_text().unwrap_or_default())
    .bind(payload.email.to_text().unwrap_or_default())
    .bind(payload.commission_rate.number().unwrap_or(0.0))
    .bind(payload.address.to_text().unwrap_or_default())
    .bind(payload.status.to_text().unwrap_or_else(|| "active".to_string()))
    .bind(payload.notes.to_text().unwrap_or_default())
    .bind(&now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/brokers/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    sqlx::query("DELETE FROM brokers WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}
