use axum::extract::{Path, Query, Request, State};
use axum::{Extension, Json};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::unit::UnitListRow;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UnitQuery {
    pub building_id: Option<i64>,
    #[serde(rename = "buildingId")]
    pub building_id_camel: Option<i64>,
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// GET /api/units - filtered by building or creator when asked.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UnitQuery>,
) -> ApiResult<Json<Vec<UnitListRow>>> {
    let base = "SELECT u.*, b.name AS building_name
         FROM units u
         LEFT JOIN buildings b ON u.building_id = b.id";

    let building_id = query.building_id.or(query.building_id_camel);
    let rows = if let Some(building_id) = building_id {
        let sql = format!("{base} WHERE u.building_id = ? ORDER BY u.created_at DESC");
        sqlx::query_as::<_, UnitListRow>(&sql)
            .bind(building_id)
            .fetch_all(&state.pool)
            .await?
    } else if let Some(user_id) = query.user_id {
        let sql = format!("{base} WHERE u.created_by = ? ORDER BY u.created_at DESC");
        sqlx::query_as::<_, UnitListRow>(&sql)
            .bind(user_id)
            .fetch_all(&state.pool)
            .await?
    } else {
        let sql = format!("{base} ORDER BY u.created_at DESC");
        sqlx::query_as::<_, UnitListRow>(&sql)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(Json(rows))
}

/// POST /api/units
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;
    validate_required(&payload)?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let documents = payload.manifest();

    let result = sqlx::query(
        "INSERT INTO units (
            building_id, unit_number, unit_type, floor_number, area, rooms, bathrooms,
            price, status, description, documents,
            rent_value, tenant_name, tenant_phone, tenant_email,
            electricity_account, water_account, contract_start_date, contract_end_date,
            created_by, created_by_name, created_by_username, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payload.field("building_id").integer())
    .bind(payload.field("unit_number").to_text())
    .bind(payload.field("unit_type").to_text())
    .bind(payload.field("floor_number").integer())
    .bind(payload.field("area").number())
    .bind(payload.field("rooms").integer())
    .bind(payload.field("bathrooms").integer())
    .bind(payload.field("price").number())
    .bind(payload.field("status").to_text().unwrap_or_else(|| "available".to_string()))
    .bind(payload.field("description").to_text())
    .bind(&documents)
    .bind(payload.field("rent_value").number())
    .bind(payload.field("tenant_name").to_text())
    .bind(payload.field("tenant_phone").to_text())
    .bind(payload.field("tenant_email").to_text())
    .bind(payload.field("electricity_account").to_text())
    .bind(payload.field("water_account").to_text())
    .bind(payload.field("contract_start_date").to_text())
    .bind(payload.field("contract_end_date").to_text())
    .bind(user.id)
    .bind(&user.full_name)
    .bind(&user.username)
    .bind(&now)
    .bind(&now)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "id": result.last_insert_rowid() })))
}

/// GET /api/units/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UnitListRow>> {
    let unit = sqlx::query_as::<_, UnitListRow>(
        "SELECT u.*, b.name AS building_name
         FROM units u
         LEFT JOIN buildings b ON u.building_id = b.id
         WHERE u.id = ?",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("unit not found"))?;

    Ok(Json(unit))
}

/// PUT /api/units/:id - creator or admin only.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    request: Request,
) -> ApiResult<Json<Value>> {
    super::ensure_owner_or_admin(&state.pool, "units", id, &user).await?;

    let payload = uploads::read_payload(&state, request).await?;
    validate_required(&payload)?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        "UPDATE units SET
            building_id = ?, unit_number = ?, unit_type = ?, floor_number = ?, area = ?,
            rooms = ?, bathrooms = ?, price = ?, status = ?, description = ?,
            rent_value = ?, tenant_name = ?, tenant_phone = ?, tenant_email = ?,
            electricity_account = ?, water_account = ?,
            contract_start_date = ?, contract_end_date = ?, documents = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(payload.field("building_id").integer())
    .bind(payload.field("unit_number").to_text())
    .bind(payload.field("unit_type").to_text())
    .bind(payload.field("floor_number").integer())
    .bind(payload.field("area").number())
    .bind(payload.field("rooms").integer())
    .bind(payload.field("bathrooms").integer())
    .bind(payload.field("price").number())
    .bind(payload.field("status").to_text().unwrap_or_else(|| "available".to_string()))
    .bind(payload.field("description").to_text())
    .bind(payload.field("rent_value").number())
    .bind(payload.field("tenant_name").to_text())
    .bind(payload.field("tenant_phone").to_text())
    .bind(payload.field("tenant_email").to_text())
    .bind(payload.field("electricity_account").to_text())
    .bind(payload.field("water_account").to_text())
    .bind(payload.field("contract_start_date").to_text())
    .bind(payload.field("contract_end_date").to_text())
    .bind(payload.manifest())
    .bind(&now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/units/:id - creator or admin only.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    super::ensure_owner_or_admin(&state.pool, "units", id, &user).await?;

    sqlx::query("DELETE FROM units WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

fn validate_required(payload: &uploads::FormPayload) -> ApiResult<()> {
    if payload.field("building_id").integer().is_none()
        || !payload.field("unit_number").is_present()
        || !payload.field("unit_type").is_present()
    {
        return Err(ApiError::bad_request(
            "building id, unit number and unit type are required",
        ));
    }
    Ok(())
}
