use axum::extract::{Path, Query, Request, State};
use axum::{Extension, Json};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::building::{Building, BuildingListRow};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BuildingQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// GET /api/buildings - optionally filtered to one creator.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BuildingQuery>,
) -> ApiResult<Json<Vec<BuildingListRow>>> {
    let base = "SELECT b.*, u.full_name AS creator_name, u.username AS creator_username
         FROM buildings b
         LEFT JOIN users u ON b.created_by = u.id";

    let rows = match query.user_id {
        Some(user_id) => {
            let sql = format!("{base} WHERE b.created_by = ? ORDER BY b.created_at DESC");
            sqlx::query_as::<_, BuildingListRow>(&sql)
                .bind(user_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            let sql = format!("{base} ORDER BY b.created_at DESC");
            sqlx::query_as::<_, BuildingListRow>(&sql)
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(rows))
}

/// POST /api/buildings
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;

    let name = payload
        .field("name")
        .to_text()
        .ok_or_else(|| ApiError::bad_request("building name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let documents = payload.manifest();

    let result = sqlx::query(
        "INSERT INTO buildings (
            name, address, description, total_floors, total_units, documents,
            created_by, created_by_name, created_by_username, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(payload.field("address").to_text())
    .bind(payload.field("description").to_text())
    .bind(payload.field("total_floors").integer())
    .bind(payload.field("total_units").integer())
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

/// GET /api/buildings/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Building>> {
    let building = sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("building not found"))?;

    Ok(Json(building))
}

/// PUT /api/buildings/:id - creator or admin only.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    request: Request,
) -> ApiResult<Json<Value>> {
    super::ensure_owner_or_admin(&state.pool, "buildings", id, &user).await?;

    let payload = uploads::read_payload(&state, request).await?;
    let name = payload
        .field("name")
        .to_text()
        .ok_or_else(|| ApiError::bad_request("building name is required"))?;

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        "UPDATE buildings
         SET name = ?, address = ?, description = ?, total_floors = ?, total_units = ?,
             documents = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(payload.field("address").to_text())
    .bind(payload.field("description").to_text())
    .bind(payload.field("total_floors").integer())
    .bind(payload.field("total_units").integer())
    .bind(payload.manifest())
    .bind(&now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/buildings/:id - creator or admin only.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    super::ensure_owner_or_admin(&state.pool, "buildings", id, &user).await?;

    sqlx::query("DELETE FROM buildings WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}
