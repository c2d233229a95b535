use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::user::UserWithPermissions;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Grantable permission names.
pub const AVAILABLE_PERMISSIONS: &[&str] = &[
    "add_contract",
    "view_contracts",
    "receipts",
    "broker_commissions",
    "company_work",
    "user_management",
];

/// Stored columns minus the password, which never leaves the store.
const USER_COLUMNS: &str =
    "u.id, u.username, u.full_name, u.email, u.phone, u.role, u.is_active, u.created_at, u.updated_at";

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<i64>,
    pub permissions: Option<Vec<String>>,
}

/// POST /api/users - create a user and grant its permission set.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(username), Some(password), Some(full_name)) =
        (payload.username, payload.password, payload.full_name)
    else {
        return Err(ApiError::bad_request(
            "username, password and full name are required",
        ));
    };

    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let result = sqlx::query(
        "INSERT INTO users (username, password, full_name, email, phone, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&username)
    .bind(&password)
    .bind(&full_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.role.as_deref().unwrap_or("user"))
    .bind(&now)
    .bind(&now)
    .execute(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::bad_request("username already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    let user_id = result.last_insert_rowid();
    if let Some(permissions) = payload.permissions {
        grant_permissions(&state, user_id, &permissions, &now).await?;
    }

    Ok(Json(json!({ "success": true, "id": user_id })))
}

/// GET /api/users - every user with its granted permission names.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let sql = format!(
        "SELECT {USER_COLUMNS}, GROUP_CONCAT(up.permission_name) AS permissions
         FROM users u
         LEFT JOIN user_permissions up ON u.id = up.user_id AND up.is_granted = 1
         GROUP BY u.id
         ORDER BY u.created_at DESC"
    );
    let rows = sqlx::query_as::<_, UserWithPermissions>(&sql)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(rows.iter().map(user_json).collect()))
}

/// GET /api/users/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let sql = format!(
        "SELECT {USER_COLUMNS}, GROUP_CONCAT(up.permission_name) AS permissions
         FROM users u
         LEFT JOIN user_permissions up ON u.id = up.user_id AND up.is_granted = 1
         WHERE u.id = ?
         GROUP BY u.id"
    );
    let row = sqlx::query_as::<_, UserWithPermissions>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(user_json(&row)))
}

/// PUT /api/users/:id - partial profile update; a submitted permission list
/// replaces the stored one wholesale (delete then reinsert).
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<Value>> {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE users SET ");
    let mut updates = builder.separated(", ");

    if let Some(username) = &payload.username {
        updates.push("username = ");
        updates.push_bind_unseparated(username);
    }
    if let Some(full_name) = &payload.full_name {
        updates.push("full_name = ");
        updates.push_bind_unseparated(full_name);
    }
    if let Some(email) = &payload.email {
        updates.push("email = ");
        updates.push_bind_unseparated(email);
    }
    if let Some(phone) = &payload.phone {
        updates.push("phone = ");
        updates.push_bind_unseparated(phone);
    }
    if let Some(role) = &payload.role {
        updates.push("role = ");
        updates.push_bind_unseparated(role);
    }
    if let Some(is_active) = payload.is_active {
        updates.push("is_active = ");
        updates.push_bind_unseparated(is_active);
    }
    updates.push("updated_at = ");
    updates.push_bind_unseparated(&now);

    builder.push(" WHERE id = ").push_bind(id);
    let result = builder.build().execute(&state.pool).await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("user not found"));
    }

    if let Some(permissions) = payload.permissions {
        sqlx::query("DELETE FROM user_permissions WHERE user_id = ?")
            .bind(id)
            .execute(&state.pool)
            .await?;
        grant_permissions(&state, id, &permissions, &now).await?;
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/users/:id - the permissions table cascades on user deletion.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// GET /api/permissions - the static catalogue of grantable permissions.
pub async fn permissions() -> Json<Vec<&'static str>> {
    Json(AVAILABLE_PERMISSIONS.to_vec())
}

async fn grant_permissions(
    state: &AppState,
    user_id: i64,
    permissions: &[String],
    now: &str,
) -> ApiResult<()> {
    // Dedup while keeping a stable order
    let unique: BTreeSet<&str> = permissions.iter().map(String::as_str).collect();
    for permission in unique {
        sqlx::query(
            "INSERT INTO user_permissions (user_id, permission_name, is_granted, created_at)
             VALUES (?, ?, 1, ?)",
        )
        .bind(user_id)
        .bind(permission)
        .bind(now)
        .execute(&state.pool)
        .await?;
    }
    Ok(())
}

fn user_json(row: &UserWithPermissions) -> Value {
    let mut value = serde_json::to_value(row).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.insert("permissions".into(), json!(row.permission_list()));
    }
    value
}
