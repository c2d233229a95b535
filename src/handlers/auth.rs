use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::Row;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - validate credentials against the active users and
/// return the profile plus its granted permissions. The returned user id
/// doubles as the session token for subsequent requests.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::bad_request("username and password are required"));
    };

    let row = sqlx::query("SELECT * FROM users WHERE username = ? AND is_active = 1")
        .bind(&username)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid username or password"))?;

    let stored_password: String = row
        .try_get("password")
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if stored_password != password {
        return Err(ApiError::unauthorized("invalid username or password"));
    }

    let user_id: i64 = row
        .try_get("id")
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let permissions: Vec<String> = sqlx::query_as::<_, (String,)>(
        "SELECT permission_name FROM user_permissions WHERE user_id = ? AND is_granted = 1",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|(name,)| name)
    .collect();

    tracing::info!("User {} logged in", username);

    Ok(Json(json!({
        "success": true,
        "user": {
            "id": user_id,
            "username": row.try_get::<String, _>("username").unwrap_or_default(),
            "full_name": row.try_get::<String, _>("full_name").unwrap_or_default(),
            "email": row.try_get::<Option<String>, _>("email").unwrap_or_default(),
            "role": row.try_get::<Option<String>, _>("role").unwrap_or_default(),
            "permissions": permissions
        }
    })))
}
