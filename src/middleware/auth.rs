use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use sqlx::FromRow;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated user context resolved from the session token.
///
/// Tokens are opaque: the bearer value is the numeric id of an active user
/// row. Anything that does not resolve to such a row is rejected with 401.
#[derive(Clone, Debug, FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Session middleware for `/api/*` routes: resolve token -> active user
/// record or reject.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), request.uri().query())
        .ok_or_else(|| ApiError::unauthorized("missing session token"))?;

    let user_id: i64 = token
        .trim()
        .parse()
        .map_err(|_| ApiError::unauthorized("invalid session token"))?;

    let user = sqlx::query_as::<_, AuthUser>(
        "SELECT id, username, full_name, role FROM users WHERE id = ? AND is_active = 1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::unauthorized("session user not found or inactive"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Token comes from the Authorization header (with or without a Bearer
/// prefix) or, for download links, a `token` query parameter.
fn extract_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let value = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
