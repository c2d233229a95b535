use serde::Serialize;
use sqlx::FromRow;

/// User profile as returned by the API. The stored password is never
/// serialized out.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// User row with the GROUP_CONCAT of granted permission names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserWithPermissions {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    #[serde(skip)]
    pub permissions: Option<String>,
}

impl UserWithPermissions {
    pub fn permission_list(&self) -> Vec<String> {
        self.permissions
            .as_deref()
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    }
}
