use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub total_floors: Option<i64>,
    pub total_units: Option<i64>,
    pub documents: Option<String>,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_by_username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing row joined with the creator's profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BuildingListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub building: Building,
    pub creator_name: Option<String>,
    pub creator_username: Option<String>,
}
