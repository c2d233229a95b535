use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Unit {
    pub id: i64,
    pub building_id: Option<i64>,
    pub unit_number: Option<String>,
    pub unit_type: Option<String>,
    pub floor_number: Option<i64>,
    pub area: Option<f64>,
    pub rooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub documents: Option<String>,
    pub rent_value: Option<f64>,
    pub tenant_name: Option<String>,
    pub tenant_phone: Option<String>,
    pub tenant_email: Option<String>,
    pub electricity_account: Option<String>,
    pub water_account: Option<String>,
    pub contract_start_date: Option<String>,
    pub contract_end_date: Option<String>,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_by_username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnitListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub unit: Unit,
    pub building_name: Option<String>,
}
