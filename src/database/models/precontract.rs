use serde::Serialize;
use sqlx::FromRow;

/// Draft contract with its own month-year serial numbering. Lives and dies
/// independently; no derived records.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PreContract {
    pub id: i64,
    pub contract_number: Option<String>,
    pub client_name: Option<String>,
    pub unit_number: Option<String>,
    pub rent_value: Option<f64>,
    pub payments: Option<String>,
    pub insurance: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub office_commission: Option<f64>,
    pub admin_expenses: Option<f64>,
    pub online_value: Option<f64>,
    pub sanitation: Option<f64>,
    pub extra_electricity: Option<f64>,
    pub details: Option<String>,
    pub created_at: Option<String>,
}
