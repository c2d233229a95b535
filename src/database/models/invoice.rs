use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub unit_id: Option<i64>,
    pub invoice_type: Option<String>,
    pub amount: Option<f64>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub documents: Option<String>,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_by_username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub unit_number: Option<String>,
    pub building_name: Option<String>,
}
