use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub unit_id: Option<i64>,
    pub payment_type: Option<String>,
    pub amount: Option<f64>,
    pub payment_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub documents: Option<String>,
    pub paid_amount: Option<f64>,
    pub payment_status: Option<String>,
    pub payment_date_actual: Option<String>,
    pub receipt_documents: Option<String>,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_by_username: Option<String>,
    pub created_date: Option<String>,
    pub created_time: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Payment listing row with computed settlement columns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub unit_number: Option<String>,
    pub building_name: Option<String>,
    pub calculated_status: String,
    pub status_arabic: String,
    pub remaining_amount: Option<f64>,
    pub payment_percentage: Option<f64>,
}

/// Detail view with the settlement progress for a single payment.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub unit_number: Option<String>,
    pub building_name: Option<String>,
    pub calculated_status: String,
}
