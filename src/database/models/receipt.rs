use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub receipt_number: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub receipt_type: String,
    pub value: f64,
    pub client_name: String,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub created_at: String,
}

/// Income/outgo totals across all receipts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReceiptStats {
    pub total_receipts: i64,
    pub total_receipt_amount: f64,
    pub total_payment_amount: f64,
    pub balance: f64,
}
