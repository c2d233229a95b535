use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full contract row. Almost every column is nullable in the store; only the
/// id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: i64,
    pub contract_number: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub unit_number: Option<String>,
    pub rent_value: Option<f64>,
    pub installments: Option<i64>,
    pub insurance: Option<f64>,
    pub office_commission: Option<f64>,
    pub service_fees: Option<f64>,
    pub municipality_file: Option<String>,
    pub municipality_date: Option<String>,
    pub municipality_notes: Option<String>,
    pub terms: Option<String>,
    pub online_fees: Option<f64>,
    pub electricity_fees: Option<f64>,
    pub water_fees: Option<f64>,
    pub broker_name: Option<String>,
    pub broker_name_unit: Option<String>,
    pub clearance_name: Option<String>,
    pub clearance_value: Option<f64>,
    pub total_commission: Option<f64>,
    pub commission_deduction: Option<f64>,
    pub attestation_value: Option<f64>,
    pub attestation_deduction: Option<f64>,
    pub representative_commission: Option<f64>,
    pub representative_commission_unit: Option<f64>,
    pub representative_attestation: Option<f64>,
    pub office_commission_internal: Option<f64>,
    pub internal_notes: Option<String>,
    pub broker_id: Option<i64>,
    pub identity_document: Option<String>,
    pub passport_document: Option<String>,
    pub address_document: Option<String>,
    pub income_document: Option<String>,
    pub additional_documents: Option<String>,
    pub documents_notes: Option<String>,
    pub contract_date: Option<String>,
    pub created_at: Option<String>,
}

/// Compact listing row for the contracts index/search view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractSummary {
    pub id: i64,
    pub contract_number: Option<String>,
    pub client_name: Option<String>,
    pub unit_number: Option<String>,
    pub rent_value: Option<f64>,
    pub contract_date: Option<String>,
}
