use serde::Serialize;
use sqlx::FromRow;

/// Derived commission row. The contract fields are denormalized snapshots
/// taken at derivation time so commission reports stay stable between
/// contract edits.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrokerCommission {
    pub id: i64,
    pub contract_id: Option<i64>,
    pub broker_name: Option<String>,
    pub commission_type: Option<String>,
    pub commission_value: Option<f64>,
    pub contract_number: Option<String>,
    pub unit_number: Option<String>,
    pub client_name: Option<String>,
    pub rent_value: Option<f64>,
    pub contract_date: Option<String>,
    pub created_at: Option<String>,
}

/// Commission listing joined with live contract details. The snapshot columns
/// come from the commission row itself; the join only contributes fields that
/// are not denormalized (client phone).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrokerCommissionReport {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub commission: BrokerCommission,
    pub client_phone: Option<String>,
}

/// Per-contract commission report row for a broker, joined with the broker's
/// registry profile when the contract references one.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrokerContractReport {
    pub id: i64,
    pub contract_number: Option<String>,
    pub broker_name: Option<String>,
    pub client_name: Option<String>,
    pub unit_number: Option<String>,
    pub rent_value: Option<f64>,
    pub total_commission: Option<f64>,
    pub commission_deduction: Option<f64>,
    pub attestation_value: Option<f64>,
    pub attestation_deduction: Option<f64>,
    pub representative_commission: Option<f64>,
    pub representative_attestation: Option<f64>,
    pub office_commission_internal: Option<f64>,
    pub contract_date: Option<String>,
    pub created_at: Option<String>,
    pub broker_full_name: Option<String>,
    pub broker_phone: Option<String>,
    pub broker_email: Option<String>,
    pub broker_commission_rate: Option<f64>,
}

/// Aggregated commission statistics for one broker (or all of them).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrokerStatistics {
    pub total_contracts: i64,
    pub total_rent_value: f64,
    pub total_commission: f64,
    pub total_commission_deduction: f64,
    pub total_attestation_value: f64,
    pub total_attestation_deduction: f64,
    pub total_representative_commission: f64,
    pub total_representative_attestation: f64,
    pub total_office_commission: f64,
    pub net_commission: f64,
}

impl BrokerStatistics {
    pub fn zeroed() -> Self {
        Self {
            total_contracts: 0,
            total_rent_value: 0.0,
            total_commission: 0.0,
            total_commission_deduction: 0.0,
            total_attestation_value: 0.0,
            total_attestation_deduction: 0.0,
            total_representative_commission: 0.0,
            total_representative_attestation: 0.0,
            total_office_commission: 0.0,
            net_commission: 0.0,
        }
    }
}
