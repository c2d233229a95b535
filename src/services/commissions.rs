//! Commission derivation.
//!
//! A contract submission implies up to four commission records, one per
//! rule. Derivation is a pure function over the submitted fields: a rule
//! fires only when its name field is present (non-empty after trimming) and
//! its value field parses to a strictly positive number. Zero, negative,
//! blank and unparsable values suppress the rule rather than erroring -
//! callers rely on zero-commission contracts being valid.

use crate::uploads::FormPayload;

/// Fixed payee label for the office's own cut.
pub const OFFICE_COMMISSION_LABEL: &str = "عمولة المكتب";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionType {
    /// Broker who brought the client.
    Representative,
    /// Broker who brought the unit.
    UnitRepresentative,
    /// Clearance company fee.
    Clearance,
    /// The office's own commission.
    Office,
}

impl CommissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CommissionType::Representative => "representative_commission",
            CommissionType::UnitRepresentative => "unit_representative_commission",
            CommissionType::Clearance => "clearance_commission",
            CommissionType::Office => "office_commission",
        }
    }
}

/// Contract fields copied verbatim onto each derived record, so commission
/// reports survive later contract edits until the next regeneration.
#[derive(Debug, Clone, Default)]
pub struct ContractSnapshot {
    pub contract_number: Option<String>,
    pub unit_number: Option<String>,
    pub client_name: Option<String>,
    pub rent_value: Option<f64>,
    pub contract_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedCommission {
    pub contract_id: i64,
    pub broker_name: String,
    pub commission_type: CommissionType,
    pub commission_value: f64,
    pub contract_number: Option<String>,
    pub unit_number: Option<String>,
    pub client_name: Option<String>,
    pub rent_value: Option<f64>,
    pub contract_date: Option<String>,
}

/// Derive the full commission set for a contract submission. At most four
/// records; possibly none.
pub fn derive_commissions(
    payload: &FormPayload,
    contract_id: i64,
    snapshot: &ContractSnapshot,
) -> Vec<DerivedCommission> {
    let mut commissions = Vec::new();

    let mut push = |broker_name: String, commission_type: CommissionType, value: f64| {
        commissions.push(DerivedCommission {
            contract_id,
            broker_name,
            commission_type,
            commission_value: value,
            contract_number: snapshot.contract_number.clone(),
            unit_number: snapshot.unit_number.clone(),
            client_name: snapshot.client_name.clone(),
            rent_value: snapshot.rent_value,
            contract_date: snapshot.contract_date.clone(),
        });
    };

    // Client-side broker
    if let (Some(name), Some(value)) = (
        payload.field("brokerName").text(),
        payload.field("representativeCommission").positive(),
    ) {
        push(name.to_string(), CommissionType::Representative, value);
    }

    // Unit-side broker
    if let (Some(name), Some(value)) = (
        payload.field("brokerNameUnit").text(),
        payload.field("representativeCommissionUnit").positive(),
    ) {
        push(name.to_string(), CommissionType::UnitRepresentative, value);
    }

    // Clearance company
    if let (Some(name), Some(value)) = (
        payload.field("clearanceName").text(),
        payload.field("clearanceValue").positive(),
    ) {
        push(name.to_string(), CommissionType::Clearance, value);
    }

    // Office commission has no name guard; the payee label is fixed
    if let Some(value) = payload.field("officeCommissionInternal").positive() {
        push(
            OFFICE_COMMISSION_LABEL.to_string(),
            CommissionType::Office,
            value,
        );
    }

    commissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payload(value: Value) -> FormPayload {
        match value {
            Value::Object(map) => FormPayload::from_json(map),
            _ => unreachable!(),
        }
    }

    fn snapshot() -> ContractSnapshot {
        ContractSnapshot {
            contract_number: Some("20250101-001".into()),
            unit_number: Some("U1".into()),
            client_name: Some("Ali".into()),
            rent_value: Some(5000.0),
            contract_date: Some("2025-01-01".into()),
        }
    }

    #[test]
    fn all_four_rules_fire() {
        let derived = derive_commissions(
            &payload(json!({
                "brokerName": "B1",
                "representativeCommission": "200",
                "brokerNameUnit": "B2",
                "representativeCommissionUnit": 150,
                "clearanceName": "C1",
                "clearanceValue": "75.5",
                "officeCommissionInternal": "100"
            })),
            1,
            &snapshot(),
        );

        assert_eq!(derived.len(), 4);
        assert_eq!(derived[0].commission_type, CommissionType::Representative);
        assert_eq!(derived[0].broker_name, "B1");
        assert_eq!(derived[0].commission_value, 200.0);
        assert_eq!(derived[1].commission_type, CommissionType::UnitRepresentative);
        assert_eq!(derived[1].commission_value, 150.0);
        assert_eq!(derived[2].commission_type, CommissionType::Clearance);
        assert_eq!(derived[2].commission_value, 75.5);
        assert_eq!(derived[3].commission_type, CommissionType::Office);
        assert_eq!(derived[3].broker_name, OFFICE_COMMISSION_LABEL);
    }

    #[test]
    fn zero_value_suppresses_the_rule() {
        let derived = derive_commissions(
            &payload(json!({
                "brokerName": "B1",
                "representativeCommission": "0"
            })),
            1,
            &snapshot(),
        );
        assert!(derived.is_empty());
    }

    #[test]
    fn name_without_value_and_value_without_name_are_skipped() {
        let derived = derive_commissions(
            &payload(json!({
                "brokerName": "B1",
                "representativeCommissionUnit": "300"
            })),
            1,
            &snapshot(),
        );
        assert!(derived.is_empty());
    }

    #[test]
    fn negative_and_unparsable_values_are_skipped() {
        let derived = derive_commissions(
            &payload(json!({
                "clearanceName": "C1",
                "clearanceValue": "-10",
                "officeCommissionInternal": "lots"
            })),
            1,
            &snapshot(),
        );
        assert!(derived.is_empty());
    }

    #[test]
    fn whitespace_name_fails_the_presence_guard() {
        let derived = derive_commissions(
            &payload(json!({
                "brokerName": "   ",
                "representativeCommission": "200"
            })),
            1,
            &snapshot(),
        );
        assert!(derived.is_empty());
    }

    #[test]
    fn office_rule_needs_no_name() {
        let derived = derive_commissions(
            &payload(json!({ "officeCommissionInternal": 100 })),
            9,
            &snapshot(),
        );
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].contract_id, 9);
        assert_eq!(derived[0].broker_name, OFFICE_COMMISSION_LABEL);
        assert_eq!(derived[0].contract_number.as_deref(), Some("20250101-001"));
    }
}
