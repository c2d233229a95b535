//! Contract write coordination.
//!
//! A contract's commission rows are fully derived data: after every create or
//! update, the stored set for a contract must equal exactly what
//! [`derive_commissions`] produces from the contract's current fields. Updates
//! therefore delete the old set and reinsert the fresh one.
//!
//! The store offers no multi-statement transaction here, so a crash between
//! the delete and the reinsert leaves the contract with zero commissions
//! until the next successful update. Callers that aggregate commission
//! totals for accounting need to be aware of that window. Likewise, a
//! failure partway through inserting the new set surfaces as an error while
//! the rows inserted before it remain.

use std::sync::Arc;

use chrono::Local;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::commissions::{derive_commissions, ContractSnapshot, DerivedCommission};
use crate::services::sequence;
use crate::uploads::FormPayload;
use crate::AppState;

pub struct ContractCoordinator {
    pool: SqlitePool,
    sequence_lock: Arc<Mutex<()>>,
}

#[derive(Debug)]
pub struct ContractCreated {
    pub id: i64,
    pub contract_number: String,
    pub created_at: String,
    pub commissions_saved: usize,
}

impl ContractCoordinator {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            sequence_lock: state.sequence_lock.clone(),
        }
    }

    /// Create a contract: allocate its daily sequence number, insert the row,
    /// then derive and insert its commission set.
    pub async fn create(&self, payload: &FormPayload) -> ApiResult<ContractCreated> {
        validate_required(payload)?;

        let now = Local::now();
        let contract_date = now.format("%Y-%m-%d").to_string();
        let created_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

        // Hold the allocation lock across read-then-insert so two concurrent
        // submissions cannot mint the same number.
        let guard = self.sequence_lock.lock().await;
        let contract_number = sequence::next_identifier(
            &self.pool,
            "contracts",
            "contract_number",
            &sequence::daily_prefix(now),
            sequence::DAILY,
        )
        .await?;

        let result = sqlx::query(
            "INSERT INTO contracts (
                contract_number, client_name, client_phone, client_email, unit_number,
                rent_value, installments, insurance, office_commission, service_fees,
                municipality_file, municipality_date, municipality_notes, terms,
                online_fees, electricity_fees, water_fees,
                broker_name, broker_name_unit, clearance_name, clearance_value,
                total_commission, commission_deduction, attestation_value, attestation_deduction,
                representative_commission, representative_commission_unit, representative_attestation,
                office_commission_internal, internal_notes, broker_id,
                identity_document, passport_document, address_document, income_document,
                additional_documents, documents_notes, contract_date, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contract_number)
        .bind(payload.field("clientName").to_text())
        .bind(payload.field("clientPhone").to_text())
        .bind(payload.field("clientEmail").to_text())
        .bind(payload.field("unitNumber").to_text())
        .bind(payload.field("rentValue").number())
        .bind(payload.field("installments").integer())
        .bind(payload.field("insurance").number())
        .bind(payload.field("officeCommission").number())
        .bind(payload.field("serviceFees").number())
        .bind(payload.field("municipalityFile").to_text())
        .bind(payload.field("municipalityDate").to_text())
        .bind(payload.field("municipalityNotes").to_text())
        .bind(payload.field("terms").to_text())
        .bind(payload.field("onlineFees").number())
        .bind(payload.field("electricityFees").number())
        .bind(payload.field("waterFees").number())
        .bind(payload.field("brokerName").to_text())
        .bind(payload.field("brokerNameUnit").to_text())
        .bind(payload.field("clearanceName").to_text())
        .bind(payload.field("clearanceValue").number())
        .bind(payload.field("totalCommission").number())
        .bind(payload.field("commissionDeduction").number())
        .bind(payload.field("attestationValueInternal").number())
        .bind(payload.field("attestationDeduction").number())
        .bind(payload.field("representativeCommission").number())
        .bind(payload.field("representativeCommissionUnit").number())
        .bind(payload.field("representativeAttestation").number())
        .bind(payload.field("officeCommissionInternal").number())
        .bind(payload.field("internalNotes").to_text())
        .bind(Option::<i64>::None)
        .bind(payload.document("identityDocument"))
        .bind(payload.document("passportDocument"))
        .bind(payload.document("addressDocument"))
        .bind(payload.document("incomeDocument"))
        .bind(payload.documents_for("additionalDocuments"))
        .bind(payload.field("documentsNotes").to_text())
        .bind(&contract_date)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        drop(guard);

        let contract_id = result.last_insert_rowid();
        info!("Contract {} saved with id {}", contract_number, contract_id);

        let snapshot = ContractSnapshot {
            contract_number: Some(contract_number.clone()),
            unit_number: payload.field("unitNumber").to_text(),
            client_name: payload.field("clientName").to_text(),
            rent_value: payload.field("rentValue").number(),
            contract_date: Some(contract_date),
        };
        let commissions = derive_commissions(payload, contract_id, &snapshot);
        let commissions_saved = self.insert_commissions(&commissions, &created_at).await?;

        Ok(ContractCreated {
            id: contract_id,
            contract_number,
            created_at,
            commissions_saved,
        })
    }

    /// Update a contract in place and atomically replace its commission set:
    /// delete every existing row for the contract, then reinsert the
    /// derivation of the new fields. Returns the number of commissions saved.
    pub async fn update(&self, id: i64, payload: &FormPayload) -> ApiResult<usize> {
        validate_required(payload)?;

        let result = sqlx::query(
            "UPDATE contracts SET
                client_name = ?, client_phone = ?, client_email = ?, unit_number = ?,
                rent_value = ?, installments = ?, insurance = ?, office_commission = ?, service_fees = ?,
                municipality_file = ?, municipality_date = ?, municipality_notes = ?, terms = ?,
                online_fees = ?, electricity_fees = ?, water_fees = ?,
                broker_name = ?, broker_name_unit = ?, clearance_name = ?, clearance_value = ?,
                total_commission = ?, commission_deduction = ?, attestation_value = ?, attestation_deduction = ?,
                representative_commission = ?, representative_commission_unit = ?, representative_attestation = ?,
                office_commission_internal = ?, internal_notes = ?
             WHERE id = ?",
        )
        .bind(payload.field("clientName").to_text())
        .bind(payload.field("clientPhone").to_text())
        .bind(payload.field("clientEmail").to_text())
        .bind(payload.field("unitNumber").to_text())
        .bind(payload.field("rentValue").number())
        .bind(payload.field("installments").integer())
        .bind(payload.field("insurance").number())
        .bind(payload.field("officeCommission").number())
        .bind(payload.field("serviceFees").number())
        .bind(payload.field("municipalityFile").to_text())
        .bind(payload.field("municipalityDate").to_text())
        .bind(payload.field("municipalityNotes").to_text())
        .bind(payload.field("terms").to_text())
        .bind(payload.field("onlineFees").number())
        .bind(payload.field("electricityFees").number())
        .bind(payload.field("waterFees").number())
        .bind(payload.field("brokerName").to_text())
        .bind(payload.field("brokerNameUnit").to_text())
        .bind(payload.field("clearanceName").to_text())
        .bind(payload.field("clearanceValue").number())
        .bind(payload.field("totalCommission").number())
        .bind(payload.field("commissionDeduction").number())
        .bind(payload.field("attestationValueInternal").number())
        .bind(payload.field("attestationDeduction").number())
        .bind(payload.field("representativeCommission").number())
        .bind(payload.field("representativeCommissionUnit").number())
        .bind(payload.field("representativeAttestation").number())
        .bind(payload.field("officeCommissionInternal").number())
        .bind(payload.field("internalNotes").to_text())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("contract not found"));
        }

        // Snapshot fields the client does not submit come from the stored row
        let (contract_number, contract_date): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT contract_number, contract_date FROM contracts WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        sqlx::query("DELETE FROM broker_commissions WHERE contract_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let snapshot = ContractSnapshot {
            contract_number,
            unit_number: payload.field("unitNumber").to_text(),
            client_name: payload.field("clientName").to_text(),
            rent_value: payload.field("rentValue").number(),
            contract_date,
        };
        let commissions = derive_commissions(payload, id, &snapshot);
        let created_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let commissions_saved = self.insert_commissions(&commissions, &created_at).await?;

        info!("Contract {} updated, {} commissions regenerated", id, commissions_saved);
        Ok(commissions_saved)
    }

    /// Delete a contract. Commissions go first: the store's foreign key does
    /// not cascade this relation, so orphan prevention lives here.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        sqlx::query("DELETE FROM broker_commissions WHERE contract_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM contracts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Contract {} deleted", id);
        Ok(())
    }

    /// Best-effort sequential insert: rows committed before a failure stay.
    async fn insert_commissions(
        &self,
        commissions: &[DerivedCommission],
        created_at: &str,
    ) -> ApiResult<usize> {
        let mut saved = 0usize;
        for commission in commissions {
            let result = sqlx::query(
                "INSERT INTO broker_commissions (
                    contract_id, broker_name, commission_type, commission_value,
                    contract_number, unit_number, client_name, rent_value, contract_date, created_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(commission.contract_id)
            .bind(&commission.broker_name)
            .bind(commission.commission_type.as_str())
            .bind(commission.commission_value)
            .bind(&commission.contract_number)
            .bind(&commission.unit_number)
            .bind(&commission.client_name)
            .bind(commission.rent_value)
            .bind(&commission.contract_date)
            .bind(created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => saved += 1,
                Err(e) => {
                    warn!(
                        "commission insert failed after {} of {} rows: {}",
                        saved,
                        commissions.len(),
                        e
                    );
                    return Err(ApiError::internal(format!(
                        "failed to save broker commission: {}",
                        e
                    )));
                }
            }
        }
        Ok(saved)
    }
}

fn validate_required(payload: &FormPayload) -> ApiResult<()> {
    if !payload.field("clientName").is_present()
        || !payload.field("unitNumber").is_present()
        || !payload.field("rentValue").is_present()
    {
        return Err(ApiError::bad_request(
            "client name, unit number and rent value are required",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::manager;
    use serde_json::json;

    async fn coordinator() -> (ContractCoordinator, SqlitePool) {
        let pool = manager::connect_in_memory().await.unwrap();
        manager::migrate(&pool).await.unwrap();
        let state = AppState::new(pool.clone(), std::env::temp_dir());
        (ContractCoordinator::new(&state), pool)
    }

    fn payload(value: serde_json::Value) -> FormPayload {
        match value {
            serde_json::Value::Object(map) => FormPayload::from_json(map),
            _ => unreachable!(),
        }
    }

    async fn commission_types(pool: &SqlitePool, contract_id: i64) -> Vec<String> {
        sqlx::query_as::<_, (String,)>(
            "SELECT commission_type FROM broker_commissions WHERE contract_id = ? ORDER BY id",
        )
        .bind(contract_id)
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|(t,)| t)
        .collect()
    }

    #[tokio::test]
    async fn create_rejects_missing_required_fields() {
        let (coordinator, _pool) = coordinator().await;
        let err = coordinator
            .create(&payload(json!({ "clientName": "Ali" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_derives_commissions_with_snapshot() {
        let (coordinator, pool) = coordinator().await;
        let created = coordinator
            .create(&payload(json!({
                "clientName": "Ali",
                "unitNumber": "U1",
                "rentValue": 5000,
                "brokerName": "B1",
                "representativeCommission": "200",
                "officeCommissionInternal": "100"
            })))
            .await
            .unwrap();

        assert_eq!(created.commissions_saved, 2);
        assert_eq!(
            commission_types(&pool, created.id).await,
            vec!["representative_commission", "office_commission"]
        );

        let (number, client): (Option<String>, Option<String>) = sqlx::query_as(
            "SELECT contract_number, client_name FROM broker_commissions WHERE contract_id = ? LIMIT 1",
        )
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(number.as_deref(), Some(created.contract_number.as_str()));
        assert_eq!(client.as_deref(), Some("Ali"));
    }

    #[tokio::test]
    async fn update_replaces_the_commission_set() {
        let (coordinator, pool) = coordinator().await;
        let created = coordinator
            .create(&payload(json!({
                "clientName": "Ali",
                "unitNumber": "U1",
                "rentValue": 5000,
                "brokerName": "B1",
                "representativeCommission": "200",
                "officeCommissionInternal": "100"
            })))
            .await
            .unwrap();

        // Broker removed: only the office commission must survive
        let saved = coordinator
            .update(
                created.id,
                &payload(json!({
                    "clientName": "Ali",
                    "unitNumber": "U1",
                    "rentValue": 5000,
                    "officeCommissionInternal": "100"
                })),
            )
            .await
            .unwrap();

        assert_eq!(saved, 1);
        assert_eq!(
            commission_types(&pool, created.id).await,
            vec!["office_commission"]
        );
    }

    #[tokio::test]
    async fn repeated_update_with_same_fields_is_idempotent() {
        let (coordinator, pool) = coordinator().await;
        let created = coordinator
            .create(&payload(json!({
                "clientName": "Ali",
                "unitNumber": "U1",
                "rentValue": 5000,
                "brokerName": "B1",
                "representativeCommission": "200"
            })))
            .await
            .unwrap();

        let update = json!({
            "clientName": "Ali",
            "unitNumber": "U1",
            "rentValue": 5000,
            "brokerName": "B1",
            "representativeCommission": "200"
        });
        coordinator.update(created.id, &payload(update.clone())).await.unwrap();
        coordinator.update(created.id, &payload(update)).await.unwrap();

        let rows: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM broker_commissions WHERE contract_id = ?")
                .bind(created.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows.0, 1);
    }

    #[tokio::test]
    async fn update_of_missing_contract_is_not_found() {
        let (coordinator, _pool) = coordinator().await;
        let err = coordinator
            .update(
                999,
                &payload(json!({
                    "clientName": "Ali",
                    "unitNumber": "U1",
                    "rentValue": 5000
                })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_commissions() {
        let (coordinator, pool) = coordinator().await;
        let created = coordinator
            .create(&payload(json!({
                "clientName": "Ali",
                "unitNumber": "U1",
                "rentValue": 5000,
                "officeCommissionInternal": "100"
            })))
            .await
            .unwrap();

        coordinator.delete(created.id).await.unwrap();

        let commissions: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM broker_commissions WHERE contract_id = ?")
                .bind(created.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(commissions.0, 0);

        let contracts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contracts WHERE id = ?")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(contracts.0, 0);
    }

    #[tokio::test]
    async fn sequence_numbers_are_contiguous() {
        let (coordinator, _pool) = coordinator().await;
        let mut numbers = Vec::new();
        for _ in 0..3 {
            let created = coordinator
                .create(&payload(json!({
                    "clientName": "Ali",
                    "unitNumber": "U1",
                    "rentValue": 5000
                })))
                .await
                .unwrap();
            numbers.push(created.contract_number);
        }

        let suffixes: Vec<u32> = numbers
            .iter()
            .map(|n| n.split('-').nth(1).unwrap().parse().unwrap())
            .collect();
        assert_eq!(suffixes, vec![1, 2, 3]);
    }
}
