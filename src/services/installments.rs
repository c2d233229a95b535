//! Payment installment splitting.
//!
//! A payment submission carries an `installments` count and per-index fields
//! (`payment_installment_amount_1`, `payment_installment_due_date_1`, ...).
//! The splitter expands the submission into discrete payment drafts, one per
//! usable index. An index needs both an amount and a due date to survive;
//! with a single installment that makes the whole request invalid, with
//! several it silently drops the incomplete ones as long as at least one
//! survives.

use crate::error::{ApiError, ApiResult};
use crate::uploads::FormPayload;

/// One payment row to insert, before creator attribution and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentDraft {
    pub amount: f64,
    pub due_date: String,
    pub status: String,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub notes: String,
}

/// Expand a payment submission into its installment drafts.
pub fn split_installments(payload: &FormPayload) -> ApiResult<Vec<InstallmentDraft>> {
    let count = payload.field("installments").integer().unwrap_or(1).max(1);

    if count == 1 {
        let draft = draft_at(payload, 1).ok_or_else(|| {
            ApiError::bad_request("amount and due date are required for a single payment")
        })?;
        return Ok(vec![draft]);
    }

    let drafts: Vec<InstallmentDraft> = (1..=count)
        .filter_map(|index| draft_at(payload, index))
        .collect();

    if drafts.is_empty() {
        return Err(ApiError::bad_request(
            "no installment was saved; every installment needs an amount and a due date",
        ));
    }

    Ok(drafts)
}

/// Build the draft for one index, or None when its amount or due date is
/// missing. The amount must parse as a number to count as present.
fn draft_at(payload: &FormPayload, index: i64) -> Option<InstallmentDraft> {
    let amount = payload
        .field(&format!("payment_installment_amount_{}", index))
        .number()?;
    let due_date = payload
        .field(&format!("payment_installment_due_date_{}", index))
        .to_text()?;

    let status = payload
        .field(&format!("payment_installment_status_{}", index))
        .to_text()
        .unwrap_or_else(|| "pending".to_string());
    let payment_type = payload
        .field(&format!("payment_installment_type_{}", index))
        .to_text()
        .or_else(|| payload.field("payment_type").to_text());
    let payment_method = payload
        .field(&format!("payment_installment_method_{}", index))
        .to_text();
    let notes = payload
        .field(&format!("payment_installment_notes_{}", index))
        .to_text()
        .unwrap_or_default();

    Some(InstallmentDraft {
        amount,
        due_date,
        status,
        payment_type,
        payment_method,
        notes,
    })
}
