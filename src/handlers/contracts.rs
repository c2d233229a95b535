use axum::extract::{Path, Query, Request, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::contract::{Contract, ContractSummary};
use crate::error::{ApiError, ApiResult};
use crate::services::contracts::ContractCoordinator;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// POST /api/contract - create a contract and its derived commission set.
/// Accepts JSON or multipart (with document attachments).
pub async fn create(State(state): State<AppState>, request: Request) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;
    let created = ContractCoordinator::new(&state).create(&payload).await?;

    Ok(Json(json!({
        "success": true,
        "id": created.id,
        "contract_number": created.contract_number,
        "created_at": created.created_at,
        "commissionsSaved": created.commissions_saved
    })))
}

/// GET /api/contracts - listing with optional `q` search over number,
/// client and unit.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ContractSummary>>> {
    let rows = match query.q.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => {
            let like = format!("%{}%", q);
            sqlx::query_as::<_, ContractSummary>(
                "SELECT id, contract_number, client_name, unit_number, rent_value, contract_date
                 FROM contracts
                 WHERE contract_number LIKE ? OR client_name LIKE ? OR unit_number LIKE ?
                 ORDER BY id DESC",
            )
            .bind(&like)
            .bind(&like)
            .bind(&like)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ContractSummary>(
                "SELECT id, contract_number, client_name, unit_number, rent_value, contract_date
                 FROM contracts ORDER BY id DESC",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/contract/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Contract>> {
    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("contract not found"))?;

    Ok(Json(contract))
}

/// PUT /api/contract/:id - update in place, then regenerate the commission
/// set from the new fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let payload = uploads::read_payload(&state, request).await?;
    let commissions_saved = ContractCoordinator::new(&state).update(id, &payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "contract updated successfully",
        "commissionsSaved": commissions_saved
    })))
}

/// DELETE /api/contract/:id - commissions are removed first; the store does
/// not cascade this relation.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    ContractCoordinator::new(&state).delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
