use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::models::precontract::PreContract;
use crate::error::{ApiError, ApiResult};
use crate::services::sequence;
use crate::types::FormField;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PreContractPayload {
    #[serde(default)]
    pub client_name: FormField,
    #[serde(default)]
    pub unit_number: FormField,
    #[serde(default)]
    pub rent_value: FormField,
    #[serde(default)]
    pub payments: FormField,
    #[serde(default)]
    pub insurance: FormField,
    #[serde(default)]
    pub phone: FormField,
    #[serde(default)]
    pub email: FormField,
    #[serde(default)]
    pub office_commission: FormField,
    #[serde(default)]
    pub admin_expenses: FormField,
    #[serde(default)]
    pub online_value: FormField,
    #[serde(default)]
    pub sanitation: FormField,
    #[serde(default)]
    pub extra_electricity: FormField,
    #[serde(default)]
    pub details: FormField,
}

/// Columns the PATCH endpoint may touch, with their value shape.
const TEXT_COLUMNS: &[&str] = &["client_name", "unit_number", "payments", "phone", "email", "details"];
const REAL_COLUMNS: &[&str] = &[
    "rent_value",
    "insurance",
    "office_commission",
    "admin_expenses",
    "online_value",
    "sanitation",
    "extra_electricity",
];

/// POST /api/precontract - draft contract with month-year serial numbering
/// (`MM-YY-NNNNN`).
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PreContractPayload>,
) -> ApiResult<Json<Value>> {
    let now = Local::now();
    let created_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let guard = state.sequence_lock.lock().await;
    let contract_number = sequence::next_identifier(
        &state.pool,
        "precontracts",
        "contract_number",
        &sequence::monthly_prefix(now),
        sequence::MONTHLY,
    )
    .await?;

    let result = sqlx::query(
        "INSERT INTO precontracts (
            contract_number, client_name, unit_number, rent_value, payments, insurance,
            phone, email, office_commission, admin_expenses, online_value, sanitation,
            extra_electricity, details, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&contract_number)
    .bind(payload.client_name.to_text())
    .bind(payload.unit_number.to_text())
    .bind(payload.rent_value.number())
    .bind(payload.payments.to_text())
    .bind(payload.insurance.number())
    .bind(payload.phone.to_text())
    .bind(payload.email.to_text())
    .bind(payload.office_commission.number())
    .bind(payload.admin_expenses.number())
    .bind(payload.online_value.number())
    .bind(payload.sanitation.number())
    .bind(payload.extra_electricity.number())
    .bind(payload.details.to_text())
    .bind(&created_at)
    .execute(&state.pool)
    .await?;
    drop(guard);

    Ok(Json(json!({
        "success": true,
        "id": result.last_insert_rowid(),
        "contract_number": contract_number
    })))
}

/// GET /api/precontracts
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PreContract>>> {
    let rows = sqlx::query_as::<_, PreContract>("SELECT * FROM precontracts ORDER BY id DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(rows))
}

/// PATCH /api/precontract/:id - partial update over the allow-listed columns.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE precontracts SET ");
    let mut updates = builder.separated(", ");
    let mut touched = false;

    for column in TEXT_COLUMNS {
        if let Some(value) = fields.get(*column) {
            let field = FormField::from_value(Some(value.clone()));
            updates.push(format!("{column} = "));
            updates.push_bind_unseparated(field.to_text());
            touched = true;
        }
    }
    for column in REAL_COLUMNS {
        if let Some(value) = fields.get(*column) {
            let field = FormField::from_value(Some(value.clone()));
            updates.push(format!("{column} = "));
            updates.push_bind_unseparated(field.number());
            touched = true;
        }
    }

    if !touched {
        return Err(ApiError::bad_request("no fields to update"));
    }

    builder.push(" WHERE id = ").push_bind(id);
    let result = builder.build().execute(&state.pool).await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("pre-contract not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/precontract/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    sqlx::query("DELETE FROM precontracts WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}
