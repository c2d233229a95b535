use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::database::models::commission::{
    BrokerCommissionReport, BrokerContractReport, BrokerStatistics,
};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/broker-commissions - every derived commission record, newest
/// first. The snapshot columns come from the commission rows themselves;
/// the join only adds the client's phone, which is not denormalized.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<BrokerCommissionReport>>> {
    let rows = sqlx::query_as::<_, BrokerCommissionReport>(
        "SELECT bc.*, c.client_phone AS client_phone
         FROM broker_commissions bc
         LEFT JOIN contracts c ON bc.contract_id = c.id
         ORDER BY bc.created_at DESC, bc.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows))
}

const REPORT_COLUMNS: &str = "c.id, c.contract_number, c.broker_name, c.client_name, c.unit_number,
    c.rent_value, c.total_commission, c.commission_deduction, c.attestation_value,
    c.attestation_deduction, c.representative_commission, c.representative_attestation,
    c.office_commission_internal, c.contract_date, c.created_at,
    b.name AS broker_full_name, b.phone AS broker_phone, b.email AS broker_email,
    b.commission_rate AS broker_commission_rate";

/// GET /api/broker-reports/:broker_id - contract-level commission report for
/// one broker, or `all` for every contract with broker involvement.
pub async fn reports(
    State(state): State<AppState>,
    Path(broker_id): Path<String>,
) -> ApiResult<Json<Vec<BrokerContractReport>>> {
    if broker_id == "all" {
        let sql = format!(
            "SELECT {REPORT_COLUMNS}
             FROM contracts c
             LEFT JOIN brokers b ON c.broker_id = b.id
             WHERE (c.broker_name IS NOT NULL AND c.broker_name != '') OR c.broker_id IS NOT NULL
             ORDER BY c.contract_date DESC"
        );
        let rows = sqlx::query_as::<_, BrokerContractReport>(&sql)
            .fetch_all(&state.pool)
            .await?;
        return Ok(Json(rows));
    }

    let Some(broker_name) = lookup_broker_name(&state, &broker_id).await? else {
        return Ok(Json(Vec::new()));
    };

    let sql = format!(
        "SELECT {REPORT_COLUMNS}
         FROM contracts c
         LEFT JOIN brokers b ON c.broker_id = b.id
         WHERE c.broker_id = ? OR c.broker_name = ?
         ORDER BY c.contract_date DESC"
    );
    let rows = sqlx::query_as::<_, BrokerContractReport>(&sql)
        .bind(&broker_id)
        .bind(&broker_name)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(rows))
}

const STATISTICS_COLUMNS: &str = "COUNT(*) AS total_contracts,
    COALESCE(SUM(c.rent_value), 0) AS total_rent_value,
    COALESCE(SUM(c.total_commission), 0) AS total_commission,
    COALESCE(SUM(c.commission_deduction), 0) AS total_commission_deduction,
    COALESCE(SUM(c.attestation_value), 0) AS total_attestation_value,
    COALESCE(SUM(c.attestation_deduction), 0) AS total_attestation_deduction,
    COALESCE(SUM(c.representative_commission), 0) AS total_representative_commission,
    COALESCE(SUM(c.representative_attestation), 0) AS total_representative_attestation,
    COALESCE(SUM(c.office_commission_internal), 0) AS total_office_commission,
    COALESCE(SUM(
        COALESCE(c.total_commission, 0) - COALESCE(c.commission_deduction, 0) +
        COALESCE(c.attestation_value, 0) - COALESCE(c.attestation_deduction, 0)
    ), 0) AS net_commission";

/// GET /api/broker-statistics/:broker_id - aggregate totals for one broker or
/// `all`. An unknown broker id reports zeroes rather than an error.
pub async fn statistics(
    State(state): State<AppState>,
    Path(broker_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if broker_id == "all" {
        let sql = format!(
            "SELECT {STATISTICS_COLUMNS}
             FROM contracts c
             WHERE (c.broker_name IS NOT NULL AND c.broker_name != '') OR c.broker_id IS NOT NULL"
        );
        let stats = sqlx::query_as::<_, BrokerStatistics>(&sql)
            .fetch_one(&state.pool)
            .await?;
        return Ok(Json(serde_json::to_value(stats).unwrap_or(Value::Null)));
    }

    let Some(broker_name) = lookup_broker_name(&state, &broker_id).await? else {
        return Ok(Json(
            serde_json::to_value(BrokerStatistics::zeroed()).unwrap_or(Value::Null),
        ));
    };

    let sql = format!(
        "SELECT {STATISTICS_COLUMNS}
         FROM contracts c
         WHERE c.broker_id = ? OR c.broker_name = ?"
    );
    let stats = sqlx::query_as::<_, BrokerStatistics>(&sql)
        .bind(&broker_id)
        .bind(&broker_name)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(serde_json::to_value(stats).unwrap_or(Value::Null)))
}

async fn lookup_broker_name(state: &AppState, broker_id: &str) -> ApiResult<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT name FROM brokers WHERE id = ?")
        .bind(broker_id)
        .fetch_optional(&state.pool)
        .await?;
    Ok(row.map(|(name,)| name))
}
