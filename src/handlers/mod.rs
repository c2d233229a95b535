use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use sqlx::SqlitePool;

pub mod auth;
pub mod brokers;
pub mod buildings;
pub mod clearances;
pub mod commissions;
pub mod contracts;
pub mod invoices;
pub mod payments;
pub mod precontracts;
pub mod receipts;
pub mod units;
pub mod users;

/// Mutating buildings/units is restricted to their creator or an admin.
/// `table` is a compile-time constant at every call site.
pub(crate) async fn ensure_owner_or_admin(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    user: &AuthUser,
) -> ApiResult<()> {
    let sql = format!("SELECT created_by FROM {table} WHERE id = ?");
    let row: Option<(Option<i64>,)> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;

    let (created_by,) = row.ok_or_else(|| ApiError::not_found("record not found"))?;

    if user.is_admin() || created_by == Some(user.id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("not allowed to modify this record"))
    }
}
