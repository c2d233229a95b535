use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Full schema DDL, applied statement by statement at startup.
const SCHEMA_SQL: &str = include_str!("../../migrations/001_schema.sql");

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open (or create) the database file and build the connection pool.
///
/// WAL mode keeps concurrent readers off the writer's back; foreign keys are
/// enforced for the relations that declare cascades (units, payments,
/// permissions). The contracts -> broker_commissions relation deliberately
/// does not cascade; the contract coordinator owns that ordering.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    info!("Opened database at {}", config.path);
    Ok(pool)
}

/// In-memory database for tests. A single connection keeps every query on the
/// same memory store.
pub async fn connect_in_memory() -> Result<SqlitePool, DatabaseError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Apply the schema. Statements are idempotent (CREATE TABLE IF NOT EXISTS).
pub async fn migrate(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_SQL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", e, statement)))?;
    }
    info!("Schema ready");
    Ok(())
}

/// Seed the default admin account, its permission set, and the stock
/// clearance companies. Runs on every boot but only writes on first boot.
pub async fn seed(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO users (username, password, full_name, email, role, is_active, created_at, updated_at)
         VALUES ('admin', 'admin123', 'مدير النظام', 'admin@goldenhouse.com', 'admin', 1, ?, ?)",
    )
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        let admin_id = inserted.last_insert_rowid();
        for permission in crate::handlers::users::AVAILABLE_PERMISSIONS {
            sqlx::query(
                "INSERT INTO user_permissions (user_id, permission_name, is_granted, created_at)
                 VALUES (?, ?, 1, ?)",
            )
            .bind(admin_id)
            .bind(permission)
            .bind(&now)
            .execute(pool)
            .await?;
        }
        info!("Default admin user ready");
    }

    let clearances: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clearances")
        .fetch_one(pool)
        .await?;
    if clearances.0 == 0 {
        sqlx::query(
            "INSERT INTO clearances (name, phone, email, commission_rate, created_at) VALUES
             ('تخليص أبوظبي', '+971501234567', 'abudhabi@clearance.com', 5.0, ?),
             ('تخليص دبي', '+971502345678', 'dubai@clearance.com', 4.5, ?),
             ('تخليص الشارقة', '+971503456789', 'sharjah@clearance.com', 4.0, ?)",
        )
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
        info!("Default clearances ready");
    }

    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_and_seed_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();
        seed(&pool).await.unwrap();
        seed(&pool).await.unwrap();

        let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users.0, 1);

        let clearances: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clearances")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(clearances.0, 3);
    }
}
