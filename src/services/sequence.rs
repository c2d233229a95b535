//! Human-readable sequential identifiers.
//!
//! Contracts and receipts number themselves per day (`YYYYMMDD-001`),
//! pre-contracts per month (`MM-YY-00001`). The next counter comes from the
//! most recently inserted identifier sharing the prefix; a missing or
//! unparsable counter restarts at 1.
//!
//! The read-then-insert pattern races under concurrent submissions, so
//! callers hold `AppState::sequence_lock` across allocation and insert.
//! Receipt numbers additionally carry a UNIQUE constraint as a backstop.

use chrono::{DateTime, Datelike, Local};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy)]
pub struct SequenceScheme {
    /// Total hyphen-delimited segments of a full identifier.
    pub segments: usize,
    /// Zero-pad width of the trailing counter segment.
    pub pad: usize,
}

/// Daily contract/receipt numbering: `YYYYMMDD-NNN`.
pub const DAILY: SequenceScheme = SequenceScheme { segments: 2, pad: 3 };

/// Monthly pre-contract numbering: `MM-YY-NNNNN`.
pub const MONTHLY: SequenceScheme = SequenceScheme { segments: 3, pad: 5 };

pub fn daily_prefix(now: DateTime<Local>) -> String {
    now.format("%Y%m%d").to_string()
}

pub fn monthly_prefix(now: DateTime<Local>) -> String {
    format!("{:02}-{:02}", now.month(), now.year() % 100)
}

/// Compute the next identifier for `table.column` under `prefix`.
///
/// `table` and `column` are compile-time constants at every call site; they
/// are interpolated, never taken from request input.
pub async fn next_identifier(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    prefix: &str,
    scheme: SequenceScheme,
) -> Result<String, sqlx::Error> {
    let sql = format!(
        "SELECT {column} FROM {table} WHERE {column} LIKE ? ORDER BY id DESC LIMIT 1",
    );

    let last: Option<(String,)> = sqlx::query_as(&sql)
        .bind(format!("{}%", prefix))
        .fetch_optional(pool)
        .await?;

    let counter = last
        .and_then(|(identifier,)| next_counter(&identifier, scheme))
        .unwrap_or(1);

    Ok(format!("{}-{:0width$}", prefix, counter, width = scheme.pad))
}

fn next_counter(identifier: &str, scheme: SequenceScheme) -> Option<u32> {
    let parts: Vec<&str> = identifier.split('-').collect();
    if parts.len() != scheme.segments {
        return None;
    }
    parts.last()?.parse::<u32>().ok().map(|n| n + 1)
}
