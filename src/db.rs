use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use crate::settings::Settings;

/// How long a writer waits for the SQLite write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("invalid class data: {0}")]
    InvalidClass(String),
}

pub async fn connect(settings: &Settings) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    info!(url = %settings.database_url, "database ready");
    Ok(pool)
}

/// Fixed-width UTC text so stored instants compare correctly as strings.
pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.message().contains(column)
        }
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use super::*;

    /// Opens a migrated database in a throwaway directory. Keep the `TempDir`
    /// alive for as long as the pool is used.
    pub async fn temp_pool() -> (SqlitePool, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            database_url: format!("sqlite://{}", dir.path().join("studio.db").display()),
            max_connections: 8,
            debug: true,
            enable_swagger: false,
            port: 0,
            default_timezone: "Asia/Kolkata".to_string(),
            reference_attempts: 5,
        };
        let pool = connect(&settings).await.unwrap();
        (pool, dir)
    }
}
