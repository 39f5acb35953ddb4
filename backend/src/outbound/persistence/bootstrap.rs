//! Idempotent schema bootstrap.
//!
//! The schema script uses `IF NOT EXISTS` throughout, so running it against
//! an already-initialised database is a no-op.

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::pool::{DbPool, PoolError};

const SCHEMA_SQL: &str =
    include_str!("../../../migrations/2026-10-01-000000_create_job_board/up.sql");

/// Errors raised while preparing the database schema.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// No connection could be obtained.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The schema script failed.
    #[error("schema bootstrap failed: {message}")]
    Execute { message: String },
}

/// Create the `users` and `postings` tables when they are missing.
///
/// # Errors
/// Returns [`BootstrapError`] when no connection is available or the script
/// fails.
pub async fn bootstrap_schema(pool: &DbPool) -> Result<(), BootstrapError> {
    let mut conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL)
        .await
        .map_err(|err| BootstrapError::Execute {
            message: err.to_string(),
        })?;
    info!("database schema ready");
    Ok(())
}
