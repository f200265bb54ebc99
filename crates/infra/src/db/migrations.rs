use sqlx::migrate::Migrator;
use tracing::info;

use super::{DbPool, DbPoolError};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies the users/threads schema. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbPoolError> {
    MIGRATOR.run(pool).await?;
    info!(known = MIGRATOR.iter().count(), "database schema up to date");
    Ok(())
}
