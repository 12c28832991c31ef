//! Database migration command.

use super::Store;
use crate::output;
use notihub_core::error::AppError;

/// Apply pending migrations to the configured database.
pub async fn execute(store: &Store) -> Result<(), AppError> {
    let Some(pool) = &store.pool else {
        output::print_warning("In-memory store has no schema; nothing to migrate.");
        return Ok(());
    };

    pool.health_check().await?;

    println!("Running database migrations...");
    notihub_database::migration::run_migrations(pool.pool()).await?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
