/// Database migration runner
///
/// Runs schema migrations using sqlx's embedded migration system. Migration
/// files live in the `migrations/` directory of this crate and are compiled
/// into the binary, so the server can migrate itself at startup.
///
/// # Example
///
/// ```no_run
/// use crewmatch_shared::db::pool::{create_pool, DatabaseConfig};
/// use crewmatch_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped. A failing migration
/// is rolled back and returned as an error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
